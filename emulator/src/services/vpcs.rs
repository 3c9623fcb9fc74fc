// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use ec2_engine::constants::TAG_SPECIFICATION_PARAM;
use ec2_engine::{
    Ec2Error, FieldMap, Record, RequestContext, ResponseBody, Result, TagSpecification, utils,
};
use serde_json::json;

use super::{DescribeQuery, describe, object, parse_ipv4_cidr, remove_existing, return_true, store_new};
use crate::constants::{
    DESCRIBE_VPCS_BOUNDS, MAX_VPC_PREFIX_LENGTH, MIN_VPC_PREFIX_LENGTH, VPC_ENDPOINTS,
    VPC_RESOURCE_TYPE, VPCS, VPN_GATEWAYS,
};

const NOT_FOUND: &str = "InvalidVpcID";
const TENANCIES: [&str; 2] = ["default", "dedicated"];

const FIELDS: FieldMap = &[
    ("vpc-id", "vpcId"),
    ("cidr", "cidrBlock"),
    ("cidr-block", "cidrBlock"),
    ("cidr-block-association.cidr-block", "cidrBlockAssociationSet.cidrBlock"),
    ("cidr-block-association.association-id", "cidrBlockAssociationSet.associationId"),
    ("state", "state"),
    ("is-default", "isDefault"),
    ("owner-id", "ownerId"),
    ("instance-tenancy", "instanceTenancy"),
    ("dhcp-options-id", "dhcpOptionsId"),
];

const QUERY: DescribeQuery = DescribeQuery {
    collection: VPCS,
    id_param: "VpcId",
    not_found: NOT_FOUND,
    fields: FIELDS,
    set_name: "vpcSet",
    bounds: Some(DESCRIBE_VPCS_BOUNDS),
};

#[tracing::instrument(skip(ctx))]
pub fn create_vpc(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let params = ctx.params;
    let cidr_block = params.require("CidrBlock")?;
    let (_, prefix) = parse_ipv4_cidr(cidr_block, "CidrBlock")?;
    if !(MIN_VPC_PREFIX_LENGTH..=MAX_VPC_PREFIX_LENGTH).contains(&prefix) {
        return Err(Ec2Error::InvalidCidr(cidr_block.to_string()));
    }

    let tenancy = params.get_scalar("InstanceTenancy").unwrap_or("default");
    if !TENANCIES.contains(&tenancy) {
        return Err(Ec2Error::invalid_value(format!(
            "Value ({tenancy}) for parameter InstanceTenancy is invalid."
        )));
    }
    let tags = TagSpecification::tags_for(
        &params.parse_tags(TAG_SPECIFICATION_PARAM),
        VPC_RESOURCE_TYPE,
    )?;

    let vpc_id = utils::random_id("vpc");
    let attributes = object(json!({
        "vpcId": vpc_id,
        "ownerId": ctx.settings.account_id,
        "state": "available",
        "cidrBlock": cidr_block,
        "cidrBlockAssociationSet": [{
            "associationId": utils::random_id("vpc-cidr-assoc"),
            "cidrBlock": cidr_block,
            "cidrBlockState": {"state": "associated"}
        }],
        "dhcpOptionsId": "default",
        "instanceTenancy": tenancy,
        "isDefault": false
    }));
    let record = Record::new(&vpc_id, attributes).with_tags(tags);
    let vpc = record.to_value();
    store_new(ctx, VPCS, VPC_RESOURCE_TYPE, record)?;

    Ok(object(json!({ "vpc": vpc })))
}

#[tracing::instrument(skip(ctx))]
pub fn describe_vpcs(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    describe(ctx, &QUERY)
}

#[tracing::instrument(skip(ctx))]
pub fn delete_vpc(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let vpc_id = ctx.params.require("VpcId")?;
    super::ensure_exists(ctx, VPCS, NOT_FOUND, vpc_id)?;

    for dependents in [VPC_ENDPOINTS, VPN_GATEWAYS] {
        if !ctx.store.references(VPCS, vpc_id, dependents).is_empty() {
            return Err(Ec2Error::DependencyViolation(format!(
                "The vpc '{vpc_id}' has dependencies and cannot be deleted."
            )));
        }
    }

    remove_existing(ctx, VPCS, NOT_FOUND, vpc_id)?;
    Ok(return_true())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::services::testing::Harness;

    fn create(harness: &mut Harness, cidr: &str) -> String {
        let body = harness
            .call(create_vpc, &[("CidrBlock", cidr)])
            .unwrap();
        body["vpc"]["vpcId"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_create_vpc() {
        let mut harness = Harness::new();
        let body = harness
            .call(
                create_vpc,
                &[
                    ("CidrBlock", "10.0.0.0/16"),
                    ("TagSpecification.1.ResourceType", "vpc"),
                    ("TagSpecification.1.Tag.1.Key", "Name"),
                    ("TagSpecification.1.Tag.1.Value", "main"),
                ],
            )
            .unwrap();

        let vpc = &body["vpc"];
        let vpc_id = vpc["vpcId"].as_str().unwrap();
        assert!(vpc_id.starts_with("vpc-"));
        assert_eq!(vpc["cidrBlock"], "10.0.0.0/16");
        assert_eq!(vpc["ownerId"], "123456789012");
        assert_eq!(vpc["instanceTenancy"], "default");
        assert_eq!(vpc["tagSet"][0]["key"], "Name");

        assert!(harness.store.contains(VPCS, vpc_id).unwrap());
        assert_eq!(harness.store.resource_type_of(vpc_id).as_deref(), Some("vpc"));
    }

    #[test]
    fn test_create_vpc_validation() {
        let mut harness = Harness::new();
        let err = harness.call(create_vpc, &[]).unwrap_err();
        assert_eq!(err.code(), "MissingParameter");

        let err = harness.call(create_vpc, &[("CidrBlock", "10.0.0.0/8")]).unwrap_err();
        assert_eq!(err.code(), "InvalidVpc.Range");

        let err = harness.call(create_vpc, &[("CidrBlock", "not-a-cidr")]).unwrap_err();
        assert_eq!(err.code(), "InvalidParameterValue");

        let err = harness
            .call(
                create_vpc,
                &[("CidrBlock", "10.0.0.0/16"), ("InstanceTenancy", "shared")],
            )
            .unwrap_err();
        assert_eq!(err.code(), "InvalidParameterValue");

        assert_eq!(harness.store.collection_len(VPCS).unwrap(), 0);
    }

    #[test]
    fn test_describe_vpcs_by_id_and_filter() {
        let mut harness = Harness::new();
        let first = create(&mut harness, "10.0.0.0/16");
        let second = create(&mut harness, "10.1.0.0/16");

        let body = harness.call(describe_vpcs, &[("VpcId.1", first.as_str())]).unwrap();
        let vpcs = body["vpcSet"].as_array().unwrap();
        assert_eq!(vpcs.len(), 1);
        assert_eq!(vpcs[0]["vpcId"], first.as_str());

        let body = harness
            .call(
                describe_vpcs,
                &[("Filter.1.Name", "cidr"), ("Filter.1.Value.1", "10.1.0.0/16")],
            )
            .unwrap();
        let vpcs = body["vpcSet"].as_array().unwrap();
        assert_eq!(vpcs.len(), 1);
        assert_eq!(vpcs[0]["vpcId"], second.as_str());

        let body = harness.call(describe_vpcs, &[]).unwrap();
        assert_eq!(body["vpcSet"].as_array().unwrap().len(), 2);
        assert!(body.get("nextToken").is_none());
    }

    #[test]
    fn test_describe_vpcs_errors() {
        let mut harness = Harness::new();
        let vpc_id = create(&mut harness, "10.0.0.0/16");

        let err = harness.call(describe_vpcs, &[("VpcId.1", "vpc-0000")]).unwrap_err();
        assert_eq!(err.code(), "InvalidVpcID.NotFound");

        let err = harness
            .call(describe_vpcs, &[("VpcId.1", vpc_id.as_str()), ("MaxResults", "5")])
            .unwrap_err();
        assert_eq!(err.code(), "InvalidParameterCombination");

        harness.settings.strict_filters = true;
        let err = harness
            .call(describe_vpcs, &[("Filter.1.Name", "colour"), ("Filter.1.Value.1", "red")])
            .unwrap_err();
        assert_eq!(err.code(), "InvalidParameterValue");
    }

    #[test]
    fn test_describe_vpcs_pages() {
        let mut harness = Harness::new();
        for i in 0..7 {
            create(&mut harness, &format!("10.{i}.0.0/16"));
        }

        let body = harness.call(describe_vpcs, &[("MaxResults", "5")]).unwrap();
        assert_eq!(body["vpcSet"].as_array().unwrap().len(), 5);
        let token = body["nextToken"].as_str().unwrap().to_string();

        let body = harness
            .call(describe_vpcs, &[("MaxResults", "5"), ("NextToken", token.as_str())])
            .unwrap();
        assert_eq!(body["vpcSet"].as_array().unwrap().len(), 2);
        assert!(body.get("nextToken").is_none());
    }

    #[test]
    fn test_delete_vpc() {
        let mut harness = Harness::new();
        let vpc_id = create(&mut harness, "10.0.0.0/16");

        harness.store.link(VPCS, &vpc_id, VPN_GATEWAYS, "vgw-1");
        let err = harness.call(delete_vpc, &[("VpcId", vpc_id.as_str())]).unwrap_err();
        assert_eq!(err.code(), "DependencyViolation");

        harness.store.unlink(VPCS, &vpc_id, VPN_GATEWAYS, "vgw-1");
        let body = harness.call(delete_vpc, &[("VpcId", vpc_id.as_str())]).unwrap();
        assert_eq!(body["return"], true);
        assert!(!harness.store.contains(VPCS, vpc_id.as_str()).unwrap());
        assert_eq!(harness.store.resource_type_of(&vpc_id), None);

        let err = harness.call(delete_vpc, &[("VpcId", vpc_id.as_str())]).unwrap_err();
        assert_eq!(err.code(), "InvalidVpcID.NotFound");
    }
}
