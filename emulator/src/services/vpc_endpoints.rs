// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! VPC endpoints. Every endpoint is linked to its VPC so `DeleteVpc` can see it.

use ec2_engine::constants::TAG_SPECIFICATION_PARAM;
use ec2_engine::params::str2bool;
use ec2_engine::{
    Ec2Error, FieldMap, Record, RequestContext, ResponseBody, Result, TagSpecification, utils,
};
use serde_json::{Value, json};

use super::{DescribeQuery, describe, ensure_exists, object, remove_existing, store_new, timestamp};
use crate::constants::{
    DESCRIBE_VPC_ENDPOINTS_BOUNDS, VPC_ENDPOINT_RESOURCE_TYPE, VPC_ENDPOINTS, VPCS,
};

const NOT_FOUND: &str = "InvalidVpcEndpointId";
const ENDPOINT_TYPES: [&str; 3] = ["Gateway", "Interface", "GatewayLoadBalancer"];
const DEFAULT_POLICY: &str = r#"{"Version":"2008-10-17","Statement":[{"Effect":"Allow","Principal":"*","Action":"*","Resource":"*"}]}"#;

const FIELDS: FieldMap = &[
    ("vpc-endpoint-id", "vpcEndpointId"),
    ("vpc-id", "vpcId"),
    ("service-name", "serviceName"),
    ("vpc-endpoint-state", "state"),
    ("vpc-endpoint-type", "vpcEndpointType"),
];

const QUERY: DescribeQuery = DescribeQuery {
    collection: VPC_ENDPOINTS,
    id_param: "VpcEndpointId",
    not_found: NOT_FOUND,
    fields: FIELDS,
    set_name: "vpcEndpointSet",
    bounds: Some(DESCRIBE_VPC_ENDPOINTS_BOUNDS),
};

#[tracing::instrument(skip(ctx))]
pub fn create_vpc_endpoint(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let params = ctx.params;
    let vpc_id = params.require("VpcId")?;
    let service_name = params.require("ServiceName")?;
    let endpoint_type = params.get_scalar("VpcEndpointType").unwrap_or("Gateway");
    if !ENDPOINT_TYPES.contains(&endpoint_type) {
        return Err(Ec2Error::invalid_value(format!(
            "Value ({endpoint_type}) for parameter VpcEndpointType is invalid."
        )));
    }
    ensure_exists(ctx, VPCS, "InvalidVpcID", vpc_id)?;
    let tags = TagSpecification::tags_for(
        &params.parse_tags(TAG_SPECIFICATION_PARAM),
        VPC_ENDPOINT_RESOURCE_TYPE,
    )?;

    let is_interface = endpoint_type == "Interface";
    let private_dns_enabled = match params.get_scalar("PrivateDnsEnabled") {
        Some(value) => str2bool(Some(value)),
        None => is_interface,
    };

    let endpoint_id = utils::random_id("vpce");
    let dns_entries: Vec<Value> = if is_interface {
        let service = service_name.rsplit('.').next().unwrap_or(service_name);
        vec![json!({
            "dnsName": format!(
                "{endpoint_id}.{service}.{}.vpce.amazonaws.com",
                ctx.settings.region
            ),
            "hostedZoneId": "Z7HUB22UULQXV"
        })]
    } else {
        Vec::new()
    };

    let attributes = object(json!({
        "vpcEndpointId": endpoint_id,
        "vpcEndpointType": endpoint_type,
        "vpcId": vpc_id,
        "serviceName": service_name,
        "state": "available",
        "policyDocument": params.get_scalar("PolicyDocument").unwrap_or(DEFAULT_POLICY),
        "routeTableIdSet": params.get_indexed_list("RouteTableId"),
        "subnetIdSet": params.get_indexed_list("SubnetId"),
        "groupSet": params
            .get_indexed_list("SecurityGroupId")
            .into_iter()
            .map(|group_id| json!({"groupId": group_id}))
            .collect::<Vec<_>>(),
        "privateDnsEnabled": private_dns_enabled,
        "requesterManaged": false,
        "dnsEntrySet": dns_entries,
        "creationTimestamp": timestamp(),
        "ownerId": ctx.settings.account_id
    }));
    let record = Record::new(&endpoint_id, attributes).with_tags(tags);
    let endpoint = record.to_value();
    store_new(ctx, VPC_ENDPOINTS, VPC_ENDPOINT_RESOURCE_TYPE, record)?;
    ctx.store.link(VPCS, vpc_id, VPC_ENDPOINTS, &endpoint_id);

    Ok(object(json!({ "vpcEndpoint": endpoint })))
}

#[tracing::instrument(skip(ctx))]
pub fn describe_vpc_endpoints(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    describe(ctx, &QUERY)
}

/// Deletes what it can; unknown ids are reported in `unsuccessful`.
#[tracing::instrument(skip(ctx))]
pub fn delete_vpc_endpoints(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let ids = ctx.params.get_indexed_list("VpcEndpointId");
    if ids.is_empty() {
        return Err(Ec2Error::MissingParameter("VpcEndpointId".to_string()));
    }

    let mut unsuccessful = Vec::new();
    for id in &ids {
        if !ctx.store.contains(VPC_ENDPOINTS, id)? {
            let error = Ec2Error::not_found(NOT_FOUND, id);
            unsuccessful.push(json!({
                "resourceId": id,
                "error": {"code": error.code(), "message": error.to_string()}
            }));
            continue;
        }
        let record = remove_existing(ctx, VPC_ENDPOINTS, NOT_FOUND, id)?;
        if let Some(vpc_id) = record.get_str("vpcId") {
            ctx.store.unlink(VPCS, vpc_id, VPC_ENDPOINTS, id);
        }
    }

    Ok(object(json!({ "unsuccessful": unsuccessful })))
}
