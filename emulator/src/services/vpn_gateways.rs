// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Virtual private gateways and their VPC attachments.
//!
//! A gateway is attached to at most one VPC. The attachment is kept on the
//! record (`attachments`) and mirrored as a reference from the VPC.

use ec2_engine::constants::TAG_SPECIFICATION_PARAM;
use ec2_engine::{
    Ec2Error, FieldMap, Record, RequestContext, ResponseBody, Result, TagSpecification, utils,
};
use serde_json::{Value, json};

use super::customer_gateways::check_type;
use super::{
    DescribeQuery, describe, ensure_exists, object, remove_existing, return_true, store_new,
};
use crate::constants::{
    DEFAULT_AMAZON_SIDE_ASN, VPCS, VPN_CONNECTIONS, VPN_GATEWAY_RESOURCE_TYPE, VPN_GATEWAYS,
};

const NOT_FOUND: &str = "InvalidVpnGatewayID";
const ATTACHMENT_NOT_FOUND: &str = "InvalidVpnGatewayAttachment";

const FIELDS: FieldMap = &[
    ("vpn-gateway-id", "vpnGatewayId"),
    ("state", "state"),
    ("type", "type"),
    ("availability-zone", "availabilityZone"),
    ("attachment.vpc-id", "attachments.vpcId"),
    ("attachment.state", "attachments.state"),
    ("amazon-side-asn", "amazonSideAsn"),
];

const QUERY: DescribeQuery = DescribeQuery {
    collection: VPN_GATEWAYS,
    id_param: "VpnGatewayId",
    not_found: NOT_FOUND,
    fields: FIELDS,
    set_name: "vpnGatewaySet",
    bounds: None,
};

/// VPC the gateway is currently attached to.
fn attached_vpc(record: &Record) -> Option<String> {
    record
        .get("attachments")?
        .as_array()?
        .iter()
        .find(|a| a["state"] == "attached")
        .and_then(|a| a["vpcId"].as_str())
        .map(str::to_string)
}

#[tracing::instrument(skip(ctx))]
pub fn create_vpn_gateway(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let params = ctx.params;
    let gateway_type = params.require("Type")?;
    check_type(gateway_type)?;
    let amazon_side_asn = params
        .get_int("AmazonSideAsn")?
        .unwrap_or(DEFAULT_AMAZON_SIDE_ASN);
    let tags = TagSpecification::tags_for(
        &params.parse_tags(TAG_SPECIFICATION_PARAM),
        VPN_GATEWAY_RESOURCE_TYPE,
    )?;

    let gateway_id = utils::random_id("vgw");
    let mut attributes = object(json!({
        "vpnGatewayId": gateway_id,
        "state": "available",
        "type": gateway_type,
        "amazonSideAsn": amazon_side_asn,
        "attachments": []
    }));
    if let Some(zone) = params.get_scalar("AvailabilityZone") {
        attributes.insert("availabilityZone".to_string(), json!(zone));
    }
    let record = Record::new(&gateway_id, attributes).with_tags(tags);
    let gateway = record.to_value();
    store_new(ctx, VPN_GATEWAYS, VPN_GATEWAY_RESOURCE_TYPE, record)?;

    Ok(object(json!({ "vpnGateway": gateway })))
}

#[tracing::instrument(skip(ctx))]
pub fn attach_vpn_gateway(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let params = ctx.params;
    let gateway_id = params.require("VpnGatewayId")?;
    let vpc_id = params.require("VpcId")?;
    ensure_exists(ctx, VPCS, "InvalidVpcID", vpc_id)?;

    let gateway = ctx
        .store
        .get_mut(VPN_GATEWAYS, gateway_id)?
        .ok_or_else(|| Ec2Error::not_found(NOT_FOUND, gateway_id))?;
    if let Some(current) = attached_vpc(gateway) {
        return Err(Ec2Error::IncorrectState(format!(
            "The VPN gateway '{gateway_id}' is already attached to '{current}'."
        )));
    }
    let attachment = json!({"vpcId": vpc_id, "state": "attached"});
    gateway.set("attachments", Value::Array(vec![attachment.clone()]));
    ctx.store.link(VPCS, vpc_id, VPN_GATEWAYS, gateway_id);

    Ok(object(json!({ "attachment": attachment })))
}

#[tracing::instrument(skip(ctx))]
pub fn detach_vpn_gateway(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let params = ctx.params;
    let gateway_id = params.require("VpnGatewayId")?;
    let vpc_id = params.require("VpcId")?;

    let gateway = ctx
        .store
        .get_mut(VPN_GATEWAYS, gateway_id)?
        .ok_or_else(|| Ec2Error::not_found(NOT_FOUND, gateway_id))?;
    if attached_vpc(gateway).as_deref() != Some(vpc_id) {
        return Err(Ec2Error::not_found(
            ATTACHMENT_NOT_FOUND,
            &format!("{gateway_id}/{vpc_id}"),
        ));
    }
    gateway.set(
        "attachments",
        json!([{"vpcId": vpc_id, "state": "detached"}]),
    );
    ctx.store.unlink(VPCS, vpc_id, VPN_GATEWAYS, gateway_id);

    Ok(return_true())
}

#[tracing::instrument(skip(ctx))]
pub fn describe_vpn_gateways(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    describe(ctx, &QUERY)
}

#[tracing::instrument(skip(ctx))]
pub fn delete_vpn_gateway(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let gateway_id = ctx.params.require("VpnGatewayId")?;
    let gateway = ctx
        .store
        .get(VPN_GATEWAYS, gateway_id)?
        .ok_or_else(|| Ec2Error::not_found(NOT_FOUND, gateway_id))?;
    if let Some(vpc_id) = attached_vpc(gateway) {
        return Err(Ec2Error::IncorrectState(format!(
            "The VPN gateway '{gateway_id}' is attached to '{vpc_id}' and cannot be deleted."
        )));
    }
    if !ctx
        .store
        .references(VPN_GATEWAYS, gateway_id, VPN_CONNECTIONS)
        .is_empty()
    {
        return Err(Ec2Error::DependencyViolation(format!(
            "The VPN gateway '{gateway_id}' is in use by a VPN connection."
        )));
    }

    remove_existing(ctx, VPN_GATEWAYS, NOT_FOUND, gateway_id)?;
    Ok(return_true())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::services::testing::Harness;
    use crate::services::vpcs::create_vpc;
    use ec2_engine::Filterable;

    fn setup() -> (Harness, String, String) {
        let mut harness = Harness::new();
        let body = harness.call(create_vpc, &[("CidrBlock", "10.0.0.0/16")]).unwrap();
        let vpc_id = body["vpc"]["vpcId"].as_str().unwrap().to_string();
        let body = harness.call(create_vpn_gateway, &[("Type", "ipsec.1")]).unwrap();
        let gateway_id = body["vpnGateway"]["vpnGatewayId"].as_str().unwrap().to_string();
        (harness, vpc_id, gateway_id)
    }

    #[test]
    fn test_create_vpn_gateway() {
        let mut harness = Harness::new();
        let body = harness
            .call(create_vpn_gateway, &[("Type", "ipsec.1"), ("AmazonSideAsn", "65010")])
            .unwrap();
        let gateway = &body["vpnGateway"];
        assert!(gateway["vpnGatewayId"].as_str().unwrap().starts_with("vgw-"));
        assert_eq!(gateway["amazonSideAsn"], 65010);
        assert_eq!(gateway["attachments"], json!([]));

        let err = harness.call(create_vpn_gateway, &[("Type", "ipsec.9")]).unwrap_err();
        assert_eq!(err.code(), "InvalidParameterValue");
    }

    #[test]
    fn test_attach_and_detach() {
        let (mut harness, vpc_id, gateway_id) = setup();
        let pairs = [("VpnGatewayId", gateway_id.as_str()), ("VpcId", vpc_id.as_str())];

        let body = harness.call(attach_vpn_gateway, &pairs).unwrap();
        assert_eq!(body["attachment"]["state"], "attached");
        assert_eq!(harness.store.references(VPCS, &vpc_id, VPN_GATEWAYS), [gateway_id.clone()]);

        let err = harness.call(attach_vpn_gateway, &pairs).unwrap_err();
        assert_eq!(err.code(), "IncorrectState");

        let body = harness
            .call(
                describe_vpn_gateways,
                &[("Filter.1.Name", "attachment.vpc-id"), ("Filter.1.Value.1", vpc_id.as_str())],
            )
            .unwrap();
        assert_eq!(body["vpnGatewaySet"].as_array().unwrap().len(), 1);

        harness.call(detach_vpn_gateway, &pairs).unwrap();
        assert!(harness.store.references(VPCS, &vpc_id, VPN_GATEWAYS).is_empty());
        let gateway = harness.store.get(VPN_GATEWAYS, &gateway_id).unwrap().unwrap();
        assert_eq!(gateway.field_values("attachments.state"), vec!["detached"]);

        let err = harness.call(detach_vpn_gateway, &pairs).unwrap_err();
        assert_eq!(err.code(), "InvalidVpnGatewayAttachment.NotFound");
    }

    #[test]
    fn test_attach_requires_existing_resources() {
        let (mut harness, vpc_id, gateway_id) = setup();
        let err = harness
            .call(attach_vpn_gateway, &[("VpnGatewayId", gateway_id.as_str()), ("VpcId", "vpc-missing")])
            .unwrap_err();
        assert_eq!(err.code(), "InvalidVpcID.NotFound");

        let err = harness
            .call(attach_vpn_gateway, &[("VpnGatewayId", "vgw-missing"), ("VpcId", vpc_id.as_str())])
            .unwrap_err();
        assert_eq!(err.code(), "InvalidVpnGatewayID.NotFound");
    }

    #[test]
    fn test_delete_vpn_gateway() {
        let (mut harness, vpc_id, gateway_id) = setup();
        let pairs = [("VpnGatewayId", gateway_id.as_str()), ("VpcId", vpc_id.as_str())];
        harness.call(attach_vpn_gateway, &pairs).unwrap();

        let delete = [("VpnGatewayId", gateway_id.as_str())];
        let err = harness.call(delete_vpn_gateway, &delete).unwrap_err();
        assert_eq!(err.code(), "IncorrectState");

        harness.call(detach_vpn_gateway, &pairs).unwrap();
        harness.store.link(VPN_GATEWAYS, &gateway_id, VPN_CONNECTIONS, "vpn-1");
        let err = harness.call(delete_vpn_gateway, &delete).unwrap_err();
        assert_eq!(err.code(), "DependencyViolation");

        harness.store.unlink(VPN_GATEWAYS, &gateway_id, VPN_CONNECTIONS, "vpn-1");
        harness.call(delete_vpn_gateway, &delete).unwrap();
        assert!(!harness.store.contains(VPN_GATEWAYS, &gateway_id).unwrap());
    }
}
