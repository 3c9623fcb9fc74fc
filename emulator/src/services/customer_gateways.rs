// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use ec2_engine::constants::TAG_SPECIFICATION_PARAM;
use ec2_engine::{
    Ec2Error, FieldMap, Record, RequestContext, ResponseBody, Result, TagSpecification, utils,
};
use serde_json::json;

use super::{
    DescribeQuery, describe, ensure_exists, object, parse_ipv4, remove_existing, return_true,
    store_new,
};
use crate::constants::{
    CUSTOMER_GATEWAY_RESOURCE_TYPE, CUSTOMER_GATEWAYS, DEFAULT_BGP_ASN, VPN_CONNECTIONS, VPN_TYPE,
};

const NOT_FOUND: &str = "InvalidCustomerGatewayID";

const FIELDS: FieldMap = &[
    ("customer-gateway-id", "customerGatewayId"),
    ("bgp-asn", "bgpAsn"),
    ("ip-address", "ipAddress"),
    ("state", "state"),
    ("type", "type"),
];

const QUERY: DescribeQuery = DescribeQuery {
    collection: CUSTOMER_GATEWAYS,
    id_param: "CustomerGatewayId",
    not_found: NOT_FOUND,
    fields: FIELDS,
    set_name: "customerGatewaySet",
    bounds: None,
};

pub(crate) fn check_type(value: &str) -> Result<()> {
    if value == VPN_TYPE {
        Ok(())
    } else {
        Err(Ec2Error::invalid_value(format!(
            "Value ({value}) for parameter Type is invalid. Valid value is {VPN_TYPE}."
        )))
    }
}

#[tracing::instrument(skip(ctx))]
pub fn create_customer_gateway(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let params = ctx.params;
    let gateway_type = params.require("Type")?;
    check_type(gateway_type)?;
    let ip_address = params.require("IpAddress")?;
    parse_ipv4(ip_address, "IpAddress")?;
    let bgp_asn = params.get_int("BgpAsn")?.unwrap_or(DEFAULT_BGP_ASN);
    if !(1..=i64::from(u32::MAX)).contains(&bgp_asn) {
        return Err(Ec2Error::invalid_value(format!(
            "Value ({bgp_asn}) for parameter BgpAsn is invalid."
        )));
    }
    let tags = TagSpecification::tags_for(
        &params.parse_tags(TAG_SPECIFICATION_PARAM),
        CUSTOMER_GATEWAY_RESOURCE_TYPE,
    )?;

    let gateway_id = utils::random_id("cgw");
    let mut attributes = object(json!({
        "customerGatewayId": gateway_id,
        "state": "available",
        "type": gateway_type,
        "ipAddress": ip_address,
        "bgpAsn": bgp_asn.to_string()
    }));
    if let Some(device_name) = params.get_scalar("DeviceName") {
        attributes.insert("deviceName".to_string(), json!(device_name));
    }
    let record = Record::new(&gateway_id, attributes).with_tags(tags);
    let gateway = record.to_value();
    store_new(ctx, CUSTOMER_GATEWAYS, CUSTOMER_GATEWAY_RESOURCE_TYPE, record)?;

    Ok(object(json!({ "customerGateway": gateway })))
}

#[tracing::instrument(skip(ctx))]
pub fn describe_customer_gateways(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    describe(ctx, &QUERY)
}

#[tracing::instrument(skip(ctx))]
pub fn delete_customer_gateway(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let gateway_id = ctx.params.require("CustomerGatewayId")?;
    ensure_exists(ctx, CUSTOMER_GATEWAYS, NOT_FOUND, gateway_id)?;
    if !ctx
        .store
        .references(CUSTOMER_GATEWAYS, gateway_id, VPN_CONNECTIONS)
        .is_empty()
    {
        return Err(Ec2Error::DependencyViolation(format!(
            "The customer gateway '{gateway_id}' is in use by a VPN connection."
        )));
    }

    remove_existing(ctx, CUSTOMER_GATEWAYS, NOT_FOUND, gateway_id)?;
    Ok(return_true())
}
