// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Site-to-site VPN connections.
//!
//! A connection is referenced from its customer gateway and, when given, from
//! its VPN gateway. Both references are added on create and dropped on delete.

use ec2_engine::constants::TAG_SPECIFICATION_PARAM;
use ec2_engine::{FieldMap, Record, RequestContext, ResponseBody, Result, TagSpecification, utils};
use serde_json::json;

use super::customer_gateways::check_type;
use super::{
    DescribeQuery, describe, ensure_exists, object, remove_existing, return_true, store_new,
};
use crate::constants::{
    CUSTOMER_GATEWAYS, VPN_CONNECTION_RESOURCE_TYPE, VPN_CONNECTIONS, VPN_GATEWAYS,
};

const NOT_FOUND: &str = "InvalidVpnConnectionID";

const FIELDS: FieldMap = &[
    ("vpn-connection-id", "vpnConnectionId"),
    ("customer-gateway-id", "customerGatewayId"),
    ("vpn-gateway-id", "vpnGatewayId"),
    ("state", "state"),
    ("type", "type"),
    ("category", "category"),
    ("option.static-routes-only", "options.staticRoutesOnly"),
];

const QUERY: DescribeQuery = DescribeQuery {
    collection: VPN_CONNECTIONS,
    id_param: "VpnConnectionId",
    not_found: NOT_FOUND,
    fields: FIELDS,
    set_name: "vpnConnectionSet",
    bounds: None,
};

#[tracing::instrument(skip(ctx))]
pub fn create_vpn_connection(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let params = ctx.params;
    let customer_gateway_id = params.require("CustomerGatewayId")?;
    let connection_type = params.require("Type")?;
    check_type(connection_type)?;
    let vpn_gateway_id = params.get_scalar("VpnGatewayId").filter(|id| !id.is_empty());

    ensure_exists(ctx, CUSTOMER_GATEWAYS, "InvalidCustomerGatewayID", customer_gateway_id)?;
    if let Some(vpn_gateway_id) = vpn_gateway_id {
        ensure_exists(ctx, VPN_GATEWAYS, "InvalidVpnGatewayID", vpn_gateway_id)?;
    }
    let tags = TagSpecification::tags_for(
        &params.parse_tags(TAG_SPECIFICATION_PARAM),
        VPN_CONNECTION_RESOURCE_TYPE,
    )?;

    let connection_id = utils::random_id("vpn");
    let mut attributes = object(json!({
        "vpnConnectionId": connection_id,
        "state": "available",
        "type": connection_type,
        "category": "VPN",
        "customerGatewayId": customer_gateway_id,
        "options": {
            "staticRoutesOnly": params.get_bool("Options.StaticRoutesOnly")
        },
        "routes": [],
        "vgwTelemetry": []
    }));
    if let Some(vpn_gateway_id) = vpn_gateway_id {
        attributes.insert("vpnGatewayId".to_string(), json!(vpn_gateway_id));
    }
    let record = Record::new(&connection_id, attributes).with_tags(tags);
    let connection = record.to_value();
    store_new(ctx, VPN_CONNECTIONS, VPN_CONNECTION_RESOURCE_TYPE, record)?;

    ctx.store
        .link(CUSTOMER_GATEWAYS, customer_gateway_id, VPN_CONNECTIONS, &connection_id);
    if let Some(vpn_gateway_id) = vpn_gateway_id {
        ctx.store
            .link(VPN_GATEWAYS, vpn_gateway_id, VPN_CONNECTIONS, &connection_id);
    }

    Ok(object(json!({ "vpnConnection": connection })))
}

#[tracing::instrument(skip(ctx))]
pub fn describe_vpn_connections(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    describe(ctx, &QUERY)
}

/// Removes the connection outright; there is no lingering `deleted` state.
#[tracing::instrument(skip(ctx))]
pub fn delete_vpn_connection(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let connection_id = ctx.params.require("VpnConnectionId")?;
    let record = remove_existing(ctx, VPN_CONNECTIONS, NOT_FOUND, connection_id)?;

    if let Some(customer_gateway_id) = record.get_str("customerGatewayId") {
        ctx.store
            .unlink(CUSTOMER_GATEWAYS, customer_gateway_id, VPN_CONNECTIONS, connection_id);
    }
    if let Some(vpn_gateway_id) = record.get_str("vpnGatewayId") {
        ctx.store
            .unlink(VPN_GATEWAYS, vpn_gateway_id, VPN_CONNECTIONS, connection_id);
    }

    Ok(return_true())
}
