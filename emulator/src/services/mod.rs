// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Resource handlers and the compiled-in action table.
//!
//! Each submodule owns one resource type. Handlers read parameters through
//! [`QueryParams`](ec2_engine::QueryParams), mutate the store and return a
//! response mapping; rendering is left to the engine.
//!
//! Handler contract for parent/child resources: the handler that creates a
//! child links it to every parent and the handler that deletes it unlinks it.
//! Mutating actions run inside a store transaction, so a failure between the
//! two steps leaves no partial state behind.

pub mod customer_gateways;
pub mod tags;
pub mod vpc_endpoints;
pub mod vpcs;
pub mod vpn_connections;
pub mod vpn_gateways;

use std::net::Ipv4Addr;

use chrono::{SecondsFormat, Utc};
use ec2_engine::constants::{FILTER_PARAM, MAX_RESULTS_PARAM, NEXT_TOKEN_PARAM};
use ec2_engine::filters::{check_known, matches_all};
use ec2_engine::pager::paginate;
use ec2_engine::{
    ActionKind, ActionRegistry, Ec2Error, Engine, FieldMap, PageBounds, Record, RequestContext,
    ResourceStore, ResponseBody, Result, Settings,
};
use serde_json::{Map, Value, json};

use crate::constants::{
    CUSTOMER_GATEWAY_RESOURCE_TYPE, CUSTOMER_GATEWAYS, VPC_ENDPOINT_RESOURCE_TYPE, VPC_ENDPOINTS,
    VPC_RESOURCE_TYPE, VPCS, VPN_CONNECTION_RESOURCE_TYPE, VPN_CONNECTIONS,
    VPN_GATEWAY_RESOURCE_TYPE, VPN_GATEWAYS,
};

pub const RESOURCE_TYPES: [&str; 5] = [
    VPCS,
    VPC_ENDPOINTS,
    CUSTOMER_GATEWAYS,
    VPN_GATEWAYS,
    VPN_CONNECTIONS,
];

/// `(TagSpecification resource type, store collection)` pairs.
const TAGGABLE: [(&str, &str); 5] = [
    (VPC_RESOURCE_TYPE, VPCS),
    (VPC_ENDPOINT_RESOURCE_TYPE, VPC_ENDPOINTS),
    (CUSTOMER_GATEWAY_RESOURCE_TYPE, CUSTOMER_GATEWAYS),
    (VPN_GATEWAY_RESOURCE_TYPE, VPN_GATEWAYS),
    (VPN_CONNECTION_RESOURCE_TYPE, VPN_CONNECTIONS),
];

pub fn registry() -> ActionRegistry {
    use ActionKind::{Mutate, Read};

    let mut registry = ActionRegistry::new();
    registry
        // vpcs
        .register("CreateVpc", Mutate, vpcs::create_vpc)
        .register("DescribeVpcs", Read, vpcs::describe_vpcs)
        .register("DeleteVpc", Mutate, vpcs::delete_vpc)
        // vpc endpoints
        .register("CreateVpcEndpoint", Mutate, vpc_endpoints::create_vpc_endpoint)
        .register("DescribeVpcEndpoints", Read, vpc_endpoints::describe_vpc_endpoints)
        .register("DeleteVpcEndpoints", Mutate, vpc_endpoints::delete_vpc_endpoints)
        // customer gateways
        .register("CreateCustomerGateway", Mutate, customer_gateways::create_customer_gateway)
        .register("DescribeCustomerGateways", Read, customer_gateways::describe_customer_gateways)
        .register("DeleteCustomerGateway", Mutate, customer_gateways::delete_customer_gateway)
        // vpn gateways
        .register("CreateVpnGateway", Mutate, vpn_gateways::create_vpn_gateway)
        .register("AttachVpnGateway", Mutate, vpn_gateways::attach_vpn_gateway)
        .register("DetachVpnGateway", Mutate, vpn_gateways::detach_vpn_gateway)
        .register("DescribeVpnGateways", Read, vpn_gateways::describe_vpn_gateways)
        .register("DeleteVpnGateway", Mutate, vpn_gateways::delete_vpn_gateway)
        // vpn connections
        .register("CreateVpnConnection", Mutate, vpn_connections::create_vpn_connection)
        .register("DescribeVpnConnections", Read, vpn_connections::describe_vpn_connections)
        .register("DeleteVpnConnection", Mutate, vpn_connections::delete_vpn_connection)
        // tags
        .register("CreateTags", Mutate, tags::create_tags)
        .register("DeleteTags", Mutate, tags::delete_tags)
        .register("DescribeTags", Read, tags::describe_tags);
    registry
}

/// Builds an engine with every handler registered and an empty store.
pub fn build_engine(settings: Settings) -> Engine {
    Engine::new(registry(), ResourceStore::init(&RESOURCE_TYPES), settings)
}

/// Store collection holding records of a `TagSpecification` resource type.
pub(crate) fn collection_for(resource_type: &str) -> Option<&'static str> {
    TAGGABLE
        .iter()
        .find(|(name, _)| *name == resource_type)
        .map(|(_, collection)| *collection)
}

/// Unwraps a `json!({...})` literal into a mapping.
pub(crate) fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub(crate) fn return_true() -> ResponseBody {
    object(json!({"return": true}))
}

pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Stores a freshly created record and indexes it for tag actions.
pub(crate) fn store_new(
    ctx: &mut RequestContext<'_>,
    collection: &str,
    resource_type: &str,
    record: Record,
) -> Result<()> {
    let id = record.id.clone();
    ctx.store.insert(collection, record)?;
    ctx.store.register_resource(&id, resource_type)?;
    tracing::debug!("[emulator] created {} {}", resource_type, id);
    Ok(())
}

/// Removes a record and its `resources` index entry, failing with
/// `<not_found>.NotFound` when it does not exist.
pub(crate) fn remove_existing(
    ctx: &mut RequestContext<'_>,
    collection: &str,
    not_found: &str,
    id: &str,
) -> Result<Record> {
    let record = ctx
        .store
        .remove(collection, id)?
        .ok_or_else(|| Ec2Error::not_found(not_found, id))?;
    ctx.store.unregister_resource(id)?;
    ctx.store.drop_references(collection, id);
    tracing::debug!("[emulator] deleted {}", id);
    Ok(record)
}

pub(crate) fn ensure_exists(
    ctx: &RequestContext<'_>,
    collection: &str,
    not_found: &str,
    id: &str,
) -> Result<()> {
    if ctx.store.contains(collection, id)? {
        Ok(())
    } else {
        Err(Ec2Error::not_found(not_found, id))
    }
}

pub(crate) fn parse_ipv4(value: &str, parameter: &str) -> Result<Ipv4Addr> {
    value.parse::<Ipv4Addr>().map_err(|_| {
        Ec2Error::invalid_value(format!(
            "Value ({value}) for parameter {parameter} is invalid. This is not a valid IPv4 address."
        ))
    })
}

/// Parses `a.b.c.d/n` into the address and prefix length.
pub(crate) fn parse_ipv4_cidr(value: &str, parameter: &str) -> Result<(Ipv4Addr, u8)> {
    let invalid = || {
        Ec2Error::invalid_value(format!(
            "Value ({value}) for parameter {parameter} is invalid. This is not a valid CIDR block."
        ))
    };
    let (address, prefix) = value.split_once('/').ok_or_else(invalid)?;
    let address = address.parse::<Ipv4Addr>().map_err(|_| invalid())?;
    let prefix = prefix
        .parse::<u8>()
        .ok()
        .filter(|p| *p <= 32)
        .ok_or_else(invalid)?;
    Ok((address, prefix))
}

/// How a `Describe*` action finds its records.
pub(crate) struct DescribeQuery {
    pub collection: &'static str,
    pub id_param: &'static str,
    pub not_found: &'static str,
    pub fields: FieldMap,
    pub set_name: &'static str,
    /// `None` for actions without `MaxResults`/`NextToken`.
    pub bounds: Option<PageBounds>,
}

/// Shared `Describe*` implementation: explicit ids, then filters, then paging.
pub(crate) fn describe(ctx: &RequestContext<'_>, query: &DescribeQuery) -> Result<ResponseBody> {
    let params = ctx.params;
    let ids = params.get_indexed_list(query.id_param);
    let filters = params.parse_filters(FILTER_PARAM);

    if query.bounds.is_some() && !ids.is_empty() && params.get_scalar(MAX_RESULTS_PARAM).is_some()
    {
        return Err(Ec2Error::InvalidParameterCombination(format!(
            "The parameter {} cannot be used with the parameter {MAX_RESULTS_PARAM}",
            query.id_param
        )));
    }
    if ctx.settings.strict_filters {
        check_known(&filters, query.fields)?;
    }
    for id in &ids {
        ensure_exists(ctx, query.collection, query.not_found, id)?;
    }

    let mut selected: Vec<Value> = Vec::new();
    for record in ctx.store.records(query.collection)? {
        if !ids.is_empty() && !ids.contains(&record.id) {
            continue;
        }
        if matches_all(record, &filters, query.fields, ctx.settings.strict_filters)? {
            selected.push(record.to_value());
        }
    }

    listing(ctx, selected, query.set_name, query.bounds)
}

/// Wraps result rows in `set_name`, paging them when `bounds` is given.
pub(crate) fn listing(
    ctx: &RequestContext<'_>,
    rows: Vec<Value>,
    set_name: &str,
    bounds: Option<PageBounds>,
) -> Result<ResponseBody> {
    let mut body = ResponseBody::new();
    let Some(bounds) = bounds else {
        body.insert(set_name.to_string(), Value::Array(rows));
        return Ok(body);
    };

    let page = paginate(
        &rows,
        ctx.params.get_int(MAX_RESULTS_PARAM)?,
        ctx.params.get_scalar(NEXT_TOKEN_PARAM),
        bounds,
        ctx.settings.strict_pagination,
    )?;
    body.insert(set_name.to_string(), Value::Array(page.items));
    if let Some(token) = page.next_token {
        body.insert("nextToken".to_string(), Value::String(token));
    }
    Ok(body)
}
