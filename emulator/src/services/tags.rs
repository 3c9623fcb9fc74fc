// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Tag actions, which work on any resource registered in the `resources` index.

use ec2_engine::constants::{FILTER_PARAM, RESOURCES_COLLECTION};
use ec2_engine::filters::{check_known, matches_all};
use ec2_engine::{Ec2Error, FieldMap, Record, RequestContext, ResponseBody, Result, Tag};
use serde_json::{Value, json};

use super::{collection_for, listing, object, return_true};
use crate::constants::DESCRIBE_TAGS_BOUNDS;

const FIELDS: FieldMap = &[
    ("resource-id", "resourceId"),
    ("resource-type", "resourceType"),
    ("key", "key"),
    ("value", "value"),
];

fn resource_ids(ctx: &RequestContext<'_>) -> Result<Vec<String>> {
    let ids = ctx.params.get_indexed_list("ResourceId");
    if ids.is_empty() {
        return Err(Ec2Error::MissingParameter("ResourceId".to_string()));
    }
    Ok(ids)
}

/// Looks up a tagged resource by id alone, whatever its type.
fn resolve<'s>(ctx: &'s mut RequestContext<'_>, id: &str) -> Result<&'s mut Record> {
    let resource_type = ctx
        .store
        .resource_type_of(id)
        .ok_or_else(|| Ec2Error::InvalidId(id.to_string()))?;
    let collection = collection_for(&resource_type).ok_or_else(|| {
        Ec2Error::InternalError(format!("no collection for resource type '{resource_type}'"))
    })?;
    ctx.store
        .get_mut(collection, id)?
        .ok_or_else(|| Ec2Error::InvalidId(id.to_string()))
}

#[tracing::instrument(skip(ctx))]
pub fn create_tags(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let ids = resource_ids(ctx)?;
    let tags = ctx.params.parse_tag_list("Tag");
    if tags.is_empty() {
        return Err(Ec2Error::MissingParameter("Tag".to_string()));
    }
    for tag in &tags {
        tag.validate()?;
    }

    for id in &ids {
        resolve(ctx, id)?.put_tags(&tags);
    }
    tracing::debug!("[emulator] tagged {} resources", ids.len());
    Ok(return_true())
}

/// Without `Tag.N` every tag is removed; a tag given with a value is only
/// removed when the value matches.
#[tracing::instrument(skip(ctx))]
pub fn delete_tags(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let ids = resource_ids(ctx)?;
    let selectors: Vec<(String, Option<String>)> = ctx
        .params
        .get_indexed_groups("Tag")
        .into_iter()
        .filter_map(|group| {
            let key = group.get_scalar("Key")?.to_string();
            Some((key, group.get_scalar("Value").map(str::to_string)))
        })
        .collect();

    for id in &ids {
        let record = resolve(ctx, id)?;
        if selectors.is_empty() {
            record.tags.clear();
        }
        for (key, value) in &selectors {
            record.remove_tag(key, value.as_deref());
        }
    }
    Ok(return_true())
}

#[tracing::instrument(skip(ctx))]
pub fn describe_tags(ctx: &mut RequestContext<'_>) -> Result<ResponseBody> {
    let filters = ctx.params.parse_filters(FILTER_PARAM);
    let strict = ctx.settings.strict_filters;
    if strict {
        check_known(&filters, FIELDS)?;
    }

    let mut rows: Vec<Value> = Vec::new();
    for entry in ctx.store.records(RESOURCES_COLLECTION)? {
        let Some(resource_type) = entry.get_str("resourceType") else {
            continue;
        };
        let Some(collection) = collection_for(resource_type) else {
            continue;
        };
        let Some(record) = ctx.store.get(collection, &entry.id)? else {
            continue;
        };
        let mut tags: Vec<&Tag> = record.tags.iter().collect();
        tags.sort_by(|a, b| a.key.cmp(&b.key));
        for tag in tags {
            let row = Record::new(
                format!("{}/{}", record.id, tag.key),
                object(json!({
                    "resourceId": record.id,
                    "resourceType": resource_type,
                    "key": tag.key,
                    "value": tag.value
                })),
            );
            if matches_all(&row, &filters, FIELDS, strict)? {
                rows.push(row.to_value());
            }
        }
    }

    listing(ctx, rows, "tagSet", Some(DESCRIBE_TAGS_BOUNDS))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::constants::VPCS;
    use crate::services::testing::Harness;
    use crate::services::vpcs::create_vpc;
    use crate::services::vpn_gateways::create_vpn_gateway;

    fn setup() -> (Harness, String, String) {
        let mut harness = Harness::new();
        let body = harness.call(create_vpc, &[("CidrBlock", "10.0.0.0/16")]).unwrap();
        let vpc_id = body["vpc"]["vpcId"].as_str().unwrap().to_string();
        let body = harness.call(create_vpn_gateway, &[("Type", "ipsec.1")]).unwrap();
        let gateway_id = body["vpnGateway"]["vpnGatewayId"].as_str().unwrap().to_string();
        (harness, vpc_id, gateway_id)
    }

    fn tags_of(harness: &Harness, id: &str) -> Vec<Tag> {
        harness.store.get(VPCS, id).unwrap().unwrap().tags.clone()
    }

    #[test]
    fn test_create_tags_overwrites_keys() {
        let (mut harness, vpc_id, gateway_id) = setup();
        harness
            .call(
                create_tags,
                &[
                    ("ResourceId.1", vpc_id.as_str()),
                    ("ResourceId.2", gateway_id.as_str()),
                    ("Tag.1.Key", "env"),
                    ("Tag.1.Value", "dev"),
                    ("Tag.2.Key", "team"),
                ],
            )
            .unwrap();
        harness
            .call(
                create_tags,
                &[("ResourceId.1", vpc_id.as_str()), ("Tag.1.Key", "env"), ("Tag.1.Value", "prod")],
            )
            .unwrap();

        assert_eq!(
            tags_of(&harness, &vpc_id),
            vec![Tag::new("env", "prod"), Tag::new("team", "")]
        );
    }

    #[test]
    fn test_create_tags_validation() {
        let (mut harness, vpc_id, _) = setup();
        let err = harness
            .call(create_tags, &[("ResourceId.1", "vpc-missing"), ("Tag.1.Key", "env")])
            .unwrap_err();
        assert_eq!(err.code(), "InvalidID");

        let err = harness
            .call(create_tags, &[("ResourceId.1", vpc_id.as_str()), ("Tag.1.Key", "aws:owner")])
            .unwrap_err();
        assert_eq!(err.code(), "InvalidParameterValue");

        let err = harness.call(create_tags, &[("ResourceId.1", vpc_id.as_str())]).unwrap_err();
        assert_eq!(err.code(), "MissingParameter");

        let err = harness.call(create_tags, &[("Tag.1.Key", "env")]).unwrap_err();
        assert_eq!(err.code(), "MissingParameter");
    }

    #[test]
    fn test_delete_tags() {
        let (mut harness, vpc_id, _) = setup();
        let vpc = vpc_id.as_str();
        harness
            .call(
                create_tags,
                &[
                    ("ResourceId.1", vpc),
                    ("Tag.1.Key", "env"),
                    ("Tag.1.Value", "prod"),
                    ("Tag.2.Key", "team"),
                    ("Tag.2.Value", "net"),
                    ("Tag.3.Key", "owner"),
                    ("Tag.3.Value", "ops"),
                ],
            )
            .unwrap();

        harness
            .call(
                delete_tags,
                &[("ResourceId.1", vpc), ("Tag.1.Key", "env"), ("Tag.1.Value", "dev")],
            )
            .unwrap();
        assert_eq!(tags_of(&harness, vpc).len(), 3);

        harness
            .call(
                delete_tags,
                &[
                    ("ResourceId.1", vpc),
                    ("Tag.1.Key", "env"),
                    ("Tag.1.Value", "prod"),
                    ("Tag.2.Key", "team"),
                ],
            )
            .unwrap();
        assert_eq!(tags_of(&harness, vpc), vec![Tag::new("owner", "ops")]);

        harness.call(delete_tags, &[("ResourceId.1", vpc)]).unwrap();
        assert!(tags_of(&harness, vpc).is_empty());
    }

    #[test]
    fn test_describe_tags() {
        let (mut harness, vpc_id, gateway_id) = setup();
        harness
            .call(
                create_tags,
                &[
                    ("ResourceId.1", vpc_id.as_str()),
                    ("ResourceId.2", gateway_id.as_str()),
                    ("Tag.1.Key", "env"),
                    ("Tag.1.Value", "prod"),
                ],
            )
            .unwrap();

        let body = harness.call(describe_tags, &[]).unwrap();
        assert_eq!(body["tagSet"].as_array().unwrap().len(), 2);

        let body = harness
            .call(
                describe_tags,
                &[("Filter.1.Name", "resource-type"), ("Filter.1.Value.1", "vpn-gateway")],
            )
            .unwrap();
        let rows = body["tagSet"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["resourceId"], gateway_id.as_str());
        assert_eq!(rows[0]["key"], "env");
        assert_eq!(rows[0]["value"], "prod");

        harness.settings.strict_filters = true;
        let err = harness
            .call(describe_tags, &[("Filter.1.Name", "vpc-id"), ("Filter.1.Value.1", "x")])
            .unwrap_err();
        assert_eq!(err.code(), "InvalidParameterValue");
    }
}
