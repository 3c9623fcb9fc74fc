// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Filter evaluation for `Describe*` actions.
//!
//! A resource passes a filter set when it matches every filter (AND), and it
//! matches one filter when any of its values is listed (OR). The tag filters
//! `tag:<key>`, `tag-key` and `tag-value` are understood for every resource;
//! every other filter name is resolved through the [`FieldMap`] of the
//! calling handler.

use serde_json::Value;

use crate::error::{Ec2Error, Result};
use crate::models::{Filter, Tag};

/// Filter name to attribute path, e.g. `("vpc-id", "vpcId")` or
/// `("attachment.vpc-id", "attachments.vpcId")`.
pub type FieldMap = &'static [(&'static str, &'static str)];

const TAG_PREFIX: &str = "tag:";
const TAG_KEY_FILTER: &str = "tag-key";
const TAG_VALUE_FILTER: &str = "tag-value";

pub trait Filterable {
    fn tags(&self) -> &[Tag];

    /// Every value found at the dotted attribute `path`, as strings.
    fn field_values(&self, path: &str) -> Vec<String>;
}

pub fn matches<T: Filterable + ?Sized>(
    resource: &T,
    filter: &Filter,
    fields: FieldMap,
    strict: bool,
) -> Result<bool> {
    if filter.values.is_empty() {
        return Ok(true);
    }
    let accepts = |candidate: &str| filter.values.iter().any(|v| v == candidate);

    if let Some(key) = filter.name.strip_prefix(TAG_PREFIX) {
        return Ok(resource
            .tags()
            .iter()
            .any(|tag| tag.key == key && accepts(&tag.value)));
    }
    if filter.name == TAG_KEY_FILTER {
        return Ok(resource.tags().iter().any(|tag| accepts(&tag.key)));
    }
    if filter.name == TAG_VALUE_FILTER {
        return Ok(resource.tags().iter().any(|tag| accepts(&tag.value)));
    }

    match fields.iter().find(|(name, _)| *name == filter.name) {
        Some((_, path)) => Ok(resource.field_values(path).iter().any(|v| accepts(v))),
        None if strict => Err(Ec2Error::invalid_value(format!(
            "The filter '{}' is invalid",
            filter.name
        ))),
        None => {
            tracing::debug!("[engine] ignoring unknown filter '{}'", filter.name);
            Ok(true)
        }
    }
}

pub fn matches_all<T: Filterable + ?Sized>(
    resource: &T,
    filters: &[Filter],
    fields: FieldMap,
    strict: bool,
) -> Result<bool> {
    for filter in filters {
        if !matches(resource, filter, fields, strict)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Rejects filter names that are neither tag filters nor in `fields`.
pub fn check_known(filters: &[Filter], fields: FieldMap) -> Result<()> {
    let unknown = filters.iter().find(|filter| {
        let name = filter.name.as_str();
        let is_tag = name.starts_with(TAG_PREFIX) || name == TAG_KEY_FILTER || name == TAG_VALUE_FILTER;
        !is_tag && !fields.iter().any(|(known, _)| *known == name)
    });
    match unknown {
        Some(filter) => Err(Ec2Error::invalid_value(format!(
            "The filter '{}' is invalid",
            filter.name
        ))),
        None => Ok(()),
    }
}

/// Walks `path` through nested mappings, fanning out across sequences.
pub fn values_at_path(value: &Value, path: &str) -> Vec<String> {
    let mut found = Vec::new();
    collect(value, path, &mut found);
    found
}

fn collect(value: &Value, path: &str, found: &mut Vec<String>) {
    if let Value::Array(items) = value {
        for item in items {
            collect(item, path, found);
        }
        return;
    }
    if path.is_empty() {
        if let Some(text) = scalar_text(value) {
            found.push(text);
        }
        return;
    }
    let (head, rest) = path.split_once('.').unwrap_or((path, ""));
    if let Some(child) = value.get(head) {
        collect(child, rest, found);
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
