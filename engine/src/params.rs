// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Query-Protocol parameter normalization.
//!
//! EC2 requests arrive as a flat list of `key=value` pairs in which lists and
//! structures are encoded with 1-based indices:
//!
//! ```text
//! VpcId.1=vpc-a&VpcId.2=vpc-b
//! Filter.1.Name=state&Filter.1.Value.1=available
//! TagSpecification.1.ResourceType=vpc&TagSpecification.1.Tag.1.Key=env&TagSpecification.1.Tag.1.Value=prod
//! ```
//!
//! [`QueryParams`] keeps the pairs in arrival order and rebuilds the typed
//! structures on demand. Keys with malformed indices are skipped instead of
//! failing the request.

use std::collections::BTreeMap;

use crate::constants::{ACTION_PARAM, DRY_RUN_PARAM};
use crate::error::{Ec2Error, Result};
use crate::models::{Filter, Tag, TagSpecification};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Decodes an `application/x-www-form-urlencoded` string.
    pub fn parse(encoded: &str) -> Result<Self> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(encoded)
            .map_err(|err| Ec2Error::invalid_value(format!("malformed query string: {err}")))?;
        Ok(Self { pairs })
    }

    /// Appends the pairs of `other`, keeping the existing ones first.
    pub fn extend(&mut self, other: QueryParams) {
        self.pairs.extend(other.pairs);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns the first value stored under `name`.
    pub fn get_scalar(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`get_scalar`](Self::get_scalar) but absent or empty values are a
    /// `MissingParameter` error.
    pub fn require(&self, name: &str) -> Result<&str> {
        match self.get_scalar(name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Ec2Error::MissingParameter(name.to_string())),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<Option<i64>> {
        match self.get_scalar(name) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| Ec2Error::ParameterType {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
        }
    }

    pub fn get_bool(&self, name: &str) -> bool {
        str2bool(self.get_scalar(name))
    }

    pub fn action(&self) -> Result<&str> {
        self.require(ACTION_PARAM)
    }

    pub fn dry_run(&self) -> bool {
        self.get_bool(DRY_RUN_PARAM)
    }

    /// Collects `name.1`, `name.2`, ... ordered by index, not by arrival.
    pub fn get_indexed_list(&self, name: &str) -> Vec<String> {
        let mut indexed: BTreeMap<u64, &str> = BTreeMap::new();
        for (key, value) in &self.pairs {
            let Some(rest) = strip_member_prefix(key, name) else {
                continue;
            };
            if let Some(index) = parse_index(rest) {
                indexed.entry(index).or_insert(value.as_str());
            }
        }
        indexed.into_values().map(str::to_string).collect()
    }

    /// Groups `name.<i>.<rest>` keys by `i`; each group holds the `<rest>`
    /// keys of one structure.
    pub fn get_indexed_groups(&self, name: &str) -> Vec<QueryParams> {
        let mut groups: BTreeMap<u64, QueryParams> = BTreeMap::new();
        for (key, value) in &self.pairs {
            let Some(rest) = strip_member_prefix(key, name) else {
                continue;
            };
            let Some((index, field)) = rest.split_once('.') else {
                continue;
            };
            let Some(index) = parse_index(index) else {
                continue;
            };
            if field.is_empty() {
                continue;
            }
            groups
                .entry(index)
                .or_default()
                .pairs
                .push((field.to_string(), value.clone()));
        }
        groups.into_values().collect()
    }

    /// Reads a list that AWS SDKs spell either `Value.N` or `Values.N`.
    fn get_either_list(&self, singular: &str, plural: &str) -> Vec<String> {
        let values = self.get_indexed_list(singular);
        if values.is_empty() {
            self.get_indexed_list(plural)
        } else {
            values
        }
    }

    pub fn parse_filters(&self, name: &str) -> Vec<Filter> {
        self.get_indexed_groups(name)
            .into_iter()
            .filter_map(|group| {
                let filter_name = group.get_scalar("Name")?.to_string();
                Some(Filter {
                    name: filter_name,
                    values: group.get_either_list("Value", "Values"),
                })
            })
            .collect()
    }

    /// Reads `name.N.Key`/`name.N.Value` pairs; a missing value is empty.
    pub fn parse_tag_list(&self, name: &str) -> Vec<Tag> {
        self.get_indexed_groups(name)
            .into_iter()
            .filter_map(|group| {
                let key = group.get_scalar("Key")?;
                let value = group.get_scalar("Value").unwrap_or_default();
                Some(Tag::new(key, value))
            })
            .collect()
    }

    pub fn parse_tags(&self, name: &str) -> Vec<TagSpecification> {
        self.get_indexed_groups(name)
            .into_iter()
            .filter_map(|group| {
                let resource_type = group.get_scalar("ResourceType")?.to_string();
                let mut tags = group.parse_tag_list("Tag");
                if tags.is_empty() {
                    tags = group.parse_tag_list("Tags");
                }
                Some(TagSpecification {
                    resource_type,
                    tags,
                })
            })
            .collect()
    }
}

/// Case-insensitive `"true"`; everything else, absence included, is false.
pub fn str2bool(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

fn strip_member_prefix<'a>(key: &'a str, name: &str) -> Option<&'a str> {
    key.strip_prefix(name)?.strip_prefix('.')
}

/// Parses a 1-based list index. Zero, signs and non-digits are malformed.
fn parse_index(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u64>().ok().filter(|index| *index > 0)
}
