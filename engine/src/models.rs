// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ACCOUNT_ID, DEFAULT_REGION, MAX_TAG_KEY_LENGTH, MAX_TAG_VALUE_LENGTH,
    RESERVED_TAG_PREFIX,
};
use crate::error::{Ec2Error, Result};

/// A named predicate, e.g. `Filter.1.Name=vpc-id`, `Filter.1.Value.1=vpc-123`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub values: Vec<String>,
}

impl Filter {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Applies the EC2 tag restrictions. Only called on user supplied tags.
    pub fn validate(&self) -> Result<()> {
        let key_length = self.key.chars().count();
        if key_length == 0 || key_length > MAX_TAG_KEY_LENGTH {
            return Err(Ec2Error::invalid_value(format!(
                "Tag key must be between 1 and {MAX_TAG_KEY_LENGTH} characters, got '{}'",
                self.key
            )));
        }
        if self.value.chars().count() > MAX_TAG_VALUE_LENGTH {
            return Err(Ec2Error::invalid_value(format!(
                "Tag value for key '{}' exceeds {MAX_TAG_VALUE_LENGTH} characters",
                self.key
            )));
        }
        let reserved = self
            .key
            .get(..RESERVED_TAG_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(RESERVED_TAG_PREFIX));
        if reserved {
            return Err(Ec2Error::invalid_value(format!(
                "Tag keys starting with '{RESERVED_TAG_PREFIX}' are reserved for internal use, got '{}'",
                self.key
            )));
        }
        Ok(())
    }
}

/// `TagSpecification.N.ResourceType` plus its `Tag.M.Key`/`Tag.M.Value` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSpecification {
    pub resource_type: String,
    pub tags: Vec<Tag>,
}

impl TagSpecification {
    /// Collects and validates the tags addressed to `resource_type`.
    ///
    /// Later specifications override earlier ones key by key.
    pub fn tags_for(specs: &[TagSpecification], resource_type: &str) -> Result<Vec<Tag>> {
        let mut tags: Vec<Tag> = Vec::new();
        for spec in specs.iter().filter(|s| s.resource_type == resource_type) {
            for tag in &spec.tags {
                tag.validate()?;
                match tags.iter_mut().find(|t| t.key == tag.key) {
                    Some(existing) => existing.value = tag.value.clone(),
                    None => tags.push(tag.clone()),
                }
            }
        }
        Ok(tags)
    }
}

/// Engine behavior switches.
///
/// The permissive defaults reproduce EC2: unknown filter names match
/// everything and unparsable pagination tokens restart at offset 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub account_id: String,
    pub region: String,
    pub strict_filters: bool,
    pub strict_pagination: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            account_id: DEFAULT_ACCOUNT_ID.to_string(),
            region: DEFAULT_REGION.to_string(),
            strict_filters: false,
            strict_pagination: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_validate_ok() {
        assert!(Tag::new("env", "prod").validate().is_ok());
        assert!(Tag::new("k".repeat(127), "v".repeat(256)).validate().is_ok());
    }

    #[test]
    fn test_tag_validate_lengths() {
        assert!(Tag::new("", "v").validate().is_err());
        assert!(Tag::new("k".repeat(128), "v").validate().is_err());
        assert!(Tag::new("k", "v".repeat(257)).validate().is_err());
    }

    #[test]
    fn test_tag_validate_reserved_prefix_any_case() {
        for key in ["aws:name", "AWS:name", "Aws:cloudformation"] {
            let err = Tag::new(key, "v").validate().unwrap_err();
            assert_eq!(err.code(), "InvalidParameterValue");
        }
        assert!(Tag::new("awsname", "v").validate().is_ok());
    }

    #[test]
    fn test_tags_for_resource_type() {
        let specs = vec![
            TagSpecification {
                resource_type: "vpc".to_string(),
                tags: vec![Tag::new("env", "dev"), Tag::new("team", "net")],
            },
            TagSpecification {
                resource_type: "subnet".to_string(),
                tags: vec![Tag::new("env", "other")],
            },
            TagSpecification {
                resource_type: "vpc".to_string(),
                tags: vec![Tag::new("env", "prod")],
            },
        ];
        let tags = TagSpecification::tags_for(&specs, "vpc").unwrap();
        assert_eq!(tags, vec![Tag::new("env", "prod"), Tag::new("team", "net")]);
        assert!(TagSpecification::tags_for(&specs, "vpn-gateway").unwrap().is_empty());
    }

    #[test]
    fn test_settings_default_is_permissive() {
        let settings = Settings::default();
        assert!(!settings.strict_filters);
        assert!(!settings.strict_pagination);
        assert_eq!(settings.account_id, DEFAULT_ACCOUNT_ID);
    }
}
