// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use uuid::Uuid;

use crate::constants::RESOURCE_ID_HEX_LENGTH;

/// Generates an EC2 style identifier such as `vpc-0a1b2c3d4e5f60718`.
#[inline]
pub fn random_id(prefix: &str) -> String {
    let suffix = fastrand::u128(..1u128 << (RESOURCE_ID_HEX_LENGTH * 4));
    format!("{prefix}-{suffix:0width$x}", width = RESOURCE_ID_HEX_LENGTH)
}

/// Generates a version 4 UUID for the `requestId` element.
#[inline]
pub fn request_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_shape() {
        let id = random_id("vpc");
        assert!(id.starts_with("vpc-"));
        let suffix = id.trim_start_matches("vpc-");
        assert_eq!(suffix.len(), RESOURCE_ID_HEX_LENGTH);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(random_id("vpce"), random_id("vpce"));
    }

    #[test]
    fn test_request_id_is_v4_uuid() {
        let id = request_id();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(parsed.to_string(), id);
        assert_ne!(request_id(), id);
    }
}
