// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

pub const XML_NAMESPACE: &str = "http://ec2.amazonaws.com/doc/2016-11-15/";
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub const ACTION_PARAM: &str = "Action";
pub const DRY_RUN_PARAM: &str = "DryRun";
pub const FILTER_PARAM: &str = "Filter";
pub const TAG_SPECIFICATION_PARAM: &str = "TagSpecification";
pub const MAX_RESULTS_PARAM: &str = "MaxResults";
pub const NEXT_TOKEN_PARAM: &str = "NextToken";

/// https://docs.aws.amazon.com/AWSEC2/latest/UserGuide/Using_Tags.html#tag-restrictions
pub const MAX_TAG_KEY_LENGTH: usize = 127;
pub const MAX_TAG_VALUE_LENGTH: usize = 256;
pub const RESERVED_TAG_PREFIX: &str = "aws:";

/// Collections every store carries regardless of the registered handlers.
pub const CROSS_CUTTING_COLLECTIONS: [&str; 4] = ["resources", "vpcs", "subnets", "security_groups"];
pub const RESOURCES_COLLECTION: &str = "resources";

pub const RESOURCE_ID_HEX_LENGTH: usize = 17;

pub const DEFAULT_ACCOUNT_ID: &str = "123456789012";
pub const DEFAULT_REGION: &str = "us-east-1";
