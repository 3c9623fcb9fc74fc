// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

use ec2_engine::PageBounds;

pub const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024; // 1 MB
/// Answered with 408 by the timeout layer. A mutation still running on its
/// blocking thread at this point is rolled back, not committed.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const XML_CONTENT_TYPE: &str = "text/xml;charset=UTF-8";

// resource collections
pub const VPCS: &str = "vpcs";
pub const VPC_ENDPOINTS: &str = "vpc_endpoints";
pub const CUSTOMER_GATEWAYS: &str = "customer_gateways";
pub const VPN_GATEWAYS: &str = "vpn_gateways";
pub const VPN_CONNECTIONS: &str = "vpn_connections";

// `TagSpecification.N.ResourceType` values
pub const VPC_RESOURCE_TYPE: &str = "vpc";
pub const VPC_ENDPOINT_RESOURCE_TYPE: &str = "vpc-endpoint";
pub const CUSTOMER_GATEWAY_RESOURCE_TYPE: &str = "customer-gateway";
pub const VPN_GATEWAY_RESOURCE_TYPE: &str = "vpn-gateway";
pub const VPN_CONNECTION_RESOURCE_TYPE: &str = "vpn-connection";

/// https://docs.aws.amazon.com/AWSEC2/latest/APIReference/API_DescribeVpcs.html
pub const DESCRIBE_VPCS_BOUNDS: PageBounds = PageBounds::new(5, 1000, 1000);
/// https://docs.aws.amazon.com/AWSEC2/latest/APIReference/API_DescribeVpcEndpoints.html
pub const DESCRIBE_VPC_ENDPOINTS_BOUNDS: PageBounds = PageBounds::new(1, 1000, 1000);
/// https://docs.aws.amazon.com/AWSEC2/latest/APIReference/API_DescribeTags.html
pub const DESCRIBE_TAGS_BOUNDS: PageBounds = PageBounds::new(5, 1000, 1000);

// VPC CIDR blocks must be between /16 and /28
pub const MIN_VPC_PREFIX_LENGTH: u8 = 16;
pub const MAX_VPC_PREFIX_LENGTH: u8 = 28;

pub const DEFAULT_BGP_ASN: i64 = 65000;
pub const DEFAULT_AMAZON_SIDE_ASN: i64 = 64512;
pub const VPN_TYPE: &str = "ipsec.1";
