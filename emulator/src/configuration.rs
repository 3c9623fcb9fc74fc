// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use clap::{ArgAction, Parser};
use ec2_engine::Settings;
use ec2_engine::constants::{DEFAULT_ACCOUNT_ID, DEFAULT_REGION};

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct ServerOptions {
    #[arg(long, default_value = "127.0.0.1", env("EMULATOR_HTTP_HOST"))]
    pub host: String,
    #[arg(long, default_value = "5000", env("EMULATOR_HTTP_PORT"))]
    pub port: u16,
    /// Reported as `ownerId` on every resource
    #[arg(long, default_value = DEFAULT_ACCOUNT_ID, env("EMULATOR_ACCOUNT_ID"))]
    pub account_id: String,
    #[arg(long, default_value = DEFAULT_REGION, env("EMULATOR_REGION"))]
    pub region: String,
    /// Reject unknown filter names instead of ignoring them
    #[arg(long, default_value = "false", env("EMULATOR_STRICT_FILTERS"), action = ArgAction::SetTrue)]
    pub strict_filters: bool,
    /// Reject unparsable NextToken values instead of restarting at the first page
    #[arg(long, default_value = "false", env("EMULATOR_STRICT_PAGINATION"), action = ArgAction::SetTrue)]
    pub strict_pagination: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        ServerOptions {
            host: "127.0.0.1".to_string(),
            port: 5000,
            account_id: DEFAULT_ACCOUNT_ID.to_string(),
            region: DEFAULT_REGION.to_string(),
            strict_filters: false,
            strict_pagination: false,
        }
    }
}

impl From<&ServerOptions> for Settings {
    fn from(options: &ServerOptions) -> Self {
        Settings {
            account_id: options.account_id.clone(),
            region: options.region.clone(),
            strict_filters: options.strict_filters,
            strict_pagination: options.strict_pagination,
        }
    }
}
