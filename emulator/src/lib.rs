// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # EC2 Emulator
//!
//! An HTTP server speaking the EC2 Query Protocol against an in-memory
//! resource store, for testing infrastructure code without an AWS account.
//!
//! ## Architecture
//!
//! ```text
//! AWS SDK / CLI -> HTTP (this crate) -> ec2_engine::Engine -> services::* handlers
//!                                              |
//!                                              +-> ResourceStore (in memory)
//! ```
//!
//! ## Modules
//!
//! - [`application`]: HTTP server setup with Axum, body limit and timeout
//! - [`configuration`]: CLI argument parsing with clap
//! - [`constants`]: Collection names, page bounds and HTTP limits
//! - [`errors`]: Application error type rendering the EC2 XML error envelope
//! - [`routes`]: HTTP route handlers (query endpoint, health, reset)
//! - [`services`]: Handlers for VPCs, VPC endpoints, VPN gateways and
//!   connections, customer gateways and tags
//!
//! ## Usage
//!
//! ```bash
//! ec2-emulator --host 127.0.0.1 --port 5000 --strict-filters
//! aws ec2 describe-vpcs --endpoint-url http://127.0.0.1:5000
//! ```

pub mod application;
pub mod configuration;
pub mod constants;
pub mod errors;
pub mod routes;
pub mod services;
