// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # EC2 Engine
//!
//! The request/response engine behind the EC2 emulator. It knows nothing
//! about individual resource types; handlers registered in an
//! [`ActionRegistry`] supply those.
//!
//! ```text
//! params -> QueryParams -> Engine::dispatch -> handler(RequestContext) -> ResponseBody -> xml
//!                                                  |
//!                                                  +-> ResourceStore, filters, pager
//! ```
//!
//! ## Modules
//!
//! - [`params`]: Query-Protocol parameter normalization
//! - [`filters`]: `Filter.N` evaluation, including the tag filters
//! - [`pager`]: `MaxResults` / `NextToken` handling
//! - [`dispatch`]: action registry, engine and DryRun handling
//! - [`store`]: in-memory resource store with transactional mutation
//! - [`xml`]: response and error envelope rendering
//! - [`error`]: error codes and HTTP statuses

pub mod constants;
pub mod dispatch;
pub mod error;
pub mod filters;
pub mod models;
pub mod pager;
pub mod params;
pub mod store;
pub mod utils;
pub mod xml;

pub use dispatch::{ActionKind, ActionRegistry, Engine, Handler, RequestContext, ResponseBody};
pub use error::{Ec2Error, Result};
pub use filters::{FieldMap, Filterable};
pub use models::{Filter, Settings, Tag, TagSpecification};
pub use pager::{Page, PageBounds};
pub use params::QueryParams;
pub use store::{Record, ResourceStore};
