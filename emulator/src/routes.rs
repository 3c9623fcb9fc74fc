// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! HTTP route handlers for the emulator.
//!
//! | Method | Path | Handler | Description |
//! |--------|------|---------|-------------|
//! | GET, POST | `/` | [`query`] | EC2 Query-Protocol endpoint |
//! | GET | `/health` | [`health`] | Health check endpoint |
//! | POST | `/_emulator/reset` | [`reset`] | Clear every emulated resource |

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use ec2_engine::{Ec2Error, QueryParams, utils};
use serde_json::json;

use crate::application::AppState;
use crate::constants::{REQUEST_TIMEOUT, XML_CONTENT_TYPE};
use crate::errors::AppError;

/// Health check endpoint.
///
/// # Response
///
/// ```json
/// {"status": "ok"}
/// ```
pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Clears the resource store, for use between test runs.
#[tracing::instrument(skip(state))]
pub async fn reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.engine.reset();
    tracing::info!(
        "[emulator] store reset for account {} in {}",
        state.options.account_id,
        state.options.region
    );
    Json(json!({"status": "ok"}))
}

/// EC2 Query-Protocol endpoint.
///
/// Parameters are read from the query string and, for POST, from the
/// `application/x-www-form-urlencoded` body; query string pairs come first.
///
/// # Request Flow
///
/// 1. Assign a request id
/// 2. Decode the parameters into [`QueryParams`]
/// 3. Dispatch on `Action` on a blocking thread (the engine is synchronous);
///    a mutation still running at [`REQUEST_TIMEOUT`] is rolled back
/// 4. Return the XML document, or the XML error envelope
///
/// # Errors
///
/// - [`AppError::Ec2`] - any EC2 error, rendered with its code and status
/// - [`AppError::InternalServerError`] - the blocking task could not complete
#[tracing::instrument(skip(state, query, body))]
pub async fn query(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, AppError> {
    let deadline = Instant::now() + REQUEST_TIMEOUT;
    let request_id = utils::request_id();

    let params =
        decode_params(query.as_deref(), &body).map_err(|e| AppError::ec2(e, &request_id))?;

    tracing::debug!(
        "[emulator] request {} action {:?}",
        request_id,
        params.get_scalar("Action")
    );

    let engine = state.engine.clone();
    let task_request_id = request_id.clone();
    let result = tokio::task::spawn_blocking(move || {
        engine.handle_until(&params, &task_request_id, Some(deadline))
    })
    .await
    .map_err(|e| {
        tracing::error!("[emulator] spawn_blocking task failed: {:?}", e);
        AppError::InternalServerError
    })?;

    let xml = result.map_err(|e| AppError::ec2(e, &request_id))?;

    Ok(([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], xml).into_response())
}

fn decode_params(query: Option<&str>, body: &[u8]) -> Result<QueryParams, Ec2Error> {
    let mut params = match query {
        Some(query) if !query.is_empty() => QueryParams::parse(query)?,
        _ => QueryParams::default(),
    };
    if !body.is_empty() {
        let body = std::str::from_utf8(body)
            .map_err(|_| Ec2Error::invalid_value("request body is not valid UTF-8"))?;
        params.extend(QueryParams::parse(body)?);
    }
    Ok(params)
}
