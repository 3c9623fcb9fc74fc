// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use ec2_engine::{Ec2Error, xml};

use crate::constants::XML_CONTENT_TYPE;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AppError {
    #[error("{error}")]
    Ec2 { error: Ec2Error, request_id: String },
    #[error("internal server error")]
    InternalServerError,
}

impl AppError {
    pub fn ec2(error: Ec2Error, request_id: &str) -> Self {
        Self::Ec2 {
            error,
            request_id: request_id.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, request_id) = match self {
            Self::Ec2 { error, request_id } => {
                let status = StatusCode::from_u16(error.http_status())
                    .unwrap_or(StatusCode::BAD_REQUEST);
                (status, error.code(), error.to_string(), request_id)
            }
            Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError".to_string(),
                "Internal Server Error".to_string(),
                ec2_engine::utils::request_id(),
            ),
        };

        let body = xml::serialize_error(&code, &message, &request_id);

        (status, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body).into_response()
    }
}
