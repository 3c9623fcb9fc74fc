// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Error taxonomy of the query engine.
//!
//! Every variant carries enough context to render the AWS error envelope:
//! [`Ec2Error::code`] is the machine-readable `<Code>` and the `Display`
//! implementation is the human-readable `<Message>`.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Ec2Error {
    #[error("The action {0} is not valid for this web service.")]
    InvalidAction(String),
    #[error("The request must contain the parameter {0}")]
    MissingParameter(String),
    #[error("{0}")]
    InvalidParameterValue(String),
    #[error("Invalid value '{value}' for {name}. It must be an integer.")]
    ParameterType { name: String, value: String },
    #[error("{0}")]
    InvalidParameterCombination(String),
    #[error("Invalid pagination token: {0}")]
    InvalidPaginationToken(String),
    #[error("The ID '{id}' does not exist")]
    NotFound { kind: String, id: String },
    #[error("The ID '{0}' is not valid")]
    InvalidId(String),
    #[error("The CIDR '{0}' is invalid.")]
    InvalidCidr(String),
    #[error("{0}")]
    IncorrectState(String),
    #[error("{0}")]
    DependencyViolation(String),
    #[error("Request would have succeeded, but DryRun flag is set.")]
    DryRunOperation,
    #[error("Request did not complete before its deadline.")]
    RequestExpired,
    #[error("{0}")]
    InternalError(String),
}

impl Ec2Error {
    /// Builds a `<Prefix>.NotFound` error, e.g. `not_found("InvalidVpcID", "vpc-1")`.
    pub fn not_found(kind: &str, id: &str) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidParameterValue(message.into())
    }

    pub fn code(&self) -> String {
        match self {
            Self::InvalidAction(_) => "InvalidAction".to_string(),
            Self::MissingParameter(_) => "MissingParameter".to_string(),
            Self::InvalidParameterValue(_) | Self::ParameterType { .. } => {
                "InvalidParameterValue".to_string()
            }
            Self::InvalidParameterCombination(_) => "InvalidParameterCombination".to_string(),
            Self::InvalidPaginationToken(_) => "InvalidPaginationToken".to_string(),
            Self::NotFound { kind, .. } => format!("{kind}.NotFound"),
            Self::InvalidId(_) => "InvalidID".to_string(),
            Self::InvalidCidr(_) => "InvalidVpc.Range".to_string(),
            Self::IncorrectState(_) => "IncorrectState".to_string(),
            Self::DependencyViolation(_) => "DependencyViolation".to_string(),
            Self::DryRunOperation => "DryRunOperation".to_string(),
            Self::RequestExpired => "RequestExpired".to_string(),
            Self::InternalError(_) => "InternalError".to_string(),
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::DryRunOperation => 412,
            Self::InternalError(_) => 500,
            _ => 400,
        }
    }
}

pub type Result<T> = std::result::Result<T, Ec2Error>;
