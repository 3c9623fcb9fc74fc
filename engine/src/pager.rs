// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Offset based pagination.
//!
//! A `NextToken` is the decimal offset of the next element in the filtered,
//! id-ordered result sequence. Tokens are not tied to a snapshot: writes
//! between two calls can shift the sequence.

use crate::error::{Ec2Error, Result};

/// Accepted `MaxResults` range of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub min: usize,
    pub max: usize,
    pub default: usize,
}

impl PageBounds {
    pub const fn new(min: usize, max: usize, default: usize) -> Self {
        Self { min, max, default }
    }

    pub fn clamp(&self, requested: Option<i64>) -> usize {
        match requested {
            None => self.default,
            Some(n) if n < 0 => self.min,
            Some(n) => usize::try_from(n)
                .unwrap_or(self.max)
                .clamp(self.min, self.max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

/// Parses a token. Lenient mode treats garbage as offset 0.
pub fn parse_token(token: Option<&str>, strict: bool) -> Result<usize> {
    let Some(token) = token else {
        return Ok(0);
    };
    match token.trim().parse::<usize>() {
        Ok(offset) => Ok(offset),
        Err(_) if strict => Err(Ec2Error::InvalidPaginationToken(token.to_string())),
        Err(_) => {
            tracing::debug!("[engine] unparsable pagination token '{}', restarting", token);
            Ok(0)
        }
    }
}

pub fn paginate<T: Clone>(
    items: &[T],
    max_results: Option<i64>,
    next_token: Option<&str>,
    bounds: PageBounds,
    strict: bool,
) -> Result<Page<T>> {
    let offset = parse_token(next_token, strict)?;
    let limit = bounds.clamp(max_results);

    let start = offset.min(items.len());
    let end = start.saturating_add(limit).min(items.len());
    let page: Vec<T> = items.get(start..end).unwrap_or_default().to_vec();

    let next_token = (end < items.len()).then(|| end.to_string());

    Ok(Page {
        items: page,
        next_token,
    })
}
