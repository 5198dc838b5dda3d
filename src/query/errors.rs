// ABOUTME: Error types for query validation, execution and proxy transport
// ABOUTME: Every failure is folded into a display message at the query boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::guard::GuardViolation;
use super::wire::WireError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Field-level validation messages returned by the proxy (`field -> [messages]`)
pub type FieldErrors = HashMap<String, Vec<String>>;

/// HTTP-level failure of a proxied query
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiRequestError {
    /// HTTP status (408 for timeouts, 500 for transport and decode failures)
    pub status: u16,
    /// Message from the proxy's `error` field or the transport layer
    pub message: String,
    /// Optional structured field errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ApiRequestError {
    /// Create a request error without field details
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }

    /// Attach field-level errors
    #[must_use]
    pub fn with_errors(mut self, errors: Option<FieldErrors>) -> Self {
        self.errors = errors;
        self
    }

    /// The request did not complete within the configured timeout
    #[must_use]
    pub fn timeout() -> Self {
        Self::new(408, "Request timeout")
    }

    /// Whether this error represents a timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        self.status == 408
    }
}

/// Failure anywhere between the guard and typed rows
#[derive(Debug, Error)]
pub enum QueryError {
    /// Query text rejected before execution
    #[error(transparent)]
    Validation(#[from] GuardViolation),

    /// Driver or pool failure after all attempts were spent
    #[error("Failed to execute SQL query: {message}")]
    Execution {
        /// Message of the last failed attempt
        message: String,
    },

    /// Proxy transport failure
    #[error(transparent)]
    Request(#[from] ApiRequestError),

    /// Rows did not match the expected row shape
    #[error("Failed to decode query rows: {0}")]
    Decode(String),

    /// Binary column value could not be decoded
    #[error("Failed to decode column '{column}': {source}")]
    Wire {
        /// Column name
        column: String,
        /// Underlying decode failure
        #[source]
        source: WireError,
    },

    /// Executor is not usable with the current configuration
    #[error("{0}")]
    Configuration(String),
}

impl QueryError {
    /// Build an execution error from a driver message
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Whether another attempt may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(error: sqlx::Error) -> Self {
        Self::execution(error.to_string())
    }
}
