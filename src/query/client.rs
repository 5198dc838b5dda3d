// ABOUTME: Query boundary that validates, dispatches and decodes read queries
// ABOUTME: Folds every failure into the tagged QueryData result so callers never see an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::errors::QueryError;
use super::guard::ReadQuery;
use crate::executors::QueryExecutor;
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Outcome of a query: rows or a display message, never both
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData<T> {
    /// Query succeeded
    Success(T),
    /// Query failed at any stage
    Failure {
        /// Caller-facing message
        error_message: String,
    },
}

impl<T> QueryData<T> {
    /// Build a failure result
    pub fn failure(error_message: impl Into<String>) -> Self {
        Self::Failure {
            error_message: error_message.into(),
        }
    }

    /// Whether this is a failure
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Success payload, if any
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// Failure message, if any
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error_message } => Some(error_message),
        }
    }

    /// Transform the success payload
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryData<U> {
        match self {
            Self::Success(data) => QueryData::Success(f(data)),
            Self::Failure { error_message } => QueryData::Failure { error_message },
        }
    }

    /// Convert into a standard `Result`
    ///
    /// # Errors
    ///
    /// Returns the failure message.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure { error_message } => Err(error_message),
        }
    }
}

impl<T: Serialize> Serialize for QueryData<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("QueryData", 2)?;
        match self {
            Self::Success(data) => {
                state.serialize_field("isError", &false)?;
                state.serialize_field("data", data)?;
            }
            Self::Failure { error_message } => {
                state.serialize_field("isError", &true)?;
                state.serialize_field("errorMessage", error_message)?;
            }
        }
        state.end()
    }
}

/// Entry point for every read query in the application
///
/// Holds the executor chosen at startup; cloning is cheap.
#[derive(Clone)]
pub struct QueryClient {
    executor: Arc<dyn QueryExecutor>,
}

impl QueryClient {
    /// Create a client over the given executor
    #[must_use]
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Name of the underlying executor
    #[must_use]
    pub fn executor_name(&self) -> &'static str {
        self.executor.name()
    }

    /// Run a read query and decode each row into `T`
    ///
    /// Never fails: validation, execution, transport and decode errors all
    /// become [`QueryData::Failure`].
    pub async fn execute<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[String],
    ) -> QueryData<Vec<T>> {
        match self.try_execute(sql, params).await {
            Ok(rows) => QueryData::Success(rows),
            Err(error) => {
                let message = error.to_string();
                debug!(
                    executor = self.executor.name(),
                    error = %message,
                    "Query returned a failure result"
                );
                if message.is_empty() {
                    QueryData::failure(format!(
                        "Something went wrong executing the query: {sql}"
                    ))
                } else {
                    QueryData::failure(message)
                }
            }
        }
    }

    /// Run a read query and keep rows as JSON objects
    pub async fn execute_raw(&self, sql: &str, params: &[String]) -> QueryData<Vec<Value>> {
        self.execute(sql, params).await
    }

    /// Run a read query, surfacing the typed error
    ///
    /// # Errors
    ///
    /// Returns the [`QueryError`] from whichever stage failed.
    pub async fn try_execute<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<T>, QueryError> {
        let query = ReadQuery::new(sql, params.to_vec())?;
        let rows = self.executor.fetch_rows(&query).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| QueryError::Decode(e.to_string())))
            .collect()
    }

    /// Release executor resources
    pub async fn shutdown(&self) {
        self.executor.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_serialization() {
        let data: QueryData<Vec<i32>> = QueryData::Success(vec![1, 2]);
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"isError": false, "data": [1, 2]})
        );
    }

    #[test]
    fn test_failure_serialization() {
        let data: QueryData<Vec<i32>> = QueryData::failure("boom");
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"isError": true, "errorMessage": "boom"})
        );
        assert!(data.data().is_none());
        assert_eq!(data.into_result(), Err("boom".to_owned()));
    }
}
