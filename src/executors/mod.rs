// ABOUTME: Query executor abstraction shared by the direct and proxy strategies
// ABOUTME: Defines the QueryExecutor trait that the query boundary dispatches through
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Query executors
//!
//! Two interchangeable strategies run validated read queries:
//!
//! - **Direct**: pooled `PostgreSQL` connections with bounded retry
//! - **Proxy**: a single HTTP call to a remote execution service with a hard timeout
//!
//! The strategy is chosen once at startup by [`build_executor`] and injected
//! into the [`QueryClient`](crate::query::QueryClient).

use crate::query::{QueryError, ReadQuery};
use async_trait::async_trait;
use serde_json::Value;

/// Pooled `PostgreSQL` executor
pub mod direct;
/// Executor selection and the delegating wrapper
pub mod factory;
/// HTTP proxy executor
pub mod proxy;

pub use direct::DirectExecutor;
pub use factory::{build_executor, Executor};
pub use proxy::ProxyExecutor;

/// A strategy that runs a validated read query and returns its rows
///
/// Rows are JSON objects keyed by column name. Numeric wire types have already
/// been coerced to numbers.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Run the query
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] describing the execution or transport failure.
    async fn fetch_rows(&self, query: &ReadQuery) -> Result<Vec<Value>, QueryError>;

    /// Release any long-lived resources
    async fn shutdown(&self) {}
}
