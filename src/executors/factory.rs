// ABOUTME: Executor factory that selects the direct or proxy strategy at startup
// ABOUTME: Wraps both implementations in one enum so callers share a single handle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Executor selection
//!
//! The execution mode is read from configuration once. Call sites never
//! branch on it; they hold an `Arc<dyn QueryExecutor>`.

use super::{DirectExecutor, ProxyExecutor, QueryExecutor};
use crate::config::{ExecutionMode, ServerConfig};
use crate::query::retry::RetryPolicy;
use crate::query::{QueryError, ReadQuery};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Executor instance wrapper that delegates to the selected implementation
#[derive(Clone)]
pub enum Executor {
    /// Pooled `PostgreSQL` connections
    Direct(DirectExecutor),
    /// Remote execution service
    Proxy(ProxyExecutor),
}

impl Executor {
    /// Create the executor for the configured mode
    ///
    /// # Errors
    ///
    /// Returns an error if the direct connection string is malformed.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        match config.execution_mode {
            ExecutionMode::Direct => {
                let retry = RetryPolicy::new(config.retry.max_attempts, config.retry.base_delay);
                Ok(Self::Direct(DirectExecutor::new(&config.database, retry)?))
            }
            ExecutionMode::Proxy => Ok(Self::Proxy(ProxyExecutor::new(
                &config.proxy,
                config.database.url.clone(),
            ))),
        }
    }

    /// Get a descriptive string for the selected strategy
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::Direct(_) => "Direct (pooled PostgreSQL connections)",
            Self::Proxy(_) => "Proxy (HTTP execution service)",
        }
    }

    /// The execution mode this executor implements
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        match self {
            Self::Direct(_) => ExecutionMode::Direct,
            Self::Proxy(_) => ExecutionMode::Proxy,
        }
    }
}

#[async_trait]
impl QueryExecutor for Executor {
    fn name(&self) -> &'static str {
        match self {
            Self::Direct(executor) => executor.name(),
            Self::Proxy(executor) => executor.name(),
        }
    }

    async fn fetch_rows(&self, query: &ReadQuery) -> Result<Vec<Value>, QueryError> {
        match self {
            Self::Direct(executor) => executor.fetch_rows(query).await,
            Self::Proxy(executor) => executor.fetch_rows(query).await,
        }
    }

    async fn shutdown(&self) {
        match self {
            Self::Direct(executor) => executor.shutdown().await,
            Self::Proxy(executor) => executor.shutdown().await,
        }
    }
}

/// Build the process-wide executor for `config`
///
/// # Errors
///
/// Returns an error if the selected executor cannot be constructed.
pub fn build_executor(config: &ServerConfig) -> Result<Arc<dyn QueryExecutor>> {
    let executor = Executor::new(config)?;
    info!(
        mode = %executor.mode(),
        "Query executor initialized: {}",
        executor.backend_info()
    );
    Ok(Arc::new(executor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_selects_strategy() {
        let mut config = ServerConfig::default();

        config.execution_mode = ExecutionMode::Proxy;
        let executor = Executor::new(&config).unwrap();
        assert_eq!(executor.mode(), ExecutionMode::Proxy);
        assert_eq!(executor.name(), "proxy");

        config.execution_mode = ExecutionMode::Direct;
        let executor = Executor::new(&config).unwrap();
        assert_eq!(executor.mode(), ExecutionMode::Direct);
        assert_eq!(executor.name(), "direct");
    }

    #[test]
    fn test_malformed_database_url_fails_at_startup() {
        let mut config = ServerConfig::default();
        config.execution_mode = ExecutionMode::Direct;
        config.database.url = Some("definitely not a url".to_owned());
        assert!(build_executor(&config).is_err());
    }
}
