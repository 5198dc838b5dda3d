// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, scripted executors and router helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `analytics_dashboard`

use analytics_dashboard::{
    config::{ExecutionMode, ServerConfig},
    executors::QueryExecutor,
    query::{QueryError, ReadQuery},
    server::{build_router, ServerResources},
};
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tower::ServiceExt;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

type Responder = dyn Fn(&ReadQuery) -> Result<Vec<Value>, QueryError> + Send + Sync;

/// Executor whose answers are produced by a closure; counts calls
pub struct ScriptedExecutor {
    responder: Box<Responder>,
    calls: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new(
        responder: impl Fn(&ReadQuery) -> Result<Vec<Value>, QueryError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
        })
    }

    /// Executor that always returns the given rows
    pub fn returning(rows: Vec<Value>) -> Arc<Self> {
        Self::new(move |_| Ok(rows.clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryExecutor for ScriptedExecutor {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_rows(&self, query: &ReadQuery) -> Result<Vec<Value>, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.responder)(query)
    }
}

/// Configuration with the gate disabled and proxy mode selected
pub fn test_config() -> ServerConfig {
    ServerConfig {
        execution_mode: ExecutionMode::Proxy,
        ..ServerConfig::default()
    }
}

/// Router over the given config and executor
pub fn test_router(config: ServerConfig, executor: Arc<dyn QueryExecutor>) -> Router {
    init_test_logging();
    build_router(Arc::new(ServerResources::new(config, executor)))
}

/// Send a GET request through the router
pub async fn get(router: Router, uri: &str) -> Response {
    router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON
pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as text
pub async fn text_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
