// ABOUTME: HTTP server assembly for the analytics dashboard
// ABOUTME: Wires shared resources, routes and layers, and drains the executor on shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Server setup and lifecycle
//!
//! The executor is created once at startup and owned by [`ServerResources`].
//! After the listener stops accepting connections and in-flight requests
//! finish, the executor is shut down so pooled connections close cleanly.

use crate::config::ServerConfig;
use crate::executors::{build_executor, QueryExecutor};
use crate::middleware::{site_access_middleware, SiteAccessGate};
use crate::query::QueryClient;
use crate::routes::{DashboardRoutes, HealthRoutes};
use analytics_core::constants::headers;
use anyhow::{Context, Result};
use axum::extract::Request;
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span};

/// Long-lived state shared by every handler
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Query boundary over the selected executor
    pub query_client: QueryClient,
    /// Production access gate
    pub site_access: Arc<SiteAccessGate>,
}

impl ServerResources {
    /// Assemble resources around an already built executor
    #[must_use]
    pub fn new(config: ServerConfig, executor: Arc<dyn QueryExecutor>) -> Self {
        let site_access = Arc::new(SiteAccessGate::new(&config));
        Self {
            config: Arc::new(config),
            query_client: QueryClient::new(executor),
            site_access,
        }
    }
}

/// Build the application router with all layers applied
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .headers()
            .get(headers::REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(DashboardRoutes::routes(resources.clone()))
        .layer(middleware::from_fn_with_state(
            resources.site_access.clone(),
            site_access_middleware,
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(trace_layer)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Run the server until Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns an error if the executor cannot be built, the address cannot be
/// bound, or the server fails while running.
pub async fn run(config: ServerConfig) -> Result<()> {
    let executor = build_executor(&config)?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.http_port))?;

    let resources = Arc::new(ServerResources::new(config, executor));
    let router = build_router(resources.clone());

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP server listening on http://{addr}");

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("HTTP server stopped, shutting down query executor");
    resources.query_client.shutdown().await;

    served.context("HTTP server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
