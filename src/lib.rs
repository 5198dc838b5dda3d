// ABOUTME: Main library entry point for the analytics dashboard server
// ABOUTME: Exposes the query execution layer, dashboard loader and HTTP surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Analytics Dashboard
//!
//! A small server that loads business metrics through parameterized read-only
//! SQL and serves them as JSON dashboard sections.
//!
//! ## Architecture
//!
//! - **Query**: read-only guard, numeric coercion, retry and the `QueryData` boundary
//! - **Executors**: direct pooled `PostgreSQL` or an HTTP execution proxy, chosen at startup
//! - **Dashboard**: six sections loaded concurrently
//! - **Routes / Middleware**: axum handlers and the production site access gate
//! - **Config / Logging**: environment-driven settings and `tracing` setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use analytics_dashboard::config::ServerConfig;
//! use analytics_dashboard::executors::build_executor;
//! use analytics_dashboard::query::QueryClient;
//! use serde_json::Value;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env()?;
//! let client = QueryClient::new(build_executor(&config)?);
//!
//! let result = client
//!     .execute::<Value>("SELECT COUNT(*) AS total FROM organizations", &[])
//!     .await;
//! println!("{}", serde_json::to_string(&result)?);
//! # Ok(())
//! # }
//! ```

/// Environment-driven configuration
pub mod config;

/// Dashboard sections and loader
pub mod dashboard;

/// Direct and proxy query executors
pub mod executors;

/// Structured logging setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Query execution layer
pub mod query;

/// HTTP route handlers
pub mod routes;

/// Server assembly and lifecycle
pub mod server;

/// Shared utilities
pub mod utils;
