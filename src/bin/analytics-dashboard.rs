// ABOUTME: Server binary for the analytics dashboard
// ABOUTME: Loads configuration, initializes logging and serves dashboard data over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Analytics Dashboard Server Binary
//!
//! Starts the HTTP server with the execution strategy selected from the
//! environment, optionally overridden on the command line.

use analytics_core::constants::routes;
use analytics_dashboard::{
    config::{ExecutionMode, ServerConfig},
    logging, server,
};
use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "analytics-dashboard")]
#[command(about = "Analytics dashboard - read-only business metrics over HTTP")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override the query execution mode (direct or proxy)
    #[arg(long, value_parser = parse_mode)]
    mode: Option<ExecutionMode>,
}

fn parse_mode(value: &str) -> Result<ExecutionMode, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(mode) = args.mode {
        config.execution_mode = mode;
    }

    info!("Starting analytics dashboard");
    info!("{}", config.summary());
    display_available_endpoints(&config);

    if let Err(e) = server::run(config).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    info!("Analytics dashboard stopped");
    Ok(())
}

/// Display all available API endpoints
fn display_available_endpoints(config: &ServerConfig) {
    let base = format!("http://{}:{}", config.host, config.http_port);
    info!("=== Available API Endpoints ===");
    info!("Health:              GET {base}{}", routes::HEALTH);
    info!("Readiness:           GET {base}{}", routes::READY);
    info!("Dashboard:           GET {base}{}", routes::DASHBOARD);
    info!("Section catalog:     GET {base}{}", routes::DASHBOARD_SECTIONS);
    info!("Single section:      GET {base}{}", routes::DASHBOARD_SECTION);
    info!("=== End of Endpoint List ===");
}
