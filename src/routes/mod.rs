// ABOUTME: Route module organization for the analytics dashboard HTTP endpoints
// ABOUTME: Provides route definitions for health checks and dashboard data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP routes
//!
//! Each module contains route definitions and thin handlers that delegate to
//! the dashboard loader.

/// Dashboard data routes
pub mod dashboard;
/// Health check and readiness routes
pub mod health;

pub use dashboard::DashboardRoutes;
pub use health::HealthRoutes;
