// ABOUTME: HTTP middleware for the dashboard server
// ABOUTME: Provides the production site access gate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Builder-app site access gate
pub mod site_access;

pub use site_access::{site_access_middleware, AccessDecision, SiteAccessGate};
