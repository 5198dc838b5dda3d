// ABOUTME: Dashboard route handlers exposing section data as JSON
// ABOUTME: Serves the full dashboard, the section catalog and single sections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Dashboard routes
//!
//! Query failures are part of the payload (`isError: true`), so these handlers
//! answer `200` even when sections fail. Only an unknown section is an HTTP error.

use crate::dashboard::{
    DashboardData, DashboardLoader, DashboardSection, SectionInfo, SectionRows,
};
use crate::query::QueryData;
use crate::server::ServerResources;
use analytics_core::constants::{headers, routes};
use analytics_core::errors::{AppError, AppResult};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Dashboard routes
pub struct DashboardRoutes;

impl DashboardRoutes {
    /// Create all dashboard routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(routes::DASHBOARD, get(Self::handle_dashboard))
            .route(routes::DASHBOARD_SECTIONS, get(Self::handle_sections))
            .route(routes::DASHBOARD_SECTION, get(Self::handle_section))
            .with_state(resources)
    }

    /// Load every section concurrently
    async fn handle_dashboard(
        State(resources): State<Arc<ServerResources>>,
    ) -> Json<DashboardData> {
        Json(DashboardLoader::load(&resources.query_client).await)
    }

    /// List the section catalog
    async fn handle_sections() -> Json<Vec<SectionInfo>> {
        Json(
            DashboardSection::ALL
                .into_iter()
                .map(DashboardSection::info)
                .collect(),
        )
    }

    /// Load one section by its identifier
    async fn handle_section(
        State(resources): State<Arc<ServerResources>>,
        Path(section): Path<String>,
        request_headers: HeaderMap,
    ) -> AppResult<Json<QueryData<SectionRows>>> {
        let section = section.parse::<DashboardSection>().map_err(|e| {
            let available: Vec<&str> = DashboardSection::ALL
                .into_iter()
                .map(DashboardSection::slug)
                .collect();
            let error = AppError::not_found(format!("Dashboard section '{}'", e.0))
                .with_details(serde_json::json!({ "available_sections": available }));
            match request_headers
                .get(headers::REQUEST_ID)
                .and_then(|value| value.to_str().ok())
            {
                Some(request_id) => error.with_request_id(request_id),
                None => error,
            }
        })?;

        Ok(Json(
            DashboardLoader::load_section(&resources.query_client, section).await,
        ))
    }
}
