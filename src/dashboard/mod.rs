// ABOUTME: Analytics dashboard sections and the loader that fills them
// ABOUTME: Each section pairs a read-only query with a typed row shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Business analytics dashboard

/// Concurrent section loading
pub mod loader;
/// Section catalog, queries and row types
pub mod sections;

pub use loader::{DashboardData, DashboardLoader, SectionError, SectionRows};
pub use sections::{DashboardSection, SectionInfo, SectionKind, UnknownSection};
