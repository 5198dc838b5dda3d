// ABOUTME: Core types and constants for the analytics dashboard backend
// ABOUTME: Foundation crate with error handling and application constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Analytics Core
//!
//! Foundation crate shared by the dashboard server. It changes rarely, which
//! keeps incremental builds of the server crate cheap.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Application-wide constants organized by domain

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;
