// ABOUTME: Query execution layer shared by every dashboard section
// ABOUTME: Groups the read-only guard, numeric coercion, retry policy and result boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Query execution layer
//!
//! A query flows through [`guard`] (read-only check), an
//! [`executor`](crate::executors), [`coercion`] of numeric columns, and finally
//! the [`client`] boundary that turns any failure into a [`QueryData::Failure`].

/// Result boundary and the client used by callers
pub mod client;
/// Numeric wire type coercion table
pub mod coercion;
/// Query error types
pub mod errors;
/// Read-only SQL guard
pub mod guard;
/// Bounded retry with exponential backoff
pub mod retry;
/// Binary wire decoding for coerced types
pub mod wire;

pub use client::{QueryClient, QueryData};
pub use errors::{ApiRequestError, FieldErrors, QueryError};
pub use guard::{validate_read_only, GuardViolation, ReadQuery};
pub use retry::RetryPolicy;
