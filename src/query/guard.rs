// ABOUTME: Read-only SQL guard applied before any query leaves the process
// ABOUTME: Allows SELECT/WITH statements and rejects whole-word mutating keywords
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Read-only query guard
//!
//! This is a text heuristic, not a SQL parser. A forbidden keyword inside a
//! string literal or a comment is still a token and gets rejected, and
//! deliberately obfuscated statements are not detected. Treat the guard as a
//! first filter in front of a read-only database role, never as the only one.

use thiserror::Error;

/// Statement prefixes accepted after trimming and upper-casing
const ALLOWED_PREFIXES: &[&str] = &["SELECT", "WITH"];

/// Keywords that reject a query when they appear as a whole token
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "TRUNCATE", "ALTER", "CREATE", "GRANT", "REVOKE",
];

/// Reason a query was refused by the guard
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardViolation {
    /// Query text is empty or whitespace
    #[error("No SQL query provided. Please provide a valid SQL query to execute.")]
    Empty,
    /// Query does not begin with an allowed read-only verb
    #[error("Only SELECT queries are allowed for security reasons")]
    NotReadOnly {
        /// First token of the normalized query
        leading_keyword: String,
    },
    /// Query contains a mutating keyword
    #[error("Query contains forbidden SQL keywords")]
    ForbiddenKeyword {
        /// The first forbidden keyword found
        keyword: &'static str,
    },
}

/// Validate that `sql` is a read-only statement
///
/// # Errors
///
/// Returns a [`GuardViolation`] when the query is empty, does not start with
/// `SELECT`/`WITH`, or contains a forbidden keyword as a whole word.
pub fn validate_read_only(sql: &str) -> Result<(), GuardViolation> {
    let normalized = sql.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(GuardViolation::Empty);
    }

    if !ALLOWED_PREFIXES
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
    {
        return Err(GuardViolation::NotReadOnly {
            leading_keyword: leading_keyword(&normalized).to_owned(),
        });
    }

    if let Some(keyword) = first_forbidden_keyword(&normalized) {
        return Err(GuardViolation::ForbiddenKeyword { keyword });
    }

    Ok(())
}

fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
        .filter(|token| !token.is_empty())
}

fn first_forbidden_keyword(normalized: &str) -> Option<&'static str> {
    tokens(normalized).find_map(|token| {
        FORBIDDEN_KEYWORDS
            .iter()
            .find(|keyword| **keyword == token)
            .copied()
    })
}

fn leading_keyword(normalized: &str) -> &str {
    tokens(normalized).next().unwrap_or("UNKNOWN")
}

/// An immutable, guard-checked read query with ordered bind parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadQuery {
    sql: String,
    params: Vec<String>,
}

impl ReadQuery {
    /// Validate `sql` and capture it together with its parameters
    ///
    /// # Errors
    ///
    /// Returns the [`GuardViolation`] produced by [`validate_read_only`].
    pub fn new(sql: impl Into<String>, params: Vec<String>) -> Result<Self, GuardViolation> {
        let sql = sql.into();
        validate_read_only(&sql)?;
        Ok(Self { sql, params })
    }

    /// SQL text exactly as supplied
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind parameters in positional order (`$1`, `$2`, ...)
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Whether any bind parameters were supplied
    #[must_use]
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }
}
