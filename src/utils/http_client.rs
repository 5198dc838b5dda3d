// ABOUTME: Shared HTTP client utilities with connection pooling and timeout configuration
// ABOUTME: Provides the builder-app client and per-strategy clients with custom timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use reqwest::{Client, ClientBuilder};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;

/// Global shared HTTP client with default configuration
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Get or create the shared HTTP client with default settings
///
/// Used for site-access checks against the builder app.
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| fallback_client(&e))
    })
}

/// Create a new HTTP client whose requests are aborted after `timeout`
///
/// Falls back to a default client if the custom client cannot be built, so
/// callers that need the bound must also set it per request.
#[must_use]
pub fn create_client_with_timeout(timeout: Duration) -> Client {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .unwrap_or_else(|e| fallback_client(&e))
}

fn fallback_client(error: &reqwest::Error) -> Client {
    warn!(error = %error, "Failed to build HTTP client, using defaults without timeouts");
    Client::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_client_is_reused() {
        assert!(std::ptr::eq(shared_client(), shared_client()));
    }
}
