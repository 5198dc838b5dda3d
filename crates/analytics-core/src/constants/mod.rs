// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Environment variable names, defaults, routes and header names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into small domain modules rather than a single flat list.

/// Service identity
pub mod service_names {
    /// Service name used in structured logs
    pub const ANALYTICS_DASHBOARD: &str = "analytics-dashboard";
}

/// Environment variable names read at startup
pub mod env_config {
    /// Boolean deployment flag: production builds execute directly and gate site access
    pub const DASHBOARD_PROD: &str = "DASHBOARD_PROD";
    /// Explicit execution mode override (`direct` or `proxy`)
    pub const QUERY_EXECUTION_MODE: &str = "QUERY_EXECUTION_MODE";
    /// Percent-encoded `PostgreSQL` connection string
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Base URL of the builder app (query proxy and site-access service)
    pub const API_BASE_URL: &str = "API_BASE_URL";
    /// Bind host
    pub const HOST: &str = "HOST";
    /// Bind port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Deployment environment name
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Pool size
    pub const DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
    /// Pool connect/acquire timeout
    pub const DB_CONNECT_TIMEOUT_SECS: &str = "DB_CONNECT_TIMEOUT_SECS";
    /// Pool idle timeout
    pub const DB_IDLE_TIMEOUT_SECS: &str = "DB_IDLE_TIMEOUT_SECS";
    /// TLS mode for the direct pool
    pub const DB_SSL_MODE: &str = "DB_SSL_MODE";
    /// Attempts per query on the direct path
    pub const QUERY_MAX_ATTEMPTS: &str = "QUERY_MAX_ATTEMPTS";
    /// Base backoff between direct attempts
    pub const QUERY_RETRY_BASE_DELAY_MS: &str = "QUERY_RETRY_BASE_DELAY_MS";
    /// Hard timeout for proxied queries
    pub const PROXY_TIMEOUT_SECS: &str = "PROXY_TIMEOUT_SECS";
    /// Public origin override used by the site-access gate
    pub const PUBLIC_ORIGIN: &str = "PUBLIC_ORIGIN";
}

/// Default configuration values
pub mod defaults {
    /// Default bind host
    pub const HOST: &str = "127.0.0.1";
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 3000;
    /// Maximum pooled connections
    pub const DB_MAX_CONNECTIONS: u32 = 10;
    /// Connection acquire timeout in seconds
    pub const DB_CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Idle connection timeout in seconds
    pub const DB_IDLE_TIMEOUT_SECS: u64 = 60;
    /// Attempts per direct query (one retry)
    pub const QUERY_MAX_ATTEMPTS: u32 = 2;
    /// Base backoff; the wait before attempt `n + 1` is `base * 2^n`
    pub const QUERY_RETRY_BASE_DELAY_MS: u64 = 500;
    /// Proxy request timeout in seconds
    pub const PROXY_TIMEOUT_SECS: u64 = 5;
}

/// Routes served and called by the dashboard
pub mod routes {
    /// Liveness probe
    pub const HEALTH: &str = "/health";
    /// Readiness probe
    pub const READY: &str = "/ready";
    /// Full dashboard payload
    pub const DASHBOARD: &str = "/api/dashboard";
    /// Section catalog
    pub const DASHBOARD_SECTIONS: &str = "/api/dashboard/sections";
    /// Single dashboard section
    pub const DASHBOARD_SECTION: &str = "/api/dashboard/:section";
    /// Query proxy endpoint, relative to the builder base URL
    pub const PROXY_EXECUTE_QUERY: &str = "/api/execute-query";
    /// Site-access check endpoint, relative to the builder base URL
    pub const WEBSITE_ACCESS: &str = "/api/website-access";
    /// Builder-hosted sign-in page, relative to the builder base URL
    pub const APP_ACCESS: &str = "/app-access";
    /// Path prefixes never gated by site access
    pub const UNGATED_PREFIXES: &[&str] = &["/build/", "/assets/", HEALTH, READY];
}

/// HTTP header and cookie names
pub mod headers {
    /// Request correlation header
    pub const REQUEST_ID: &str = "x-request-id";
    /// Header that skips the ngrok interstitial page on tunnelled proxies
    pub const NGROK_SKIP_BROWSER_WARNING: &str = "ngrok-skip-browser-warning";
    /// Session cookie set after token validation
    pub const SESSION_COOKIE: &str = "userSession";
    /// Query parameter carrying a one-time access token
    pub const AUTH_TOKEN_PARAM: &str = "authToken";
    /// Session cookie lifetime in seconds (24 hours)
    pub const SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24;
}
