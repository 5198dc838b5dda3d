// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Selects the execution strategy and reads pool, proxy, retry and gate settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration
//!
//! All settings come from process environment variables; there is no config
//! file. The execution strategy is chosen here once and never re-evaluated
//! per query.

use analytics_core::constants::{defaults, env_config};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Environment type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Where read queries are executed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// In-process pooled `PostgreSQL` connections
    Direct,
    /// Remote HTTP service that talks to the database
    Proxy,
}

impl ExecutionMode {
    /// Mode implied by the production deployment flag
    #[must_use]
    pub const fn from_production_flag(production: bool) -> Self {
        if production {
            Self::Direct
        } else {
            Self::Proxy
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "proxy" => Ok(Self::Proxy),
            other => Err(anyhow!(
                "Invalid execution mode '{other}': expected 'direct' or 'proxy'"
            )),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Proxy => write!(f, "proxy"),
        }
    }
}

/// TLS negotiation for pooled connections
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    /// Plain TCP
    Disable,
    /// TLS when the server offers it
    Prefer,
    /// TLS required, certificate not verified
    #[default]
    Require,
    /// TLS with CA verification
    VerifyCa,
    /// TLS with CA and hostname verification
    VerifyFull,
}

impl FromStr for SslMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "disable" => Ok(Self::Disable),
            "prefer" => Ok(Self::Prefer),
            "require" => Ok(Self::Require),
            "verify-ca" => Ok(Self::VerifyCa),
            "verify-full" => Ok(Self::VerifyFull),
            other => Err(anyhow!("Invalid SSL mode '{other}'")),
        }
    }
}

/// Direct pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Decoded connection string; `None` when unset
    #[serde(skip_serializing)]
    pub url: Option<String>,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// Connection acquire timeout
    pub connect_timeout: Duration,
    /// Idle connection lifetime
    pub idle_timeout: Duration,
    /// TLS mode
    pub ssl_mode: SslMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: defaults::DB_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(defaults::DB_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(defaults::DB_IDLE_TIMEOUT_SECS),
            ssl_mode: SslMode::default(),
        }
    }
}

/// Retry settings for the direct path
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Base backoff delay
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::QUERY_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(defaults::QUERY_RETRY_BASE_DELAY_MS),
        }
    }
}

/// Builder app endpoints shared by the query proxy and the site-access gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Builder app base URL
    pub base_url: Option<Url>,
    /// Hard timeout for a proxied query
    pub timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(defaults::PROXY_TIMEOUT_SECS),
        }
    }
}

/// Site-access gate settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteAccessConfig {
    /// Whether requests are gated at all
    pub enabled: bool,
    /// Origin reported to the access service instead of the request's `Host`
    pub public_origin: Option<String>,
}

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Production deployment flag
    pub production: bool,
    /// Selected execution strategy
    pub execution_mode: ExecutionMode,
    /// Bind host
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Direct pool settings
    pub database: DatabaseConfig,
    /// Direct retry settings
    pub retry: RetryConfig,
    /// Proxy settings
    pub proxy: ProxyConfig,
    /// Site-access gate settings
    pub site_access: SiteAccessConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            production: false,
            execution_mode: ExecutionMode::Proxy,
            host: defaults::HOST.to_owned(),
            http_port: defaults::HTTP_PORT,
            database: DatabaseConfig::default(),
            retry: RetryConfig::default(),
            proxy: ProxyConfig::default(),
            site_access: SiteAccessConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let production = parse_bool(env_config::DASHBOARD_PROD)?.unwrap_or(false);
        let execution_mode = match non_empty_var(env_config::QUERY_EXECUTION_MODE) {
            Some(mode) => mode.parse()?,
            None => ExecutionMode::from_production_flag(production),
        };
        let environment = non_empty_var(env_config::ENVIRONMENT).map_or_else(
            || {
                if production {
                    Environment::Production
                } else {
                    Environment::Development
                }
            },
            |value| Environment::from_str_or_default(&value),
        );

        let config = Self {
            environment,
            production,
            execution_mode,
            host: non_empty_var(env_config::HOST).unwrap_or_else(|| defaults::HOST.to_owned()),
            http_port: parse_var(env_config::HTTP_PORT)?.unwrap_or(defaults::HTTP_PORT),
            database: DatabaseConfig {
                url: non_empty_var(env_config::DATABASE_URL)
                    .map(|raw| decode_database_url(&raw))
                    .transpose()?,
                max_connections: parse_var(env_config::DB_MAX_CONNECTIONS)?
                    .unwrap_or(defaults::DB_MAX_CONNECTIONS),
                connect_timeout: Duration::from_secs(
                    parse_var(env_config::DB_CONNECT_TIMEOUT_SECS)?
                        .unwrap_or(defaults::DB_CONNECT_TIMEOUT_SECS),
                ),
                idle_timeout: Duration::from_secs(
                    parse_var(env_config::DB_IDLE_TIMEOUT_SECS)?
                        .unwrap_or(defaults::DB_IDLE_TIMEOUT_SECS),
                ),
                ssl_mode: parse_var(env_config::DB_SSL_MODE)?.unwrap_or_default(),
            },
            retry: RetryConfig {
                max_attempts: parse_var(env_config::QUERY_MAX_ATTEMPTS)?
                    .unwrap_or(defaults::QUERY_MAX_ATTEMPTS)
                    .max(1),
                base_delay: Duration::from_millis(
                    parse_var(env_config::QUERY_RETRY_BASE_DELAY_MS)?
                        .unwrap_or(defaults::QUERY_RETRY_BASE_DELAY_MS),
                ),
            },
            proxy: ProxyConfig {
                base_url: non_empty_var(env_config::API_BASE_URL)
                    .map(|raw| {
                        Url::parse(raw.trim_end_matches('/'))
                            .with_context(|| format!("Invalid {}", env_config::API_BASE_URL))
                    })
                    .transpose()?,
                timeout: Duration::from_secs(
                    parse_var(env_config::PROXY_TIMEOUT_SECS)?
                        .unwrap_or(defaults::PROXY_TIMEOUT_SECS),
                ),
            },
            site_access: SiteAccessConfig {
                enabled: production,
                public_origin: non_empty_var(env_config::PUBLIC_ORIGIN),
            },
        };

        config.warn_on_gaps();
        Ok(config)
    }

    /// Log settings that will make queries or the gate fail at request time
    fn warn_on_gaps(&self) {
        match self.execution_mode {
            ExecutionMode::Direct if self.database.url.is_none() => {
                warn!(
                    "{} is not set; direct execution cannot connect",
                    env_config::DATABASE_URL
                );
            }
            ExecutionMode::Proxy if self.proxy.base_url.is_none() => {
                warn!(
                    "{} is not set; proxied queries will fail",
                    env_config::API_BASE_URL
                );
            }
            _ => {}
        }
        if self.site_access.enabled && self.proxy.base_url.is_none() {
            warn!(
                "Site access gate is enabled without {}; access checks will fail closed",
                env_config::API_BASE_URL
            );
        }
    }

    /// One-line, secret-free summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "environment={} mode={} bind={}:{} database_url={} pool_max={} attempts={} proxy_base={} proxy_timeout={}s site_access={}",
            self.environment,
            self.execution_mode,
            self.host,
            self.http_port,
            if self.database.url.is_some() { "set" } else { "unset" },
            self.database.max_connections,
            self.retry.max_attempts,
            self.proxy
                .base_url
                .as_ref()
                .map_or_else(|| "unset".to_owned(), ToString::to_string),
            self.proxy.timeout.as_secs(),
            if self.site_access.enabled { "enabled" } else { "disabled" },
        )
    }
}

/// Percent-decode a connection string (credentials are commonly URL-encoded)
///
/// # Errors
///
/// Returns an error when the decoded bytes are not valid UTF-8.
pub fn decode_database_url(raw: &str) -> Result<String> {
    urlencoding::decode(raw)
        .map(std::borrow::Cow::into_owned)
        .with_context(|| format!("{} is not valid percent-encoded UTF-8", env_config::DATABASE_URL))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_var<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    non_empty_var(key)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|e| anyhow!("Invalid {key} value '{value}': {e}"))
        })
        .transpose()
}

fn parse_bool(key: &str) -> Result<Option<bool>> {
    non_empty_var(key)
        .map(|value| match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("Invalid {key} value '{value}': expected a boolean")),
        })
        .transpose()
}
