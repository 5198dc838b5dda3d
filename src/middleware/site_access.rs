// ABOUTME: Site access gate that checks visitors against the builder app before serving pages
// ABOUTME: Handles public sites, one-time auth tokens and session cookies in production mode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Site access middleware
//!
//! In production every non-asset request is checked against the builder app:
//!
//! 1. Public sites are served without further checks.
//! 2. Visitors with neither a session cookie nor an `authToken` query parameter
//!    are redirected to the builder app's access page.
//! 3. An `authToken` is validated once, then exchanged for a session cookie by
//!    redirecting to the same URL without the token.
//! 4. A session cookie is validated on every request.
//!
//! Failures of the builder app never let a request through on their own, and
//! a gate without a configured builder app refuses every gated request.

use crate::config::ServerConfig;
use crate::utils::http_client::shared_client;
use analytics_core::constants::{headers, routes};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

/// Builder app could not answer an access check
#[derive(Debug, Error)]
pub enum AccessCheckError {
    /// No builder app URL configured
    #[error("builder app URL is not configured")]
    NotConfigured,
    /// Transport or decode failure
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicCheckResponse {
    #[serde(default)]
    is_public: bool,
}

#[derive(Debug, Serialize)]
struct TokenCheckRequest<'a> {
    token: &'a str,
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenCheckResponse {
    #[serde(default)]
    allowed: bool,
}

/// What to do with a gated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Serve the request
    Allow,
    /// Send the visitor to the builder app's access page
    RedirectToAppAccess {
        /// Redirect target
        location: String,
    },
    /// Token or session was rejected
    Forbidden,
    /// Token accepted; store it as the session and drop it from the URL
    EstablishSession {
        /// Request URL without `authToken`
        location: String,
        /// Token to store in the session cookie
        token: String,
    },
}

impl AccessDecision {
    /// Response for decisions that short-circuit the request
    #[must_use]
    pub fn response(self) -> Option<Response> {
        match self {
            Self::Allow => None,
            Self::RedirectToAppAccess { location } => {
                Some((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
            }
            Self::Forbidden => Some(
                (
                    StatusCode::FORBIDDEN,
                    [(header::CONTENT_TYPE, "text/plain")],
                    "Forbidden",
                )
                    .into_response(),
            ),
            Self::EstablishSession { location, token } => Some(
                (
                    StatusCode::FOUND,
                    [
                        (header::LOCATION, location),
                        (header::SET_COOKIE, session_cookie(&token)),
                    ],
                )
                    .into_response(),
            ),
        }
    }
}

/// Access checks against the builder app
#[derive(Clone)]
pub struct SiteAccessGate {
    enabled: bool,
    builder_url: Option<String>,
    public_origin: Option<String>,
    client: Client,
}

impl SiteAccessGate {
    /// Gate configured from the server settings
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            enabled: config.site_access.enabled,
            builder_url: config
                .proxy
                .base_url
                .as_ref()
                .map(|url| url.as_str().trim_end_matches('/').to_owned()),
            public_origin: config
                .site_access
                .public_origin
                .as_ref()
                .map(|origin| origin.trim_end_matches('/').to_owned()),
            client: shared_client().clone(),
        }
    }

    /// Whether requests are gated at all
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Paths that are always served
    #[must_use]
    pub fn is_ungated(path: &str) -> bool {
        routes::UNGATED_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
    }

    /// Decide what to do with a request for `path_and_query`
    pub async fn decide(&self, request_headers: &HeaderMap, path_and_query: &str) -> AccessDecision {
        let origin = self.origin(request_headers);
        let request_url = format!("{origin}{path_and_query}");

        match self.is_public(&origin).await {
            Ok(true) => return AccessDecision::Allow,
            Ok(false) => {}
            Err(e) => error!(error = %e, "Error checking site public status"),
        }

        let session = session_token(request_headers);
        let auth_token = auth_token(path_and_query);

        if session.is_none() && auth_token.is_none() {
            debug!("No session or auth token, redirecting to app access");
            return self.redirect_to_app_access(&request_url);
        }

        if let Some(token) = auth_token {
            match self.is_allowed(&token, &origin).await {
                Ok(false) => {
                    warn!("Auth token rejected by builder app");
                    return AccessDecision::Forbidden;
                }
                Ok(true) => {
                    return AccessDecision::EstablishSession {
                        location: strip_auth_token(&request_url),
                        token,
                    };
                }
                Err(e) => {
                    error!(error = %e, "Token validation error");
                    if session.is_none() {
                        return self.redirect_to_app_access(&request_url);
                    }
                }
            }
        }

        if let Some(session) = session {
            match self.is_allowed(&session, &origin).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!("Session rejected by builder app");
                    return AccessDecision::Forbidden;
                }
                Err(e) => {
                    error!(error = %e, "Access validation error");
                    return self.redirect_to_app_access(&request_url);
                }
            }
        }

        AccessDecision::Allow
    }

    fn origin(&self, request_headers: &HeaderMap) -> String {
        if let Some(origin) = &self.public_origin {
            return origin.clone();
        }
        let scheme = header_str(request_headers, "x-forwarded-proto").unwrap_or("http");
        let host = header_str(request_headers, header::HOST.as_str()).unwrap_or("localhost");
        format!("{scheme}://{host}")
    }

    fn builder_url(&self) -> Result<&str, AccessCheckError> {
        self.builder_url
            .as_deref()
            .ok_or(AccessCheckError::NotConfigured)
    }

    /// Redirect to the builder app's access page; without a builder app
    /// there is nowhere to send the visitor, so access is refused
    fn redirect_to_app_access(&self, request_url: &str) -> AccessDecision {
        let Some(builder_url) = self.builder_url.as_deref() else {
            warn!("No builder app URL configured, refusing gated request");
            return AccessDecision::Forbidden;
        };
        AccessDecision::RedirectToAppAccess {
            location: format!(
                "{builder_url}{}?redirect={}",
                routes::APP_ACCESS,
                urlencoding::encode(request_url)
            ),
        }
    }

    async fn is_public(&self, origin: &str) -> Result<bool, AccessCheckError> {
        let url = format!(
            "{}{}?url={}",
            self.builder_url()?,
            routes::WEBSITE_ACCESS,
            urlencoding::encode(origin)
        );
        let response: PublicCheckResponse = self.client.get(url).send().await?.json().await?;
        Ok(response.is_public)
    }

    async fn is_allowed(&self, token: &str, origin: &str) -> Result<bool, AccessCheckError> {
        let url = format!("{}{}", self.builder_url()?, routes::WEBSITE_ACCESS);
        let response: TokenCheckResponse = self
            .client
            .post(url)
            .json(&TokenCheckRequest { token, url: origin })
            .send()
            .await?
            .json()
            .await?;
        Ok(response.allowed)
    }
}

/// Axum middleware enforcing [`SiteAccessGate`]
pub async fn site_access_middleware(
    State(gate): State<Arc<SiteAccessGate>>,
    req: Request,
    next: Next,
) -> Response {
    if !gate.is_enabled() || SiteAccessGate::is_ungated(req.uri().path()) {
        return next.run(req).await;
    }

    let path_and_query = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_owned(), ToString::to_string);

    match gate.decide(req.headers(), &path_and_query).await.response() {
        Some(response) => response,
        None => next.run(req).await,
    }
}

fn header_str<'a>(request_headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    request_headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Session token from the `Cookie` header(s)
fn session_token(request_headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{}=", headers::SESSION_COOKIE);
    request_headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(prefix.as_str()))
        .find(|token| !token.is_empty())
        .map(ToOwned::to_owned)
}

/// `authToken` query parameter, if present and non-empty
fn auth_token(path_and_query: &str) -> Option<String> {
    let (_, query) = path_and_query.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == headers::AUTH_TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Request URL with the `authToken` parameter removed
fn strip_auth_token(request_url: &str) -> String {
    let Ok(mut url) = Url::parse(request_url) else {
        return request_url.to_owned();
    };
    let remaining: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != headers::AUTH_TOKEN_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if remaining.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(remaining);
    }
    url.to_string()
}

fn session_cookie(token: &str) -> String {
    format!(
        "{}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        headers::SESSION_COOKIE,
        headers::SESSION_MAX_AGE_SECS
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_parsing() {
        let mut request_headers = HeaderMap::new();
        request_headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; userSession=abc123; other=1"),
        );
        assert_eq!(session_token(&request_headers), Some("abc123".to_owned()));
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_auth_token_extraction() {
        assert_eq!(
            auth_token("/dashboard?authToken=t%2B1&tab=2"),
            Some("t+1".to_owned())
        );
        assert_eq!(auth_token("/dashboard?tab=2"), None);
        assert_eq!(auth_token("/dashboard"), None);
    }

    #[test]
    fn test_strip_auth_token() {
        assert_eq!(
            strip_auth_token("https://app.example.com/dash?authToken=abc&tab=2"),
            "https://app.example.com/dash?tab=2"
        );
        assert_eq!(
            strip_auth_token("https://app.example.com/dash?authToken=abc"),
            "https://app.example.com/dash"
        );
    }

    #[test]
    fn test_ungated_paths() {
        assert!(SiteAccessGate::is_ungated("/assets/app.css"));
        assert!(SiteAccessGate::is_ungated("/build/entry.js"));
        assert!(SiteAccessGate::is_ungated("/health"));
        assert!(!SiteAccessGate::is_ungated("/api/dashboard"));
    }

    #[test]
    fn test_session_cookie_attributes() {
        assert_eq!(
            session_cookie("tok"),
            "userSession=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=86400"
        );
    }
}
