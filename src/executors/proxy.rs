// ABOUTME: Proxy query executor that forwards read queries to a remote HTTP service
// ABOUTME: Applies a hard request timeout and maps transport failures to typed request errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP proxy execution
//!
//! The builder app exposes `POST /api/execute-query`, which runs the query
//! against the database named in the request body. Failures are never retried.

use super::QueryExecutor;
use crate::config::ProxyConfig;
use crate::query::errors::{ApiRequestError, FieldErrors};
use crate::query::{QueryError, ReadQuery};
use crate::utils::http_client::create_client_with_timeout;
use analytics_core::constants::{headers, routes};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// Request body understood by the execution service
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteQueryRequest<'a> {
    query: &'a str,
    database_url: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    params: &'a [String],
}

/// Executes read queries through the builder app's execution endpoint
#[derive(Clone)]
pub struct ProxyExecutor {
    client: Client,
    base_url: Option<Url>,
    database_url: String,
    timeout: Duration,
}

impl ProxyExecutor {
    /// Create a proxy executor
    ///
    /// `database_url` is forwarded verbatim in every request body.
    #[must_use]
    pub fn new(config: &ProxyConfig, database_url: Option<String>) -> Self {
        Self {
            client: create_client_with_timeout(config.timeout),
            base_url: config.base_url.clone(),
            database_url: database_url.unwrap_or_default(),
            timeout: config.timeout,
        }
    }

    /// Full URL of the execution endpoint
    fn endpoint(&self) -> Result<String, ApiRequestError> {
        let base = self
            .base_url
            .as_ref()
            .ok_or_else(|| ApiRequestError::new(500, "No proxy baseUrl provided"))?;
        Ok(format!(
            "{}{}",
            base.as_str().trim_end_matches('/'),
            routes::PROXY_EXECUTE_QUERY
        ))
    }

    async fn send(&self, query: &ReadQuery) -> Result<Vec<Value>, ApiRequestError> {
        let endpoint = self.endpoint()?;
        let body = ExecuteQueryRequest {
            query: query.sql(),
            database_url: &self.database_url,
            params: query.params(),
        };

        debug!(
            executor = self.name(),
            endpoint = %endpoint,
            params = query.params().len(),
            timeout_ms = self.timeout.as_millis(),
            "Dispatching query to proxy"
        );

        let response = self
            .client
            .post(&endpoint)
            .timeout(self.timeout)
            .header(headers::NGROK_SKIP_BROWSER_WARNING, "true")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &text));
        }

        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| ApiRequestError::new(500, format!("Invalid JSON response: {e}")))?;
        rows_from_payload(payload)
    }
}

#[async_trait]
impl QueryExecutor for ProxyExecutor {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn fetch_rows(&self, query: &ReadQuery) -> Result<Vec<Value>, QueryError> {
        match self.send(query).await {
            Ok(rows) => {
                debug!(executor = self.name(), rows = rows.len(), "Query completed");
                Ok(rows)
            }
            Err(error) => {
                warn!(
                    executor = self.name(),
                    status = error.status,
                    error = %error,
                    "Proxied query failed"
                );
                Err(error.into())
            }
        }
    }
}

/// Map a `reqwest` failure; timeouts get their own status
fn transport_error(error: reqwest::Error) -> ApiRequestError {
    if error.is_timeout() {
        ApiRequestError::timeout()
    } else {
        ApiRequestError::new(500, error.to_string())
    }
}

/// Build the error for a non-2xx response, reading `error` and `errors` when the body is JSON
fn error_from_body(status: u16, body: &str) -> ApiRequestError {
    let payload: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let message = payload
        .get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or(DEFAULT_ERROR_MESSAGE);
    let errors = payload
        .get("errors")
        .cloned()
        .and_then(|errors| serde_json::from_value::<FieldErrors>(errors).ok());

    ApiRequestError::new(status, message).with_errors(errors)
}

/// Accept `{ "data": [...] }` or a bare array of rows
fn rows_from_payload(payload: Value) -> Result<Vec<Value>, ApiRequestError> {
    match payload {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(rows)) => Ok(rows),
            _ => Err(ApiRequestError::new(
                500,
                "Proxy response does not contain a data array",
            )),
        },
        _ => Err(ApiRequestError::new(
            500,
            "Proxy response does not contain a data array",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_parsing() {
        let error = error_from_body(
            422,
            r#"{"error":"Invalid query","errors":{"query":["must not be empty"]}}"#,
        );
        assert_eq!(error.status, 422);
        assert_eq!(error.message, "Invalid query");
        assert_eq!(
            error.errors.unwrap()["query"],
            vec!["must not be empty".to_owned()]
        );
    }

    #[test]
    fn test_error_body_defaults() {
        let error = error_from_body(502, "<html>Bad Gateway</html>");
        assert_eq!(error.status, 502);
        assert_eq!(error.message, DEFAULT_ERROR_MESSAGE);
        assert!(error.errors.is_none());
    }

    #[test]
    fn test_payload_shapes() {
        let rows = rows_from_payload(json!({"data": [{"a": 1}]})).unwrap();
        assert_eq!(rows, vec![json!({"a": 1})]);

        let rows = rows_from_payload(json!([{"a": 1}, {"a": 2}])).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows_from_payload(json!({"rows": []})).unwrap_err().status, 500);
    }

    #[test]
    fn test_params_omitted_when_empty() {
        let body = ExecuteQueryRequest {
            query: "SELECT 1",
            database_url: "postgres://localhost/db",
            params: &[],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"query": "SELECT 1", "databaseUrl": "postgres://localhost/db"})
        );
    }

    #[tokio::test]
    async fn test_missing_base_url() {
        let executor = ProxyExecutor::new(&ProxyConfig::default(), None);
        let query = ReadQuery::new("SELECT 1", Vec::new()).unwrap();
        let error = executor.fetch_rows(&query).await.unwrap_err();
        assert_eq!(error.to_string(), "No proxy baseUrl provided");
    }

    #[tokio::test]
    async fn test_timeout_holds_without_client_timeout() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = ProxyConfig {
            base_url: Some(Url::parse(&server.uri()).unwrap()),
            timeout: Duration::from_millis(200),
        };
        let executor = ProxyExecutor {
            client: Client::new(),
            ..ProxyExecutor::new(&config, None)
        };
        let query = ReadQuery::new("SELECT 1", Vec::new()).unwrap();

        let started = std::time::Instant::now();
        let error = executor.send(&query).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(error.status, 408);
    }
}
