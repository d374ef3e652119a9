//! GraphQL client for the tracker API.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, Result};
use super::types::{GraphQlErrorBody, GraphQlRequest, GraphQlResponse};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::retry::{RetryConfig, with_retry};

/// Default GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://api.linear.app/graphql";

/// Header carrying the rate-limit reset time as epoch milliseconds.
pub const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Requests-Reset";

/// Error code the API uses for throttled requests.
const RATE_LIMITED_CODE: &str = "RATELIMITED";

/// Error code the API uses for rejected credentials.
const AUTHENTICATION_CODE: &str = "AUTHENTICATION_ERROR";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A thin GraphQL client. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct GraphQlClient {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
    api_key: String,
    retry: RetryConfig,
}

impl GraphQlClient {
    /// Create a client backed by a real HTTP transport.
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ApiError::Config("API key is empty".to_string()));
        }
        let transport = ReqwestTransport::with_timeout(REQUEST_TIMEOUT)?;
        Ok(Self::new_with_transport(
            endpoint,
            api_key,
            Arc::new(transport),
        ))
    }

    /// Create a client over an arbitrary transport.
    pub fn new_with_transport(
        endpoint: &str,
        api_key: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.to_string(),
            api_key: api_key.trim().to_string(),
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run a query or mutation and decode its `data` into `T`.
    ///
    /// Rate-limited requests are retried with backoff; everything else is
    /// returned to the caller as-is.
    pub async fn request<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let label = operation_label(query);
        with_retry(
            || self.send_once::<T>(query, &variables),
            self.retry.clone(),
            ApiError::is_rate_limited,
            label,
        )
        .await
    }

    async fn send_once<T: DeserializeOwned>(&self, query: &str, variables: &Value) -> Result<T> {
        let body = serde_json::to_vec(&GraphQlRequest { query, variables })?;
        let request = HttpRequest {
            url: self.endpoint.clone(),
            headers: vec![
                ("Authorization".to_string(), self.api_key.clone()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body,
        };

        let response = self.transport.send(request).await?;
        tracing::trace!(
            status = response.status,
            bytes = response.body.len(),
            "GraphQL response"
        );
        decode_response(response)
    }
}

/// Operation name for logs: the word after `query`/`mutation`.
fn operation_label(query: &str) -> &str {
    let mut tokens = query
        .split(|c: char| c.is_whitespace() || c == '(' || c == '{')
        .filter(|s| !s.is_empty());
    match tokens.next() {
        Some("query" | "mutation") => tokens.next().unwrap_or("graphql"),
        _ => "graphql",
    }
}

fn rate_limit_reset(response: &HttpResponse) -> Option<DateTime<Utc>> {
    response
        .header(RATE_LIMIT_RESET_HEADER)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
}

fn decode_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    match response.status {
        401 | 403 => return Err(ApiError::Auth),
        429 => {
            return Err(ApiError::RateLimited {
                reset_at: rate_limit_reset(&response),
            });
        }
        _ => {}
    }

    let envelope: GraphQlResponse = match serde_json::from_slice(&response.body) {
        Ok(envelope) => envelope,
        Err(_) if !response.is_success() => {
            return Err(ApiError::Status {
                status: response.status,
                message: body_excerpt(&response.body),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(errors) = envelope.errors.as_deref()
        && !errors.is_empty()
    {
        return Err(graphql_error(errors, &response));
    }

    if !response.is_success() {
        return Err(ApiError::Status {
            status: response.status,
            message: body_excerpt(&response.body),
        });
    }

    match envelope.data {
        Some(data) if !data.is_null() => Ok(serde_json::from_value(data)?),
        _ => Err(ApiError::graphql("response contained no data")),
    }
}

fn graphql_error(errors: &[GraphQlErrorBody], response: &HttpResponse) -> ApiError {
    if errors.iter().any(|e| e.code() == Some(RATE_LIMITED_CODE)) {
        return ApiError::RateLimited {
            reset_at: rate_limit_reset(response),
        };
    }
    if errors.iter().any(|e| e.code() == Some(AUTHENTICATION_CODE)) {
        return ApiError::Auth;
    }

    let message = errors
        .iter()
        .map(GraphQlErrorBody::display_message)
        .collect::<Vec<_>>()
        .join("; ");
    let code = errors.iter().find_map(|e| e.code()).map(str::to_string);
    ApiError::GraphQl { message, code }
}

fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty response".to_string();
    }
    trimmed.chars().take(200).collect()
}
