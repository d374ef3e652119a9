//! Error types for GraphQL API operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the tracker API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Request or response JSON could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success HTTP status without a GraphQL error body.
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Missing or rejected API key.
    #[error("Authentication failed: check your API key")]
    Auth,

    /// Rate limit exceeded.
    #[error("Rate limit exceeded{}", reset_hint(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    /// The server answered with GraphQL `errors`.
    #[error("{message}")]
    GraphQl {
        message: String,
        code: Option<String>,
    },

    /// No entity matched the identifier.
    #[error("{kind} not found: {identifier}")]
    NotFound {
        kind: &'static str,
        identifier: String,
    },

    /// More than one entity matched the identifier.
    #[error("{kind} '{identifier}' is ambiguous ({count} matches); use its ID instead")]
    Ambiguous {
        kind: &'static str,
        identifier: String,
        count: usize,
    },

    /// The action is not available for this kind of entity.
    #[error("Cannot {action} a {kind}")]
    Unsupported {
        kind: &'static str,
        action: &'static str,
    },

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

fn reset_hint(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!(". Resets at {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => String::new(),
    }
}

impl ApiError {
    /// Create a GraphQL error without a code.
    #[inline]
    pub fn graphql(message: impl Into<String>) -> Self {
        Self::GraphQl {
            message: message.into(),
            code: None,
        }
    }

    /// Create a not found error.
    #[inline]
    pub fn not_found(kind: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            identifier: identifier.into(),
        }
    }

    /// Check if this error is a rate limit error (retryable).
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Check if the entity does not exist, either by lookup or as reported
    /// by the server.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::GraphQl { message, .. } => message.to_ascii_lowercase().contains("not found"),
            Self::Status { status, .. } => *status == 404,
            _ => false,
        }
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
