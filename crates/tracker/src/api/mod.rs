//! GraphQL API access.
//!
//! A small client over [`HttpTransport`](crate::http::HttpTransport) that
//! handles authentication, error envelopes and rate limiting. Entity-level
//! queries live in [`crate::entity`].

mod client;
mod error;
pub mod types;

pub use client::{DEFAULT_API_URL, GraphQlClient, RATE_LIMIT_RESET_HEADER};
pub use error::{ApiError, Result};
