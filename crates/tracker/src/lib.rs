//! Tracker - bulk operations for a project-tracking GraphQL API
//!
//! This crate provides the core functionality behind the `tracker` CLI:
//!
//! - [`bulk`] - Bounded-concurrency execution of one operation over many
//!   identifiers, with progress reporting and summaries
//! - [`api`] - GraphQL client with authentication and rate-limit handling
//! - [`entity`] - Resolving identifiers and running delete/archive mutations
//! - [`http`] - Transport seam over `reqwest`
//! - [`retry`] - Exponential backoff for rate-limited requests
//!
//! # Example
//!
//! ```ignore
//! use tracker::{EntityAction, EntityKind, ExecutionOptions, GraphQlClient, ProgressReporter};
//!
//! let client = GraphQlClient::new(tracker::DEFAULT_API_URL, &api_key)?;
//! let options = ExecutionOptions::default();
//! let mut progress = ProgressReporter::new(std::io::stdout(), true, &options);
//!
//! let summary = tracker::execute(
//!     vec!["ENG-1".into(), "ENG-2".into()],
//!     move |id| {
//!         let client = client.clone();
//!         async move { tracker::run_action(&client, EntityKind::Issue, EntityAction::Delete, id).await }
//!     },
//!     &options,
//!     &mut progress,
//! )
//! .await;
//! ```

pub mod api;
pub mod bulk;
pub mod entity;
pub mod http;
pub mod retry;

pub use api::{ApiError, DEFAULT_API_URL, GraphQlClient};
pub use bulk::{
    BulkError, ExecutionOptions, ExecutionSummary, IdentifierSources, OperationResult,
    ProgressReporter, SummaryFormat, collect_identifiers, execute, write_summary,
};
pub use entity::{EntityAction, EntityKind, EntityNode, apply, resolve, run_action};
