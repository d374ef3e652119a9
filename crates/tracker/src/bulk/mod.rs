//! Bulk-operation engine.
//!
//! Applies one mutating operation to many identifiers and reports the
//! outcome of each, without letting a single failure stop the run.
//!
//! # Module Structure
//!
//! - [`collect`] - Gather identifiers from arguments, a file, and stdin
//! - [`execute`] - Run an operation over the identifiers with bounded concurrency
//! - [`progress`] - Live status line (terminals) or structured logs
//! - [`summary`] - Human-readable report of the run
//!
//! # Example
//!
//! ```ignore
//! use tracker::bulk::{
//!     ExecutionOptions, IdentifierSources, OperationResult, ProgressReporter,
//!     SummaryFormat, collect_identifiers, execute, write_summary,
//! };
//!
//! let ids = collect_identifiers(&sources, tokio::io::stdin(), None).await?;
//! let options = ExecutionOptions::default();
//! let mut progress = ProgressReporter::new(std::io::stdout(), true, &options);
//! let summary = execute(ids, |id| async move {
//!     Ok::<_, String>(OperationResult::succeeded(id, None))
//! }, &options, &mut progress).await;
//! write_summary(&mut std::io::stdout(), &summary, &SummaryFormat::new("issue", "deleted"))?;
//! ```

pub mod collect;
mod error;
mod executor;
pub mod progress;
pub mod summary;
mod types;

pub use collect::{IdentifierSources, collect_identifiers, read_bulk_file, read_stdin, tokenize};
pub use error::{BulkError, Result};
pub use executor::{execute, failure_message};
pub use progress::{LoggingReporter, ProgressReporter, StatusLine};
pub use summary::{SummaryFormat, pluralize, render_summary, write_summary};
pub use types::{
    CANCELLED_MESSAGE, DEFAULT_CONCURRENCY, DEFAULT_STDIN_TIMEOUT_SECS, ExecutionOptions,
    ExecutionSummary, OperationResult, ProgressTally, UNKNOWN_ERROR_MESSAGE,
};
