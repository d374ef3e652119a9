//! Shared bulk types and constants.

use serde::Serialize;

/// Default number of operations in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Seconds to wait for piped stdin before giving up on it.
pub const DEFAULT_STDIN_TIMEOUT_SECS: u64 = 5;

/// Error recorded for items that were never dispatched because a
/// cancellation was requested.
pub const CANCELLED_MESSAGE: &str = "cancelled before dispatch";

/// Error recorded when a failure carries no message at all.
pub const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// Outcome of applying an operation to a single identifier.
///
/// A result is either a success or a failure with a non-empty message; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl OperationResult {
    /// A successful outcome.
    pub fn succeeded(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
            success: true,
            error: None,
        }
    }

    /// A failed outcome. Blank messages become [`UNKNOWN_ERROR_MESSAGE`].
    pub fn failed(id: impl Into<String>, name: Option<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        let error = if error.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            error
        };

        Self {
            id: id.into(),
            name,
            success: false,
            error: Some(error),
        }
    }

    /// The identifier the operation ran against.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable label for the entity, if the operation found one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Failure description; `None` for successes.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Aggregate outcome of a bulk run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    total: usize,
    succeeded: usize,
    failed: usize,
    results: Vec<OperationResult>,
}

impl ExecutionSummary {
    /// Build the summary from the complete, ordered result list.
    pub fn from_results(results: Vec<OperationResult>) -> Self {
        let total = results.len();
        let succeeded = results.iter().filter(|r| r.is_success()).count();

        Self {
            total,
            succeeded,
            failed: total - succeeded,
            results,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Results in dispatch order.
    pub fn results(&self) -> &[OperationResult] {
        &self.results
    }

    /// Iterate over failed results only.
    pub fn failures(&self) -> impl Iterator<Item = &OperationResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// True when at least one item failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Options controlling a bulk run.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionOptions {
    /// Draw the live status line (terminals only).
    pub show_progress: bool,
    /// Use glyphs and colors instead of plain ASCII labels.
    pub color_enabled: bool,
    /// Maximum operations in flight. Zero is treated as one.
    pub concurrency: usize,
    /// Skip confirmation prompts. Read by command handlers, not the executor.
    pub force: bool,
    /// Polled before each batch; once it returns true the remaining items
    /// are not dispatched.
    pub cancel_requested: Option<fn() -> bool>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            show_progress: true,
            color_enabled: true,
            concurrency: DEFAULT_CONCURRENCY,
            force: false,
            cancel_requested: None,
        }
    }
}

impl ExecutionOptions {
    /// Effective concurrency, never below one.
    #[inline]
    pub fn effective_concurrency(&self) -> usize {
        std::cmp::max(1, self.concurrency)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel_requested.is_some_and(|check| check())
    }
}

/// Running counts reported to the progress reporter after each item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressTally {
    pub completed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl ProgressTally {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, result: &OperationResult) {
        self.completed += 1;
        if result.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Completion percentage, rounded to the nearest integer.
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 100;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as usize
    }
}
