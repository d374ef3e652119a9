//! Progress reporting for bulk runs.
//!
//! Two modes, picked once per run:
//! - Interactive (terminal): a single status line rewritten in place
//! - Logging (pipes, CI, or progress disabled): structured `tracing` events
//!
//! The writer and the terminal check are passed in by the caller so the
//! reporter never inspects global terminal state itself.

use std::io::Write;

use super::types::{ExecutionOptions, OperationResult, ProgressTally};

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter<W: Write> {
    /// Overwriting status line for terminals.
    Interactive(StatusLine<W>),
    /// Structured logging for everything else.
    Logging(LoggingReporter),
}

impl<W: Write> ProgressReporter<W> {
    /// Pick the mode for a run. Interactive only when the destination is a
    /// terminal and progress display is enabled.
    pub fn new(writer: W, is_terminal: bool, options: &ExecutionOptions) -> Self {
        if is_terminal && options.show_progress {
            Self::Interactive(StatusLine::new(writer, options.color_enabled))
        } else {
            Self::Logging(LoggingReporter::new())
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive(_))
    }

    /// Called once before the first item is dispatched.
    pub fn start(&mut self, total: usize, concurrency: usize) {
        match self {
            Self::Interactive(line) => line.draw(&ProgressTally::new(total)),
            Self::Logging(r) => r.start(total, concurrency),
        }
    }

    /// Called after each item settles.
    pub fn item_settled(&mut self, result: &OperationResult, tally: &ProgressTally) {
        match self {
            Self::Interactive(line) => line.draw(tally),
            Self::Logging(r) => r.item_settled(result, tally),
        }
    }

    /// Called once after the last batch.
    pub fn finish(&mut self, tally: &ProgressTally) {
        match self {
            Self::Interactive(line) => line.clear(),
            Self::Logging(r) => r.finish(tally),
        }
    }
}

/// A single terminal line rewritten with a carriage return.
pub struct StatusLine<W: Write> {
    writer: W,
    color_enabled: bool,
    /// Width of the last drawn message, used to blank it on finish.
    last_width: usize,
}

impl<W: Write> StatusLine<W> {
    pub fn new(writer: W, color_enabled: bool) -> Self {
        Self {
            writer,
            color_enabled,
            last_width: 0,
        }
    }

    /// Compose the message for a tally, without control characters.
    pub fn message(&self, tally: &ProgressTally) -> String {
        if self.color_enabled {
            format!(
                "{}/{} ({}%) - {} ✓ / {} ✗",
                tally.completed,
                tally.total,
                tally.percent(),
                tally.succeeded,
                tally.failed
            )
        } else {
            format!(
                "{}/{} ({}%) - OK: {} / Failed: {}",
                tally.completed,
                tally.total,
                tally.percent(),
                tally.succeeded,
                tally.failed
            )
        }
    }

    fn draw(&mut self, tally: &ProgressTally) {
        let message = self.message(tally);
        let width = message.chars().count();
        // Pad over a longer previous line so no stale characters remain.
        let pad = self.last_width.saturating_sub(width);
        self.last_width = width.max(self.last_width);

        // Progress output is best-effort; a broken terminal must not fail the run.
        let _ = write!(self.writer, "\r{}{}", message, " ".repeat(pad));
        let _ = self.writer.flush();
    }

    fn clear(&mut self) {
        if self.last_width == 0 {
            return;
        }
        let _ = write!(self.writer, "\r{}\r", " ".repeat(self.last_width));
        let _ = self.writer.flush();
        self.last_width = 0;
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

/// Logging reporter using tracing for structured output.
#[derive(Debug, Default)]
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    fn start(&self, total: usize, concurrency: usize) {
        tracing::info!(total, concurrency, "Starting bulk operation");
    }

    fn item_settled(&self, result: &OperationResult, tally: &ProgressTally) {
        match result.error() {
            None => tracing::debug!(
                id = %result.id(),
                completed = tally.completed,
                total = tally.total,
                "Item succeeded"
            ),
            Some(error) => tracing::warn!(
                id = %result.id(),
                error = %error,
                completed = tally.completed,
                total = tally.total,
                "Item failed"
            ),
        }
    }

    fn finish(&self, tally: &ProgressTally) {
        tracing::info!(
            total = tally.total,
            succeeded = tally.succeeded,
            failed = tally.failed,
            "Bulk operation complete"
        );
    }
}
