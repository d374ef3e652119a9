//! Human-readable rendering of an [`ExecutionSummary`].

use std::io::{self, Write};

use console::style;

use super::types::ExecutionSummary;

/// How to describe a run in its summary.
#[derive(Debug, Clone)]
pub struct SummaryFormat {
    /// Singular entity noun, e.g. "issue".
    pub entity_name: String,
    /// Past-tense operation, e.g. "deleted".
    pub operation_name: String,
    /// Imperative operation, e.g. "delete". Heads the total-failure line.
    pub operation_verb: Option<String>,
    /// Use glyphs and colors.
    pub color_enabled: bool,
    /// Itemize failures in mixed outcomes.
    pub show_details: bool,
}

impl SummaryFormat {
    pub fn new(entity_name: impl Into<String>, operation_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            operation_name: operation_name.into(),
            operation_verb: None,
            color_enabled: true,
            show_details: true,
        }
    }

    #[must_use]
    pub fn operation_verb(mut self, verb: impl Into<String>) -> Self {
        self.operation_verb = Some(verb.into());
        self
    }

    #[must_use]
    pub fn color_enabled(mut self, enabled: bool) -> Self {
        self.color_enabled = enabled;
        self
    }

    #[must_use]
    pub fn show_details(mut self, show: bool) -> Self {
        self.show_details = show;
        self
    }
}

/// Naive English plural: the noun unchanged for one, with an `s` otherwise.
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Render the summary as output lines.
pub fn render_summary(summary: &ExecutionSummary, format: &SummaryFormat) -> Vec<String> {
    let color = format.color_enabled;
    let entity = &format.entity_name;
    let op = &format.operation_name;
    let mut lines = Vec::new();

    if summary.failed() == 0 {
        let n = summary.succeeded();
        let message = format!("Successfully {} {} {}", op, n, pluralize(entity, n));
        if color {
            lines.push(format!("{} {}", style("✓").green(), message));
        } else {
            lines.push(message);
        }
        return lines;
    }

    if summary.succeeded() == 0 {
        let message = format!(
            "no {} were {} ({} failed)",
            pluralize(entity, 0),
            op,
            summary.total()
        );
        if color {
            let headline = match &format.operation_verb {
                Some(verb) => format!("Failed to {verb}: {message}"),
                None => format!("Failed: {message}"),
            };
            lines.push(format!("{} {}", style("✗").red(), style(headline).red()));
        } else {
            lines.push(format!("Failed: {message}"));
        }
        return lines;
    }

    lines.push(format!(
        "Completed with errors: {} of {} {} {}",
        summary.succeeded(),
        summary.total(),
        pluralize(entity, summary.total()),
        op
    ));
    if color {
        lines.push(format!(
            "  {} Succeeded: {}",
            style("✓").green(),
            summary.succeeded()
        ));
        lines.push(format!("  {} Failed: {}", style("✗").red(), summary.failed()));
    } else {
        lines.push(format!("  OK: {}", summary.succeeded()));
        lines.push(format!("  Failed: {}", summary.failed()));
    }

    if format.show_details {
        lines.push(String::new());
        lines.push("Failures:".to_string());
        for result in summary.failures() {
            let label = match result.name() {
                Some(name) => format!("{} ({})", result.id(), name),
                None => result.id().to_string(),
            };
            let error = result.error().unwrap_or_default();
            if color {
                lines.push(format!("  - {}: {}", style(label).bold(), style(error).red()));
            } else {
                lines.push(format!("  - {label}: {error}"));
            }
        }
    }

    lines
}

/// Write the rendered summary, one line each.
pub fn write_summary<W: Write>(
    writer: &mut W,
    summary: &ExecutionSummary,
    format: &SummaryFormat,
) -> io::Result<()> {
    for line in render_summary(summary, format) {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
