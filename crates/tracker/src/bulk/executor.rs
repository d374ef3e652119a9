use std::fmt::Display;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use tokio::task::JoinError;

use super::progress::ProgressReporter;
use super::types::{
    CANCELLED_MESSAGE, ExecutionOptions, ExecutionSummary, OperationResult, ProgressTally,
    UNKNOWN_ERROR_MESSAGE,
};

/// Convert an operation failure into the message recorded on its result.
///
/// Multi-line `Display` output is folded onto one line, joining the non-empty
/// lines with `": "` so the cause stays next to the headline in the summary.
pub fn failure_message(err: &impl Display) -> String {
    let full = err.to_string();
    let lines: Vec<&str> = full
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        lines.join(": ")
    }
}

fn join_failure_message(err: JoinError) -> String {
    if err.is_panic() {
        let payload = err.into_panic();
        if let Some(s) = payload.downcast_ref::<&str>() {
            format!("operation panicked: {s}")
        } else if let Some(s) = payload.downcast_ref::<String>() {
            format!("operation panicked: {s}")
        } else {
            "operation panicked".to_string()
        }
    } else if err.is_cancelled() {
        "operation was cancelled".to_string()
    } else {
        format!("operation failed: {err}")
    }
}

fn settle<E: Display>(
    id: String,
    joined: Result<Result<OperationResult, E>, JoinError>,
) -> OperationResult {
    match joined {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => OperationResult::failed(id, None, failure_message(&e)),
        Err(e) => OperationResult::failed(id, None, join_failure_message(e)),
    }
}

/// Apply `operation` to every item with bounded concurrency.
///
/// Items are split into consecutive batches of the configured concurrency.
/// Each batch is spawned at once and fully joined before the next one starts,
/// so at most `concurrency` operations are ever in flight. A failing or
/// panicking operation only affects its own result.
///
/// Results keep dispatch order (batch order, then position within the batch),
/// regardless of the order in which operations finish.
pub async fn execute<W, F, Fut, E>(
    items: Vec<String>,
    operation: F,
    options: &ExecutionOptions,
    progress: &mut ProgressReporter<W>,
) -> ExecutionSummary
where
    W: Write,
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<OperationResult, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let total = items.len();
    if total == 0 {
        return ExecutionSummary::from_results(Vec::new());
    }

    let concurrency = options.effective_concurrency();
    let operation = Arc::new(operation);
    let mut results = Vec::with_capacity(total);
    let mut tally = ProgressTally::new(total);

    progress.start(total, concurrency);

    for (batch_index, batch) in items.chunks(concurrency).enumerate() {
        if options.is_cancelled() {
            let skipped = total - results.len();
            tracing::warn!(skipped, "Cancellation requested, skipping remaining items");
            for id in &items[results.len()..] {
                let result = OperationResult::failed(id.clone(), None, CANCELLED_MESSAGE);
                tally.record(&result);
                results.push(result);
            }
            break;
        }

        tracing::debug!(batch = batch_index, size = batch.len(), "Dispatching batch");

        let handles: Vec<_> = batch
            .iter()
            .map(|id| {
                let operation = Arc::clone(&operation);
                let item = id.clone();
                (id.clone(), tokio::spawn(async move { operation(item).await }))
            })
            .collect();

        for (id, handle) in handles {
            let result = settle(id, handle.await);
            tally.record(&result);
            progress.item_settled(&result, &tally);
            results.push(result);
        }
    }

    progress.finish(&tally);

    ExecutionSummary::from_results(results)
}
