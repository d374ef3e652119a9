//! End-to-end tests of the bulk engine: collection, execution, progress and
//! summary rendering together.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tracker::bulk::{
    ExecutionOptions, ExecutionSummary, IdentifierSources, OperationResult, ProgressReporter,
    SummaryFormat, collect_identifiers, execute, render_summary, write_summary,
};

#[derive(Debug)]
struct NotFound;

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("not found")
    }
}

fn options(concurrency: usize) -> ExecutionOptions {
    ExecutionOptions {
        concurrency,
        ..ExecutionOptions::default()
    }
}

fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

async fn run_quiet<F, Fut>(items: Vec<String>, operation: F, concurrency: usize) -> ExecutionSummary
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<OperationResult, NotFound>> + Send + 'static,
{
    let mut sink = Vec::new();
    let mut progress = ProgressReporter::new(&mut sink, false, &options(concurrency));
    execute(items, operation, &options(concurrency), &mut progress).await
}

fn temp_path(name: &str) -> std::path::PathBuf {
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("tracker-it-{name}-{nonce}"))
}

#[tokio::test]
async fn test_one_failure_among_successes() {
    let summary = run_quiet(
        ids(&["A", "B", "C"]),
        |id| async move {
            if id == "B" {
                Err(NotFound)
            } else {
                Ok(OperationResult::succeeded(id, None))
            }
        },
        2,
    )
    .await;

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);

    let json = serde_json::to_value(&summary).expect("summary serializes");
    assert_eq!(
        json,
        serde_json::json!({
            "total": 3,
            "succeeded": 2,
            "failed": 1,
            "results": [
                {"id": "A", "success": true},
                {"id": "B", "success": false, "error": "not found"},
                {"id": "C", "success": true}
            ]
        })
    );
}

#[tokio::test]
async fn test_in_flight_never_exceeds_concurrency() {
    for concurrency in [1, 2, 3, 7] {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (current, max_seen) = (Arc::clone(&in_flight), Arc::clone(&peak));

        let items: Vec<String> = (0..17).map(|i| format!("ITEM-{i}")).collect();
        let summary = run_quiet(
            items,
            move |id| {
                let current = Arc::clone(&current);
                let max_seen = Arc::clone(&max_seen);
                async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    Ok(OperationResult::succeeded(id, None))
                }
            },
            concurrency,
        )
        .await;

        assert_eq!(summary.succeeded(), 17);
        assert!(
            peak.load(Ordering::SeqCst) <= concurrency,
            "peak {} exceeded concurrency {concurrency}",
            peak.load(Ordering::SeqCst)
        );
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_counts_always_add_up() {
    for count in [1usize, 2, 5, 9, 20] {
        for concurrency in [0usize, 1, 3, 5, 50] {
            let items: Vec<String> = (0..count).map(|i| i.to_string()).collect();
            let summary = run_quiet(
                items.clone(),
                |id| async move {
                    let n: usize = id.parse().unwrap_or(0);
                    if n % 3 == 0 {
                        Err(NotFound)
                    } else {
                        Ok(OperationResult::succeeded(id, None))
                    }
                },
                concurrency,
            )
            .await;

            assert_eq!(summary.total(), count);
            assert_eq!(summary.succeeded() + summary.failed(), summary.total());
            assert_eq!(summary.failed(), count.div_ceil(3));

            let result_ids: Vec<&str> = summary.results().iter().map(|r| r.id()).collect();
            let expected: Vec<&str> = items.iter().map(String::as_str).collect();
            assert_eq!(result_ids, expected, "results keep input order");

            for result in summary.results() {
                assert_ne!(result.is_success(), result.error().is_some());
            }
        }
    }
}

#[tokio::test]
async fn test_slow_failure_does_not_affect_neighbours() {
    let summary = run_quiet(
        ids(&["fast-1", "slow-fail", "fast-2", "fast-3"]),
        |id| async move {
            if id == "slow-fail" {
                tokio::time::sleep(Duration::from_millis(10)).await;
                return Err(NotFound);
            }
            Ok(OperationResult::succeeded(id, None))
        },
        4,
    )
    .await;

    assert_eq!(summary.succeeded(), 3);
    let failures: Vec<&str> = summary.failures().map(|r| r.id()).collect();
    assert_eq!(failures, vec!["slow-fail"]);
}

#[tokio::test]
async fn test_repeat_runs_are_independent() {
    let run = || {
        run_quiet(
            ids(&["A", "B", "C"]),
            |id| async move {
                if id == "B" {
                    Err(NotFound)
                } else {
                    Ok(OperationResult::succeeded(id, None))
                }
            },
            2,
        )
    };

    let first = serde_json::to_value(run().await).expect("serializes");
    let second = serde_json::to_value(run().await).expect("serializes");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_zero_items_writes_nothing() {
    let mut sink = Vec::new();
    let opts = options(3);
    {
        let mut progress = ProgressReporter::new(&mut sink, true, &opts);
        let summary = execute(
            Vec::new(),
            |id| async move { Ok::<_, NotFound>(OperationResult::succeeded(id, None)) },
            &opts,
            &mut progress,
        )
        .await;

        assert_eq!(summary.total(), 0);
        assert_eq!(summary.succeeded(), 0);
        assert_eq!(summary.failed(), 0);
        assert!(summary.results().is_empty());
    }
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_non_terminal_output_has_no_control_characters() {
    let opts = options(2);
    let mut sink = Vec::new();
    let summary = {
        let mut progress = ProgressReporter::new(&mut sink, false, &opts);
        assert!(!progress.is_interactive());
        execute(
            ids(&["A", "B", "C"]),
            |id| async move {
                if id == "B" {
                    Err(NotFound)
                } else {
                    Ok(OperationResult::succeeded(id, None))
                }
            },
            &opts,
            &mut progress,
        )
        .await
    };
    assert!(sink.is_empty(), "progress wrote to a non-terminal");

    let format = SummaryFormat::new("issue", "deleted").color_enabled(false);
    write_summary(&mut sink, &summary, &format).expect("write to Vec");
    let text = String::from_utf8(sink).expect("utf-8");
    assert!(!text.contains('\r'));
    assert!(!text.contains('\u{1b}'));
    assert!(text.starts_with("Completed with errors: 2 of 3 issues deleted"));
    assert!(text.contains("  - B: not found"));
}

#[tokio::test]
async fn test_terminal_progress_is_cleared_at_the_end() {
    let opts = ExecutionOptions {
        color_enabled: false,
        ..options(2)
    };
    let mut sink = Vec::new();
    {
        let mut progress = ProgressReporter::new(&mut sink, true, &opts);
        execute(
            ids(&["A", "B"]),
            |id| async move { Ok::<_, NotFound>(OperationResult::succeeded(id, None)) },
            &opts,
            &mut progress,
        )
        .await;
    }

    let text = String::from_utf8(sink).expect("utf-8");
    assert!(text.starts_with("\r0/2 (0%) - OK: 0 / Failed: 0"));
    assert!(text.contains("\r2/2 (100%) - OK: 2 / Failed: 0"));
    assert!(text.ends_with('\r'));
}

#[tokio::test]
async fn test_collect_then_execute_from_file() {
    let path = temp_path("ids");
    tokio::fs::write(&path, "X-1\nX-2, X-3\n\nX-1")
        .await
        .expect("write temp file");

    let sources = IdentifierSources {
        file: Some(path.clone()),
        ..IdentifierSources::default()
    };
    let collected = collect_identifiers(&sources, tokio::io::empty(), None)
        .await
        .expect("collect");
    let _ = tokio::fs::remove_file(&path).await;

    let mut sorted = collected.clone();
    sorted.sort();
    assert_eq!(sorted, vec!["X-1", "X-2", "X-3"]);

    let summary = run_quiet(
        collected,
        |id| async move { Ok(OperationResult::succeeded(id.clone(), Some(format!("Issue {id}")))) },
        2,
    )
    .await;
    let lines = render_summary(
        &summary,
        &SummaryFormat::new("issue", "archived").color_enabled(false),
    );
    assert_eq!(lines, vec!["Successfully archived 3 issues".to_string()]);
}

#[tokio::test]
async fn test_missing_bulk_file_names_the_path() {
    let path = temp_path("missing");
    let sources = IdentifierSources {
        file: Some(path.clone()),
        ..IdentifierSources::default()
    };

    let err = collect_identifiers(&sources, tokio::io::empty(), None)
        .await
        .expect_err("missing file should fail");
    assert!(err.to_string().contains(&path.display().to_string()));
}
