use std::sync::atomic::{AtomicBool, Ordering};

use console::Term;

/// Global shutdown flag for graceful termination.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Set once operations start running. Before that nothing needs draining.
static DISPATCH_STARTED: AtomicBool = AtomicBool::new(false);

/// Exit status for an interrupted run.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Check if shutdown has been requested.
///
/// Passed to the bulk executor as its cancellation hook, so a first Ctrl+C
/// lets the current batch finish and skips the rest.
#[inline]
pub(crate) fn is_shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::Acquire)
}

/// Request shutdown.
#[inline]
fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::Release);
}

/// Mark that operations are about to run.
///
/// Until this is called a Ctrl+C (e.g. at a confirmation prompt) exits at
/// once instead of waiting for a batch that never starts.
pub(crate) fn mark_dispatch_started() {
    DISPATCH_STARTED.store(true, Ordering::Release);
}

fn dispatch_started() -> bool {
    DISPATCH_STARTED.load(Ordering::Acquire)
}

/// What the first Ctrl+C does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// Nothing has run yet: quit immediately.
    Abort,
    /// Let the current batch finish, skip the rest.
    Drain,
}

fn first_interrupt(dispatch_started: bool) -> Interrupt {
    if dispatch_started {
        Interrupt::Drain
    } else {
        Interrupt::Abort
    }
}

/// Set up the Ctrl+C handler for graceful shutdown.
pub(crate) fn setup_shutdown_handler() {
    tokio::spawn(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            return;
        }

        let is_tty = Term::stderr().is_term();

        if first_interrupt(dispatch_started()) == Interrupt::Abort {
            if is_tty {
                eprintln!("\nCancelled.");
            } else {
                tracing::warn!("Interrupted before any operation started");
            }
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }

        if is_tty {
            eprintln!("\n\nShutdown requested, finishing the current batch...");
            eprintln!("Press Ctrl+C again to force quit.");
        } else {
            tracing::warn!("Shutdown requested, finishing the current batch");
        }

        request_shutdown();

        // Second Ctrl+C forces quit
        if tokio::signal::ctrl_c().await.is_ok() {
            if is_tty {
                eprintln!("Force quit!");
            }
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}
