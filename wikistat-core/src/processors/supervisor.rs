//! Restart loop for long-running tasks.

use crate::utils::RestartPolicy;
use std::fmt::Display;
use std::future::Future;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Why a supervised task stopped for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// The task returned `Ok(())`.
    Completed,
    /// Shutdown was signaled, or every shutdown sender was dropped.
    Shutdown,
    /// The task kept failing until the restart budget was spent.
    GaveUp { restarts: u32 },
}

/// Resolves once shutdown is requested.
///
/// A dropped sender counts as a request: nobody is left to cancel it.
pub async fn shutdown_requested(shutdown_rx: &mut watch::Receiver<bool>) {
    let _ = shutdown_rx.wait_for(|stop| *stop).await;
}

/// Run `task` until it completes, restarting it after each failure with
/// the delays `policy` prescribes.
///
/// Shutdown is checked with priority both while the task runs and while
/// waiting out a backoff; a running attempt is dropped when it fires.
pub async fn supervise<F, Fut, E>(
    name: &str,
    policy: RestartPolicy,
    mut shutdown_rx: watch::Receiver<bool>,
    mut task: F,
) -> SupervisorExit
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let mut restarts: u32 = 0;
    loop {
        let result = tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown_rx) => {
                info!(task = name, "Shutdown requested, stopping task");
                return SupervisorExit::Shutdown;
            }
            result = task() => result,
        };

        let err = match result {
            Ok(()) => return SupervisorExit::Completed,
            Err(e) => e,
        };

        let Some(delay) = policy.next_delay(restarts) else {
            error!(task = name, restarts, error = %err, "Task failed, restart budget spent");
            return SupervisorExit::GaveUp { restarts };
        };
        warn!(
            task = name,
            restarts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Task failed, restarting after backoff"
        );
        restarts += 1;

        tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown_rx) => {
                info!(task = name, "Shutdown requested during backoff");
                return SupervisorExit::Shutdown;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
