// Package shutdown provides graceful shutdown functionality.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};


#[derive(Debug, thiserror::Error)]
#[error("graceful shutdown timeout exceeded ({0:?})")]
pub struct TimeoutError(pub Duration);

/// Graceful shutdown handler.
/// Tracks every task spawned through it and, once the token fires,
/// waits for them to finish within an optional grace period.
#[derive(Clone)]
pub struct GracefulShutdown {
    shutdown_token: CancellationToken,
    tracker: TaskTracker,
    timeout: Option<Duration>,
}

impl GracefulShutdown {
    /// Creates a new graceful shutdown handler without a grace period.
    pub fn new(shutdown_token: CancellationToken) -> Self {
        Self {
            shutdown_token,
            tracker: TaskTracker::new(),
            timeout: None,
        }
    }

    /// Bounds how long `await_completion` waits for tracked tasks.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// Spawns a task that `await_completion` will wait for.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task);
    }

    /// Number of tracked tasks still running.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Waits for the token to fire and then for all tracked tasks to complete.
    pub async fn await_shutdown(&self) -> Result<(), TimeoutError> {
        self.shutdown_token.cancelled().await;
        info!(
            component = "graceful-shutdown",
            event = "ctx_done",
            pending = self.pending(),
            "cancellation started"
        );
        self.await_completion().await
    }

    /// Stops accepting new tasks and waits for tracked ones, with timeout.
    pub async fn await_completion(&self) -> Result<(), TimeoutError> {
        self.tracker.close();

        let Some(limit) = self.timeout else {
            self.tracker.wait().await;
            Self::log_success();
            return Ok(());
        };

        match timeout(limit, self.tracker.wait()).await {
            Ok(()) => {
                Self::log_success();
                Ok(())
            }
            Err(_) => {
                warn!(
                    component = "graceful-shutdown",
                    event = "shutdown_timeout",
                    timeout = %humantime::format_duration(limit),
                    pending = self.pending(),
                    "not all tasks were closed within timeout"
                );
                Err(TimeoutError(limit))
            }
        }
    }

    fn log_success() {
        info!(
            component = "graceful-shutdown",
            event = "shutdown_success",
            "service was gracefully shut down"
        );
    }
}
