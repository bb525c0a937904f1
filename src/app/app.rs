// Application coordinator implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::shutdown::{GracefulShutdown, TimeoutError};
use crate::signal::{SignalError, SignalKind};

use super::{Opt, Options};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("application {0:?} is already started")]
    AlreadyStarted(String),
    #[error("failed to subscribe to terminating signals: {0}")]
    Signal(#[from] SignalError),
    #[error(transparent)]
    ShutdownTimeout(#[from] TimeoutError),
}

struct Inner {
    opts: Options,
    shutdown: GracefulShutdown,
    started: AtomicBool,
    stopped: AtomicBool,
}

/// Starts registered servers and shuts them all down on a single
/// cancellation signal. Clones share the same state.
#[derive(Clone)]
pub struct App {
    inner: Arc<Inner>,
}

impl App {
    /// Builds an application from the default options overridden by `opts`.
    pub fn init<I>(opts: I) -> Self
    where
        I: IntoIterator<Item = Opt>,
    {
        let opts: Options = opts.into_iter().collect();
        let shutdown =
            GracefulShutdown::new(CancellationToken::new()).with_timeout(opts.shutdown_timeout);

        Self {
            inner: Arc::new(Inner {
                opts,
                shutdown,
                started: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
            }),
        }
    }

    /// Launches every server together with a watcher that calls its `stop`
    /// once the token fires, then subscribes to the terminating signals.
    /// Returns right after setup; must run inside a tokio runtime.
    pub fn start(&self) -> Result<(), AppError> {
        let opts = &self.inner.opts;
        if self.inner.started.swap(true, Ordering::AcqRel) {
            return Err(AppError::AlreadyStarted(opts.name.clone()));
        }

        let token = self.token();
        for (idx, server) in opts.servers.iter().enumerate() {
            let watcher = server.clone();
            let ctx = token.clone();
            self.inner.shutdown.spawn(async move {
                ctx.cancelled().await;
                if let Err(e) = watcher.stop(ctx.clone()).await {
                    error!(
                        component = "app",
                        scope = "server",
                        server = idx,
                        event = "stop_failed",
                        error = %e,
                        "server failed to stop"
                    );
                }
            });

            let server = server.clone();
            let ctx = token.clone();
            self.inner.shutdown.spawn(async move {
                if let Err(e) = server.start(ctx).await {
                    error!(
                        component = "app",
                        scope = "server",
                        server = idx,
                        event = "start_failed",
                        error = %e,
                        "server failed to start"
                    );
                }
            });
        }

        let mut signals = match opts.notifier.notify(&opts.close_signals) {
            Ok(rx) => rx,
            Err(e) => {
                // Servers are already running; take them down before bailing out.
                self.stop();
                return Err(e.into());
            }
        };

        let app = self.clone();
        tokio::task::spawn(async move {
            tokio::select! {
                received = signals.recv() => match received {
                    Some(kind) => {
                        info!(
                            component = "app",
                            event = "os_signal",
                            signal = kind.posix_name(),
                            "cancellation started"
                        );
                        app.stop();
                    }
                    // No signal source left; stop() is the only way out.
                    None => token.cancelled().await,
                },
                _ = token.cancelled() => {}
            }
        });

        info!(
            component = "app",
            event = "started",
            app_name = %opts.name,
            version = %opts.version,
            servers = opts.servers.len(),
            signals = ?opts.close_signals,
            "application lifecycle"
        );

        Ok(())
    }

    /// Fires the shared cancellation signal. Later calls are no-ops.
    pub fn stop(&self) {
        if self.inner.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.shutdown.token().cancel();

        info!(
            component = "app",
            event = "stopped",
            app_name = %self.inner.opts.name,
            "application lifecycle"
        );
    }

    /// Blocks until the app is stopped and every server task has returned,
    /// bounded by the configured shutdown timeout.
    pub async fn wait(&self) -> Result<(), AppError> {
        if let Err(e) = self.inner.shutdown.await_shutdown().await {
            warn!(
                component = "app",
                event = "shutdown_timeout",
                pending = self.inner.shutdown.pending(),
                "servers did not finish in time"
            );
            return Err(e.into());
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.inner.opts.name
    }

    pub fn version(&self) -> &str {
        &self.inner.opts.version
    }

    pub fn close_signals(&self) -> &[SignalKind] {
        &self.inner.opts.close_signals
    }

    /// Number of registered servers, duplicates included.
    pub fn servers(&self) -> usize {
        self.inner.opts.servers.len()
    }

    /// The cancellation token shared with every server.
    pub fn token(&self) -> CancellationToken {
        self.inner.shutdown.token().clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.shutdown.token().is_cancelled()
    }
}
