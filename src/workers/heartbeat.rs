// Heartbeat worker: ticks until the application is cancelled.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::Server;

/// Periodically logs a beat. Shows the minimal shape of a `Server`.
pub struct Heartbeat {
    interval: Duration,
    beats: AtomicU64,
    stopped: AtomicBool,
}

impl Heartbeat {
    /// Intervals below 1ms are raised to 1ms.
    pub fn new(interval: Duration) -> Self {
        const MIN_INTERVAL: Duration = Duration::from_millis(1);
        let interval = if interval < MIN_INTERVAL {
            warn!(
                component = "heartbeat",
                event = "interval_too_short",
                interval = %humantime::format_duration(interval),
                "min heartbeat interval is 1ms (interval set up as 1ms)"
            );
            MIN_INTERVAL
        } else {
            interval
        };

        Self {
            interval,
            beats: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

#[async_trait::async_trait]
impl Server for Heartbeat {
    async fn start(&self, ctx: CancellationToken) -> Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(
            component = "heartbeat",
            event = "started",
            interval = %humantime::format_duration(self.interval),
            "worker lifecycle"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let beats = self.beats.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!(component = "heartbeat", event = "beat", beats, "heartbeat");
                }
                _ = ctx.cancelled() => break,
            }
        }

        Ok(())
    }

    async fn stop(&self, _ctx: CancellationToken) -> Result<()> {
        self.stopped.store(true, Ordering::Release);
        info!(
            component = "heartbeat",
            event = "stopped",
            beats = self.beats(),
            "worker lifecycle"
        );
        Ok(())
    }
}
