// Mock server recording lifecycle calls.

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::app::Server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBehavior {
    Ok,
    Fail,
    Hang,
}

pub struct MockServer {
    starts: AtomicUsize,
    stops: AtomicUsize,
    tokens: Mutex<Vec<CancellationToken>>,
    fail_start: bool,
    on_stop: StopBehavior,
}

impl MockServer {
    pub fn new() -> Arc<Self> {
        Self::with(false, StopBehavior::Ok)
    }

    pub fn with(fail_start: bool, on_stop: StopBehavior) -> Arc<Self> {
        Arc::new(Self {
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            tokens: Mutex::new(Vec::new()),
            fail_start,
            on_stop,
        })
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Tokens received by `start`, in call order.
    pub fn tokens(&self) -> Vec<CancellationToken> {
        self.tokens.lock().clone()
    }

    pub fn as_server(self: &Arc<Self>) -> Arc<dyn Server> {
        self.clone()
    }
}

#[async_trait::async_trait]
impl Server for MockServer {
    async fn start(&self, ctx: CancellationToken) -> Result<()> {
        self.tokens.lock().push(ctx.clone());
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            anyhow::bail!("mock server refused to start");
        }
        ctx.cancelled().await;
        Ok(())
    }

    async fn stop(&self, _ctx: CancellationToken) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        match self.on_stop {
            StopBehavior::Ok => Ok(()),
            StopBehavior::Fail => anyhow::bail!("mock server failed to stop"),
            StopBehavior::Hang => futures::future::pending().await,
        }
    }
}
