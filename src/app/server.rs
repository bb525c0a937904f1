// Server contract consumed by the application coordinator.

use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// Long-running unit managed by an `App`.
///
/// `start` runs until the token is cancelled or the unit is done on its own.
/// `stop` is called once the token fires and performs graceful shutdown.
/// Both receive the same token the coordinator shares with every server.
/// Errors are logged by the coordinator and otherwise ignored.
#[async_trait::async_trait]
pub trait Server: Send + Sync {
    async fn start(&self, ctx: CancellationToken) -> Result<()>;

    async fn stop(&self, ctx: CancellationToken) -> Result<()>;
}
