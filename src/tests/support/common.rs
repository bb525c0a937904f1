// Common test utilities for lifecycle scenarios.

use std::sync::Arc;
use std::time::Duration;

use crate::app::{self, App, Opt, Server};
use crate::signal::ManualNotifier;

/// Upper bound for anything a scenario waits on.
pub const WAIT_LIMIT: Duration = Duration::from_secs(2);

/// Polls `cond` until it holds or `WAIT_LIMIT` passes.
pub async fn wait_until<F>(what: &str, mut cond: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while !cond() {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

/// Builds an app wired to a manual notifier. Extra options are applied last.
pub fn new_app(
    servers: Vec<Arc<dyn Server>>,
    extra: Vec<Opt>,
) -> (App, ManualNotifier) {
    let notifier = ManualNotifier::new();
    let mut opts = vec![
        app::name("scenario"),
        app::version("test"),
        app::notifier(Arc::new(notifier.clone())),
        app::servers(servers),
    ];
    opts.extend(extra);
    (App::init(opts), notifier)
}

/// Waits for `App::wait` to return, failing the test if it hangs.
pub async fn wait_app(app: &App) -> Result<(), crate::app::AppError> {
    tokio::time::timeout(WAIT_LIMIT, app.wait())
        .await
        .expect("app did not shut down in time")
}
