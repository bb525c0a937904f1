// Application lifecycle: starts servers, propagates shutdown, waits for exit.

#[allow(clippy::module_inception)]
mod app;
mod options;
mod server;


pub use app::{App, AppError};
pub use options::{close_signals, name, notifier, servers, shutdown_timeout, version, Opt, Options};
pub use server::Server;
