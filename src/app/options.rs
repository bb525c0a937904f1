// Construction options for the application coordinator.

use std::sync::Arc;
use std::time::Duration;

use crate::signal::{Notify, OsNotifier, SignalKind};

use super::Server;

/// A single construction option. Options are applied in order, so a later
/// option overrides an earlier one of the same kind, except `Servers`,
/// which appends.
pub enum Opt {
    Name(String),
    Version(String),
    CloseSignals(Vec<SignalKind>),
    Servers(Vec<Arc<dyn Server>>),
    Notifier(Arc<dyn Notify>),
    ShutdownTimeout(Option<Duration>),
}

/// Sets the informational application name.
pub fn name(name: impl Into<String>) -> Opt {
    Opt::Name(name.into())
}

/// Sets the informational application version.
pub fn version(version: impl Into<String>) -> Opt {
    Opt::Version(version.into())
}

/// Replaces the set of signals that trigger shutdown.
pub fn close_signals(kinds: impl IntoIterator<Item = SignalKind>) -> Opt {
    Opt::CloseSignals(kinds.into_iter().collect())
}

/// Registers servers. Registering the same server twice runs it twice.
pub fn servers(servers: impl IntoIterator<Item = Arc<dyn Server>>) -> Opt {
    Opt::Servers(servers.into_iter().collect())
}

/// Replaces the signal source (OS signals by default).
pub fn notifier(notifier: Arc<dyn Notify>) -> Opt {
    Opt::Notifier(notifier)
}

/// Bounds how long `App::wait` waits for servers after cancellation.
/// `None` waits indefinitely.
pub fn shutdown_timeout(timeout: Option<Duration>) -> Opt {
    Opt::ShutdownTimeout(timeout)
}

/// Resolved coordinator settings.
pub struct Options {
    pub name: String,
    pub version: String,
    pub close_signals: Vec<SignalKind>,
    pub servers: Vec<Arc<dyn Server>>,
    pub notifier: Arc<dyn Notify>,
    pub shutdown_timeout: Option<Duration>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: String::new(),
            close_signals: SignalKind::DEFAULTS.to_vec(),
            servers: Vec::new(),
            notifier: Arc::new(OsNotifier::new()),
            shutdown_timeout: None,
        }
    }
}

impl Options {
    /// Applies a single option on top of the current settings.
    pub fn apply(&mut self, opt: Opt) {
        match opt {
            Opt::Name(name) => self.name = name,
            Opt::Version(version) => self.version = version,
            Opt::CloseSignals(kinds) => self.close_signals = kinds,
            Opt::Servers(servers) => self.servers.extend(servers),
            Opt::Notifier(notifier) => self.notifier = notifier,
            Opt::ShutdownTimeout(timeout) => self.shutdown_timeout = timeout,
        }
    }
}

impl FromIterator<Opt> for Options {
    fn from_iter<I: IntoIterator<Item = Opt>>(iter: I) -> Self {
        let mut opts = Options::default();
        for opt in iter {
            opts.apply(opt);
        }
        opts
    }
}
