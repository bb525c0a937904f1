// Package signal abstracts delivery of terminating OS signals.
//
// The coordinator never talks to the OS directly: it asks a `Notify`
// implementation for a channel of signal kinds, so tests can swap in
// `ManualNotifier` and raise signals without touching the process.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::mpsc;

pub mod manual;
pub mod os;


pub use manual::ManualNotifier;
pub use os::OsNotifier;

/// Capacity of a subscription channel. Deliveries into a full channel are dropped.
pub const SIGNAL_BUFFER: usize = 1;

/// Terminating signal kinds understood by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum SignalKind {
    Interrupt, // SIGINT
    Terminate, // SIGTERM
    Quit,      // SIGQUIT
    Hangup,    // SIGHUP
    User1,     // SIGUSR1
    User2,     // SIGUSR2
}

impl SignalKind {
    /// Signals a coordinator listens to unless configured otherwise.
    pub const DEFAULTS: [SignalKind; 3] = [
        SignalKind::Terminate,
        SignalKind::Interrupt,
        SignalKind::Quit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Interrupt => "interrupt",
            SignalKind::Terminate => "terminate",
            SignalKind::Quit => "quit",
            SignalKind::Hangup => "hangup",
            SignalKind::User1 => "user1",
            SignalKind::User2 => "user2",
        }
    }

    /// Conventional POSIX name, used in logs.
    pub fn posix_name(&self) -> &'static str {
        match self {
            SignalKind::Interrupt => "SIGINT",
            SignalKind::Terminate => "SIGTERM",
            SignalKind::Quit => "SIGQUIT",
            SignalKind::Hangup => "SIGHUP",
            SignalKind::User1 => "SIGUSR1",
            SignalKind::User2 => "SIGUSR2",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SignalKind {
    type Error = SignalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SignalKind> for String {
    fn from(kind: SignalKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for SignalKind {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower.strip_prefix("sig").unwrap_or(&lower);
        match name {
            "interrupt" | "int" => Ok(SignalKind::Interrupt),
            "terminate" | "term" => Ok(SignalKind::Terminate),
            "quit" => Ok(SignalKind::Quit),
            "hangup" | "hup" => Ok(SignalKind::Hangup),
            "user1" | "usr1" => Ok(SignalKind::User1),
            "user2" | "usr2" => Ok(SignalKind::User2),
            _ => Err(SignalError::Unknown(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("unknown signal name {0:?}")]
    Unknown(String),
    #[error("signal {0} is not supported on this platform")]
    Unsupported(SignalKind),
    #[error("failed to register handler for {kind}: {source}")]
    Register {
        kind: SignalKind,
        #[source]
        source: std::io::Error,
    },
}

/// Source of terminating-signal notifications.
///
/// `notify` subscribes to the given kinds and hands back the receiving end.
/// Dropping the receiver ends the subscription.
pub trait Notify: Send + Sync {
    fn notify(&self, kinds: &[SignalKind]) -> Result<mpsc::Receiver<SignalKind>, SignalError>;
}
