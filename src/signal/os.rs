// OS-backed signal notification.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use super::{Notify, SignalError, SignalKind, SIGNAL_BUFFER};

/// Delivers real process signals. Must be used inside a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsNotifier;

impl OsNotifier {
    pub fn new() -> Self {
        Self
    }
}

/// Pushes a received signal into the subscriber channel.
/// Returns false once the subscriber is gone.
fn forward(tx: &mpsc::Sender<SignalKind>, kind: SignalKind) -> bool {
    match tx.try_send(kind) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            debug!(
                component = "signal",
                event = "delivery_dropped",
                signal = kind.posix_name(),
                "subscriber buffer is full"
            );
            true
        }
        Err(TrySendError::Closed(_)) => false,
    }
}

#[cfg(unix)]
impl Notify for OsNotifier {
    fn notify(&self, kinds: &[SignalKind]) -> Result<mpsc::Receiver<SignalKind>, SignalError> {
        use tokio::signal::unix::{signal, SignalKind as UnixKind};

        let unix_kind = |kind: SignalKind| match kind {
            SignalKind::Interrupt => UnixKind::interrupt(),
            SignalKind::Terminate => UnixKind::terminate(),
            SignalKind::Quit => UnixKind::quit(),
            SignalKind::Hangup => UnixKind::hangup(),
            SignalKind::User1 => UnixKind::user_defined1(),
            SignalKind::User2 => UnixKind::user_defined2(),
        };

        // Register everything first so a failure leaves no forwarders behind.
        let mut streams = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let stream = signal(unix_kind(kind))
                .map_err(|source| SignalError::Register { kind, source })?;
            streams.push((kind, stream));
        }

        let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);
        for (kind, mut stream) in streams {
            let tx = tx.clone();
            tokio::task::spawn(async move {
                loop {
                    tokio::select! {
                        _ = tx.closed() => break,
                        received = stream.recv() => {
                            if received.is_none() || !forward(&tx, kind) {
                                break;
                            }
                        }
                    }
                }
            });
        }

        Ok(rx)
    }
}

/// Keeps the kinds `supported` accepts and logs the rest.
/// Fails only when a non-empty set has nothing deliverable left.
#[cfg_attr(unix, allow(dead_code))]
pub(crate) fn deliverable<F>(kinds: &[SignalKind], supported: F) -> Result<Vec<SignalKind>, SignalError>
where
    F: Fn(SignalKind) -> bool,
{
    let (kept, skipped): (Vec<SignalKind>, Vec<SignalKind>) =
        kinds.iter().copied().partition(|kind| supported(*kind));

    for kind in &skipped {
        debug!(
            component = "signal",
            event = "unsupported_skipped",
            signal = kind.posix_name(),
            "signal cannot be delivered on this platform"
        );
    }

    match (kept.is_empty(), skipped.first()) {
        (true, Some(&kind)) => Err(SignalError::Unsupported(kind)),
        _ => Ok(kept),
    }
}

#[cfg(not(unix))]
impl Notify for OsNotifier {
    fn notify(&self, kinds: &[SignalKind]) -> Result<mpsc::Receiver<SignalKind>, SignalError> {
        let kinds = deliverable(kinds, |kind| kind == SignalKind::Interrupt)?;

        let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);
        if !kinds.is_empty() {
            tokio::task::spawn(async move {
                loop {
                    tokio::select! {
                        _ = tx.closed() => break,
                        received = tokio::signal::ctrl_c() => {
                            if received.is_err() || !forward(&tx, SignalKind::Interrupt) {
                                break;
                            }
                        }
                    }
                }
            });
        }

        Ok(rx)
    }
}
