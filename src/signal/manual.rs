// In-process signal source for tests and embedding.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use super::{Notify, SignalError, SignalKind, SIGNAL_BUFFER};

struct Subscriber {
    kinds: Vec<SignalKind>,
    tx: mpsc::Sender<SignalKind>,
}

/// Notifier whose signals are raised by hand.
///
/// Clones share subscribers, so a test can keep one handle and give the
/// other to the coordinator.
#[derive(Clone, Default)]
pub struct ManualNotifier {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl ManualNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `kind` to every live subscriber that asked for it.
    /// Returns how many subscribers accepted the delivery.
    pub fn raise(&self, kind: SignalKind) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|s| !s.tx.is_closed());

        let delivered = subscribers
            .iter()
            .filter(|s| s.kinds.contains(&kind))
            .filter(|s| s.tx.try_send(kind).is_ok())
            .count();

        debug!(
            component = "signal",
            event = "raised",
            signal = kind.posix_name(),
            delivered,
            "manual signal raised"
        );
        delivered
    }

    /// Number of subscriptions whose receiver is still alive.
    pub fn subscribers(&self) -> usize {
        self.subscribers
            .lock()
            .iter()
            .filter(|s| !s.tx.is_closed())
            .count()
    }
}

impl Notify for ManualNotifier {
    fn notify(&self, kinds: &[SignalKind]) -> Result<mpsc::Receiver<SignalKind>, SignalError> {
        let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);
        self.subscribers.lock().push(Subscriber {
            kinds: kinds.to_vec(),
            tx,
        });
        Ok(rx)
    }
}
