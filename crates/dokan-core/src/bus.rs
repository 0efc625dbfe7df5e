//! Publish/subscribe for change events

use dokan_api::ChangeEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of events a slow subscriber may fall behind by
const DEFAULT_CAPACITY: usize = 64;

/// Fan-out of [`ChangeEvent`]s to every subscriber.
///
/// Publishing never blocks and works without a runtime; subscribers can
/// `recv().await` inside tokio or `try_recv()` from plain code.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: ChangeEvent) {
        // An error only means nobody is listening
        if self.tx.send(event).is_err() {
            trace!("Change event dropped, no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}
