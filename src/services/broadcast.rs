use tokio::sync::broadcast;

use crate::models::banner::BannerState;

/// How many un-consumed snapshots a slow subscriber may buffer before it is
/// lagged. A lagged viewer does not replay backlog; it resyncs from the store,
/// so only the latest state matters.
const CHANNEL_CAPACITY: usize = 16;

/// Fan-out of accepted banner snapshots to every connected viewer. Each
/// subscriber owns its own receiver queue, so one slow viewer never blocks
/// delivery to the others; dropping the receiver is the unsubscribe.
pub struct BannerBroadcaster {
    tx: broadcast::Sender<BannerState>,
}

impl BannerBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Push a snapshot to all current subscribers. Non-blocking; a send with
    /// no subscribers is not an error.
    pub fn publish(&self, state: BannerState) {
        let _ = self.tx.send(state);
    }

    /// Live feed of snapshots in publish order. Callers pair this with an
    /// initial `BannerStore::get` — subscribing first, then reading the
    /// snapshot, so an update landing in between is never lost.
    pub fn subscribe(&self) -> broadcast::Receiver<BannerState> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BannerBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
