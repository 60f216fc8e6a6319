use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::banner::BannerState;
use crate::services::broadcast::BannerBroadcaster;
use crate::services::clock::Clock;
use crate::services::countdown::{time_left, TimeLeft};
use crate::services::store::BannerStore;

/// Where the viewer is in its connection lifecycle. `Stale` is not an error:
/// the countdown keeps running from the last known record until resynced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Connecting,
    Synced,
    Stale,
}

/// One render-ready view of the banner: the cached record plus the countdown
/// derived from it. Replaced whole on every push and every tick, never
/// field-mutated, so a renderer always reads one consistent instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerFrame {
    pub banner: BannerState,
    pub time_left: TimeLeft,
    pub phase: ConnectionPhase,
}

/// Delay before a stale viewer re-subscribes.
const RESYNC_DELAY: Duration = Duration::from_secs(1);

/// One viewer's session: an initial pull, a live feed, and a once-per-second
/// countdown recompute feeding a `watch` channel the renderer observes. A push
/// recomputes immediately, so a just-moved expiry shows without waiting for
/// the next tick. Dropping the session aborts its task; no timer outlives it.
pub struct ViewerSession {
    frames: watch::Receiver<ViewerFrame>,
    task: JoinHandle<()>,
}

impl ViewerSession {
    pub fn spawn(
        store: Arc<BannerStore>,
        broadcaster: Arc<BannerBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let initial = ViewerFrame {
            banner: BannerState::hidden_default(clock.now()),
            time_left: TimeLeft::ZERO,
            phase: ConnectionPhase::Connecting,
        };
        let (tx, frames) = watch::channel(initial);
        let task = tokio::spawn(run(store, broadcaster, clock, tx));
        Self { frames, task }
    }

    /// Renderer-side handle; `changed().await` wakes on every new frame.
    pub fn frames(&self) -> watch::Receiver<ViewerFrame> {
        self.frames.clone()
    }

    pub fn current(&self) -> ViewerFrame {
        self.frames.borrow().clone()
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    store: Arc<BannerStore>,
    broadcaster: Arc<BannerBroadcaster>,
    clock: Arc<dyn Clock>,
    tx: watch::Sender<ViewerFrame>,
) {
    let viewer_id = Uuid::new_v4();
    let mut first_connect = true;
    loop {
        if !first_connect {
            tokio::time::sleep(RESYNC_DELAY).await;
        }
        first_connect = false;

        // Subscribe before the snapshot pull so an update published in
        // between is still delivered rather than lost.
        let mut feed = broadcaster.subscribe();
        let mut banner = store.get();
        info!("Viewer {viewer_id} synced (endTime={})", banner.end_time);
        render(&tx, &clock, banner.clone(), ConnectionPhase::Synced);

        let mut tick = tokio::time::interval(Duration::from_secs(1));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tick.reset(); // first recompute comes one second from now

        loop {
            tokio::select! {
                update = feed.recv() => match update {
                    Ok(state) => {
                        // Replace the cache and recompute immediately.
                        banner = state;
                        render(&tx, &clock, banner.clone(), ConnectionPhase::Synced);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        debug!("Viewer {viewer_id} lagged {missed} updates, resyncing");
                        break;
                    }
                    Err(RecvError::Closed) => {
                        warn!("Viewer {viewer_id} lost its feed, will resync");
                        break;
                    }
                },
                _ = tick.tick() => {
                    render(&tx, &clock, banner.clone(), ConnectionPhase::Synced);
                }
            }
        }

        // Keep showing the last known record while reconnecting.
        render(&tx, &clock, banner, ConnectionPhase::Stale);
    }
}

fn render(
    tx: &watch::Sender<ViewerFrame>,
    clock: &Arc<dyn Clock>,
    banner: BannerState,
    phase: ConnectionPhase,
) {
    let time_left = time_left(banner.end_time, clock.now());
    let _ = tx.send(ViewerFrame { banner, time_left, phase });
}
