use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::models::banner::BannerState;

/// Durable-shadow failure. A replace that hits this leaves the in-memory
/// record untouched and must not be broadcast.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write banner shadow file: {0}")]
    Write(#[from] std::io::Error),
    #[error("failed to serialize banner state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Owner of the single authoritative `BannerState`, plus its shadow file so a
/// restart recovers the last acknowledged record.
///
/// Readers take cheap snapshots; `replace` persists to disk before swapping
/// the record, and replaces are serialized so a snapshot is always one whole
/// acknowledged record, never a mix of two.
pub struct BannerStore {
    state: RwLock<BannerState>,
    shadow_path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl BannerStore {
    /// Load the shadow file if present, otherwise start from the hidden
    /// default record.
    pub async fn load_or_default(shadow_path: impl Into<PathBuf>, now: DateTime<Utc>) -> Self {
        let shadow_path = shadow_path.into();
        let state = match tokio::fs::read(&shadow_path).await {
            Ok(bytes) => match serde_json::from_slice::<BannerState>(&bytes) {
                Ok(state) => {
                    info!("Restored banner state from {}", shadow_path.display());
                    state
                }
                Err(e) => {
                    warn!(
                        "Unreadable banner shadow {} ({}), starting hidden",
                        shadow_path.display(),
                        e
                    );
                    BannerState::hidden_default(now)
                }
            },
            Err(_) => BannerState::hidden_default(now),
        };
        Self {
            state: RwLock::new(state),
            shadow_path,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Current snapshot. Never touches the disk and never blocks on a replace
    /// beyond the pointer swap itself.
    pub fn get(&self) -> BannerState {
        self.state.read().unwrap().clone()
    }

    /// Atomically swap in a new record. The shadow file is written (and
    /// fsync-safe via temp-then-rename) before the swap, so an acknowledged
    /// replace survives a crash; on write failure nothing changes.
    pub async fn replace(&self, new: BannerState) -> Result<BannerState, StoreError> {
        self.replace_then(new, |_| {}).await
    }

    /// Like `replace`, but runs `on_commit` with the acknowledged snapshot
    /// before the critical section ends. Observers notified through it see
    /// commits in store order — two racing replaces cannot announce
    /// themselves in the opposite order of their swaps. `on_commit` is not
    /// called when the durable write fails.
    pub async fn replace_then<F>(&self, new: BannerState, on_commit: F) -> Result<BannerState, StoreError>
    where
        F: FnOnce(&BannerState),
    {
        let _guard = self.write_lock.lock().await;
        persist(&self.shadow_path, &new).await?;
        *self.state.write().unwrap() = new.clone();
        on_commit(&new);
        Ok(new)
    }

    pub fn shadow_path(&self) -> &Path {
        &self.shadow_path
    }
}

/// Write the snapshot next to the shadow file and rename it into place, so a
/// crash mid-write never leaves a truncated shadow.
async fn persist(path: &Path, state: &BannerState) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(state)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn sample(now: DateTime<Utc>) -> BannerState {
        BannerState {
            description: "Sale".into(),
            link: "example.com/x".into(),
            visibility: true,
            end_time: now + Duration::seconds(5_400),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn starts_hidden_when_no_shadow_exists() {
        let dir = tempfile::tempdir().unwrap();
        let store = BannerStore::load_or_default(dir.path().join("banner.json"), t0()).await;
        let state = store.get();
        assert!(!state.visibility);
        assert!(state.description.is_empty());
        assert_eq!(state.end_time, t0());
    }

    #[tokio::test]
    async fn replace_persists_and_restart_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banner.json");

        let store = BannerStore::load_or_default(&path, t0()).await;
        store.replace(sample(t0())).await.unwrap();
        assert!(path.exists());

        // Simulated restart: a fresh store sees the acknowledged record.
        let restarted = BannerStore::load_or_default(&path, t0()).await;
        assert_eq!(restarted.get(), sample(t0()));
    }

    #[tokio::test]
    async fn corrupt_shadow_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banner.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let store = BannerStore::load_or_default(&path, t0()).await;
        assert!(!store.get().visibility);
    }

    #[tokio::test]
    async fn failed_shadow_write_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the shadow path makes the rename fail.
        let path = dir.path().join("banner.json");
        tokio::fs::create_dir(&path).await.unwrap();

        let store = BannerStore::load_or_default(path, t0()).await;
        let before = store.get();
        let err = store.replace(sample(t0())).await;
        assert!(err.is_err());
        assert_eq!(store.get(), before);
    }

    #[tokio::test]
    async fn on_commit_sees_the_acknowledged_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = BannerStore::load_or_default(dir.path().join("banner.json"), t0()).await;

        let mut observed = None;
        store
            .replace_then(sample(t0()), |accepted| observed = Some(accepted.clone()))
            .await
            .unwrap();
        assert_eq!(observed, Some(sample(t0())));
    }

    #[tokio::test]
    async fn on_commit_is_skipped_when_the_durable_write_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banner.json");
        tokio::fs::create_dir(&path).await.unwrap();
        let store = BannerStore::load_or_default(path, t0()).await;

        let mut called = false;
        let err = store.replace_then(sample(t0()), |_| called = true).await;
        assert!(err.is_err());
        assert!(!called);
    }

    #[tokio::test]
    async fn concurrent_readers_never_observe_a_torn_record() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            Arc::new(BannerStore::load_or_default(dir.path().join("banner.json"), t0()).await);

        // Two fully distinct records; every snapshot must equal one of them
        // (or the initial default), never a field mix.
        let a = BannerState {
            description: "A".into(),
            link: "a.example".into(),
            visibility: true,
            end_time: t0() + Duration::seconds(100),
        };
        let b = BannerState {
            description: "B".into(),
            link: "b.example".into(),
            visibility: false,
            end_time: t0() + Duration::seconds(200),
        };
        let initial = store.get();

        let writer = {
            let store = store.clone();
            let (a, b) = (a.clone(), b.clone());
            tokio::spawn(async move {
                for i in 0..50 {
                    let next = if i % 2 == 0 { a.clone() } else { b.clone() };
                    store.replace(next).await.unwrap();
                }
            })
        };
        let reader = {
            let store = store.clone();
            let (a, b) = (a.clone(), b.clone());
            tokio::spawn(async move {
                for _ in 0..500 {
                    let snap = store.get();
                    assert!(snap == a || snap == b || snap == initial, "torn read: {snap:?}");
                    tokio::task::yield_now().await;
                }
            })
        };
        writer.await.unwrap();
        reader.await.unwrap();
    }
}
