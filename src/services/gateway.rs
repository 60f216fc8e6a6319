use chrono::Duration;
use tracing::info;

use crate::models::banner::{BannerState, SetBannerRequest};
use crate::services::broadcast::BannerBroadcaster;
use crate::services::clock::Clock;
use crate::services::store::{BannerStore, StoreError};

/// Failures of the update path. `Validation` leaves the record untouched;
/// `Store` means the durable write failed, so nothing was acknowledged and
/// nothing is broadcast.
#[derive(Debug, thiserror::Error)]
pub enum BannerError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validate a submitted update, stamp its absolute expiry from the server
/// clock, persist it, then fan it out. The broadcast only happens after the
/// store acknowledged the durable write.
pub async fn apply_update(
    store: &BannerStore,
    broadcaster: &BannerBroadcaster,
    clock: &dyn Clock,
    req: SetBannerRequest,
) -> Result<BannerState, BannerError> {
    let duration = duration_seconds(&req)?;

    let now = clock.now();
    // try_seconds: a huge offset must surface as Validation, not a panic.
    let end_time = Duration::try_seconds(duration)
        .and_then(|offset| now.checked_add_signed(offset))
        .ok_or_else(|| BannerError::Validation("duration is out of range".into()))?;

    // Publish inside the store's critical section so concurrent submissions
    // cannot fan out in the opposite order of their swaps, which would leave
    // connected viewers parked on a superseded record.
    let accepted = store
        .replace_then(
            BannerState {
                description: req.description,
                link: req.link,
                visibility: req.visibility,
                end_time,
            },
            |accepted| broadcaster.publish(accepted.clone()),
        )
        .await?;

    info!(
        "Banner updated: visibility={} endTime={} ({}s from now)",
        accepted.visibility, accepted.end_time, duration
    );
    Ok(accepted)
}

/// Total offset in seconds. Every component must be non-negative, and the
/// total must not overflow.
fn duration_seconds(req: &SetBannerRequest) -> Result<i64, BannerError> {
    for (name, value) in [
        ("day", req.day),
        ("hour", req.hour),
        ("minute", req.minute),
        ("second", req.second),
    ] {
        if value < 0 {
            return Err(BannerError::Validation(format!(
                "duration field '{name}' must be a non-negative integer, got {value}"
            )));
        }
    }
    req.day
        .checked_mul(86_400)
        .and_then(|d| d.checked_add(req.hour.checked_mul(3_600)?))
        .and_then(|d| d.checked_add(req.minute.checked_mul(60)?))
        .and_then(|d| d.checked_add(req.second))
        .ok_or_else(|| BannerError::Validation("duration is out of range".into()))
}
