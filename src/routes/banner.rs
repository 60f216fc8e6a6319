use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    models::banner::{BannerState, SetBannerRequest},
    services::gateway::{self, BannerError},
    AppState,
};

/// GET /banner — public endpoint, returns the current banner snapshot. Used
/// by viewers for the initial pull and for resync after a reconnect.
pub async fn get_banner(State(state): State<AppState>) -> Json<BannerState> {
    Json(state.store.get())
}

/// POST /banner/add — replace the banner. The duration fields are an offset
/// from submission time; the server stamps the absolute UTC expiry and echoes
/// the accepted snapshot back.
pub async fn set_banner(
    State(state): State<AppState>,
    Json(body): Json<SetBannerRequest>,
) -> Result<Json<BannerState>, (StatusCode, Json<Value>)> {
    let accepted = gateway::apply_update(
        &state.store,
        &state.broadcaster,
        state.clock.as_ref(),
        body,
    )
    .await
    .map_err(|e| {
        let status = match e {
            BannerError::Validation(_) => StatusCode::BAD_REQUEST,
            BannerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": e.to_string() })))
    })?;

    Ok(Json(accepted))
}
