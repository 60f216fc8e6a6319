use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use livebanner_api::config::Config;
use livebanner_api::services::broadcast::BannerBroadcaster;
use livebanner_api::services::clock::{Clock, SystemClock};
use livebanner_api::services::store::BannerStore;
use livebanner_api::{routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(BannerStore::load_or_default(&config.state_file, clock.now()).await);
    info!(
        "Banner store ready (shadow: {}, visible: {})",
        config.state_file,
        store.get().visibility
    );

    let state = AppState {
        store,
        broadcaster: Arc::new(BannerBroadcaster::new()),
        clock,
        config: config.clone(),
    };

    // CORS: the banner is embedded on pages served from the app base URL;
    // localhost is always allowed for development.
    let cors_origin = {
        let base = config.app_base_url.clone();
        AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            let o = match origin.to_str() {
                Ok(s) => s,
                Err(_) => return false,
            };
            o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") || o == base
        })
    };
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_origin(cors_origin);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Snapshot pull (initial load and resync)
        .route("/banner", get(routes::banner::get_banner))
        // Admin mutation
        .route("/banner/add", post(routes::banner::set_banner))
        // Live feeds: WebSocket plus SSE fallback
        .route("/ws", get(routes::websocket::ws_handler))
        .route("/events", get(routes::events::sse_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("livebanner API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
