// Library exports for the api binary and tests
pub mod config;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use services::broadcast::BannerBroadcaster;
use services::clock::Clock;
use services::store::BannerStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<BannerStore>,
    pub broadcaster: Arc<BannerBroadcaster>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}
