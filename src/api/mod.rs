pub mod analyze;
pub mod cache;
pub mod error;
pub mod export;
pub mod geocode;
pub mod health;
pub mod response;
pub mod zones;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::{config::Config, controller::AppState};

pub fn router(state: AppState, cfg: &Config) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/zones", get(zones::list_zones))
        .route("/geocode", get(geocode::search_places))
        .route("/analyze", post(analyze::analyze))
        .route("/export-csv", post(export::export_csv))
        .route("/cache/stats", get(cache::cache_stats))
        .with_state(state);

    let mut router = Router::new().nest("/api", api);

    if cfg.server.enable_cors {
        router = router.layer(cors_layer(&cfg.server.cors_allowed_origins));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    cfg.server.request_timeout(),
                )),
        )
        .layer(TraceLayer::new_for_http())
}

/// An empty list or a `*` entry allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}
