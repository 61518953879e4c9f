//! HTTP API for the preset service.
//!
//! This module provides the REST API endpoints for:
//! - Health monitoring
//! - Preset resolution for request consumers
//! - Preset administration (full document read, nested updates)

use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    routing::{get, put},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::preset::PresetStore;

pub mod presets;
use presets::{get_presets_handler, resolve_preset_handler, update_preset_handler};

/// Application state
pub struct AppState {
    pub store: Arc<PresetStore>,
    pub start_time: Instant,
}

/// Build the API router
pub fn router(store: Arc<PresetStore>, server: &ServerConfig) -> Router {
    let state = Arc::new(AppState {
        store,
        start_time: Instant::now(),
    });

    let api_routes = Router::new()
        .route("/presets", get(get_presets_handler))
        .route("/presets", put(update_preset_handler))
        .route("/presets/resolve", get(resolve_preset_handler));

    let mut app = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Some(cors) = cors_layer(&server.cors_allow_origins) {
        app = app.layer(cors);
    }

    app
}

/// CORS stays disabled unless origins are configured; "*" allows any origin.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let layer = if origins.iter().any(|origin| origin == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    };

    Some(layer)
}

// === Health ===

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store_ok = state.store.document().is_ok();

    Json(HealthResponse {
        status: if store_ok { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
}
