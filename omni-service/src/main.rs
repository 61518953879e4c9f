use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

mod api;
mod config;
mod error;
mod preset;

use crate::config::load_static_config;
use crate::preset::{MODEL_PRESETS, PresetStore, bootstrap};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!(
        "Starting Omni preset service v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load static configuration (server binding, preset storage location)
    let static_config = load_static_config()?;
    info!(
        host = %static_config.server.host,
        port = static_config.server.port,
        "Static configuration loaded"
    );

    // Guarantee the user preset document exists before the store is first read
    let preset_dir = static_config.storage.preset_dir();
    let config_path = bootstrap::ensure_user_config(&preset_dir)?;

    let store = Arc::new(PresetStore::open(config_path));

    // Prime the cache as a startup sanity check
    let defaults = store.namespace_default(MODEL_PRESETS)?;
    info!(
        path = %store.path().display(),
        default_params = defaults.len(),
        "Preset store loaded"
    );

    // Build the router
    let app = api::router(store, &static_config.server);

    // Start the server
    let addr = format!(
        "{}:{}",
        static_config.server.host, static_config.server.port
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format().with_target(true).compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("omni_service=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
