//! AI Tools Puzzle · Backend
//!
//! - Axum HTTP API over an SQLite catalog with a built-in static fallback
//! - Progress recording (best score kept per user and use case)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3001)
//!   DATABASE_PATH       : SQLite file (default "aipuzzle.db"; ":memory:" allowed)
//!   CATALOG_CONFIG_PATH : optional TOML catalog bank used for seeding and fallback
//!   CATALOG_RESEED      : "1"/"true"/"yes" (any case) replaces the stored catalog at startup
//!   STATIC_DIR          : frontend directory (default "./static")
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use aipuzzle_backend::config::AppConfig;
use aipuzzle_backend::routes::build_router;
use aipuzzle_backend::state::AppState;
use aipuzzle_backend::telemetry;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = AppConfig::from_env();

  // Open the store (seeding it if empty) and build the fallback catalog.
  let state = Arc::new(AppState::open(&cfg).await);

  let app = build_router(state.clone(), &cfg.static_dir);

  let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "aipuzzle_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

  match Arc::try_unwrap(state) {
    Ok(state) => state.close(),
    Err(_) => warn!(target: "aipuzzle_backend", "State still shared at shutdown; store left to drop"),
  }
  info!(target: "aipuzzle_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "aipuzzle_backend", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "aipuzzle_backend", "Shutdown signal received");
}
