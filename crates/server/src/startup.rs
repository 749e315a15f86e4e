use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use service::storage::{JsonFileStorage, TodoStorage};
use service::todos::TodoService;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Build the router over the JSON document at `cfg.storage.data_file`.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let data_file = &cfg.storage.data_file;
    common::env::ensure_data_dir(data_file).await?;

    let storage = JsonFileStorage::new(data_file);
    // touch the document once so a corrupt file shows up in the logs early
    match storage.load().await {
        Ok(todos) => info!(path = %storage.path().display(), count = todos.len(), "todo storage ready"),
        Err(e) => warn!(path = %storage.path().display(), error = %e, "todo storage unreadable; requests will fail until fixed"),
    }

    let state = AppState::new(TodoService::new(Arc::new(storage)));
    Ok(routes::build_router(state, build_cors()))
}

/// Serve with an already validated config. Logging must be initialized by the caller.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr: SocketAddr = cfg.bind_addr().parse()?;
    info!(%addr, "starting todo server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
