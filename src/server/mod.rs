//! HTTP API server wrapping the search engine.
//!
//! The engine is immutable after load, so it is shared as a plain `Arc` with
//! no lock; only the metrics collector sits behind a `RwLock`.

pub mod routes;

use std::sync::{Arc, RwLock};

use crate::engine::SearchEngine;
use crate::metrics::MetricsCollector;

/// Shared application state for the HTTP server.
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub metrics: RwLock<MetricsCollector>,
    /// Frontier width used when a request does not specify one.
    pub default_ef_search: usize,
}

/// Start the HTTP server over an already-loaded engine.
pub async fn start(addr: &str, engine: SearchEngine, default_ef_search: usize) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        engine: Arc::new(engine),
        metrics: RwLock::new(MetricsCollector::new()),
        default_ef_search,
    });

    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
