//! HTTP route handlers for the search API.

use crate::error::SearchError;
use crate::server::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

// --- Request/Response types ---

#[derive(Deserialize)]
pub struct ItemSearchParams {
    pub item_id: u32,
    pub num_neighbors: usize,
    pub ef_search: Option<usize>,
}

#[derive(Deserialize)]
pub struct VectorSearchRequest {
    pub vector: Vec<f32>,
    pub k: Option<usize>,
    pub ef_search: Option<usize>,
}

#[derive(Serialize)]
pub struct NeighborResponse {
    pub item_id: u32,
    pub score: f32,
}

#[derive(Serialize)]
pub struct ItemSearchResponse {
    pub query_item_id: u32,
    pub results: Vec<NeighborResponse>,
    pub time_ms: f64,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub vector_count: usize,
    pub dimension: usize,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub total_searches: u64,
    pub total_errors: u64,
    pub avg_search_latency_us: f64,
    pub p50_search_latency_us: f64,
    pub p95_search_latency_us: f64,
    pub p99_search_latency_us: f64,
}

// --- Router ---

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(search_by_item).post(search_by_vector))
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

/// Map an engine error to a status: bad requests are distinguishable from
/// anything that would indicate corrupt server state.
fn error_status(err: &SearchError) -> StatusCode {
    match err {
        SearchError::OutOfRange { .. }
        | SearchError::DimensionMismatch { .. }
        | SearchError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(state: &AppState, err: SearchError) -> (StatusCode, Json<Value>) {
    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_error();
    }
    (error_status(&err), Json(json!({ "error": err.to_string() })))
}

// --- Handlers ---

async fn search_by_item(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ItemSearchParams>,
) -> Result<Json<ItemSearchResponse>, (StatusCode, Json<Value>)> {
    let ef = params.ef_search.unwrap_or(state.default_ef_search);
    let start = Instant::now();

    let results = state
        .engine
        .search_by_id(params.item_id, params.num_neighbors, ef)
        .map_err(|e| reject(&state, e))?;

    let elapsed = start.elapsed();
    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_search(elapsed);
    }

    Ok(Json(ItemSearchResponse {
        query_item_id: params.item_id,
        results: results
            .into_iter()
            .map(|n| NeighborResponse {
                item_id: n.id,
                score: n.distance,
            })
            .collect(),
        time_ms: elapsed.as_secs_f64() * 1000.0,
    }))
}

async fn search_by_vector(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VectorSearchRequest>,
) -> Result<Json<Vec<NeighborResponse>>, (StatusCode, Json<Value>)> {
    let k = req.k.unwrap_or(10);
    let ef = req.ef_search.unwrap_or(state.default_ef_search);
    let start = Instant::now();

    let results = state
        .engine
        .search(&req.vector, k, ef)
        .map_err(|e| reject(&state, e))?;

    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_search(start.elapsed());
    }

    Ok(Json(
        results
            .into_iter()
            .map(|n| NeighborResponse {
                item_id: n.id,
                score: n.distance,
            })
            .collect(),
    ))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        vector_count: state.engine.len(),
        dimension: state.engine.dimension(),
    })
}

async fn get_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MetricsResponse>, (StatusCode, Json<Value>)> {
    let metrics = state.metrics.read().map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Lock poisoned" })),
        )
    })?;

    Ok(Json(MetricsResponse {
        total_searches: metrics.total_searches(),
        total_errors: metrics.total_errors(),
        avg_search_latency_us: metrics.avg_search_latency_us(),
        p50_search_latency_us: metrics.percentile_search_latency_us(50.0),
        p95_search_latency_us: metrics.percentile_search_latency_us(95.0),
        p99_search_latency_us: metrics.percentile_search_latency_us(99.0),
    }))
}
