use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use triage_core::persist::{load_snapshot, IndexPaths};
use triage_core::{HistoricalTicket, QueryParams, SuggestionResult, TicketIndex};

/// Where the index comes from at startup.
#[derive(Debug, Clone)]
pub enum IndexSource {
    /// Fit from a dataset file or directory.
    Dataset(PathBuf),
    /// Load a snapshot written by `indexer build`.
    Snapshot(PathBuf),
}

impl IndexSource {
    pub fn load(&self) -> Result<TicketIndex> {
        let index = match self {
            IndexSource::Dataset(path) => TicketIndex::build(path)?,
            IndexSource::Snapshot(dir) => load_snapshot(&IndexPaths::new(dir))?.0,
        };
        Ok(index)
    }
}

#[derive(Deserialize)]
pub struct SuggestRequest {
    pub description: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
    pub threshold: Option<f64>,
}

#[derive(Serialize)]
pub struct SuggestResponse {
    pub query: String,
    pub took_s: f64,
    pub count: usize,
    pub results: Vec<SuggestionResult>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub num_docs: usize,
    pub num_terms: usize,
    pub default_top_k: usize,
    pub default_threshold: f64,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<TicketIndex>,
    pub defaults: QueryParams,
}

/// Build the index once from `source` and wrap it in a router.
pub fn build_app(source: &IndexSource, defaults: QueryParams) -> Result<Router> {
    let index = source.load()?;
    tracing::info!(?source, num_docs = index.len(), num_terms = index.vocabulary_len(), "index ready");
    Ok(router(Arc::new(index), defaults))
}

pub fn router(index: Arc<TicketIndex>, defaults: QueryParams) -> Router {
    let app_state = AppState { index, defaults };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/stats", get(stats_handler))
        .route("/suggest", post(suggest_handler))
        .route("/search", get(search_handler))
        .route("/tickets/:id", get(ticket_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Merge request overrides with the server defaults, rejecting out-of-range values.
fn resolve_params(defaults: &QueryParams, top_k: Option<usize>, threshold: Option<f64>) -> Result<QueryParams, (StatusCode, String)> {
    QueryParams::new(top_k.unwrap_or(defaults.top_k()), threshold.unwrap_or(defaults.threshold()))
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

fn run_query(state: &AppState, description: String, params: &QueryParams) -> SuggestResponse {
    let start = Instant::now();
    let results = state.index.query(&description, params);
    let elapsed = start.elapsed();
    tracing::debug!(count = results.len(), took_us = elapsed.as_micros() as u64, "suggestions served");
    SuggestResponse { query: description, took_s: elapsed.as_secs_f64(), count: results.len(), results }
}

pub async fn suggest_handler(
    State(state): State<AppState>,
    Json(body): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, (StatusCode, String)> {
    let params = resolve_params(&state.defaults, body.top_k, body.threshold)?;
    Ok(Json(run_query(&state, body.description, &params)))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SuggestResponse>, (StatusCode, String)> {
    let query_params = resolve_params(&state.defaults, params.k, params.threshold)?;
    Ok(Json(run_query(&state, params.q, &query_params)))
}

pub async fn ticket_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<HistoricalTicket>, (StatusCode, String)> {
    state
        .index
        .ticket(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("ticket {id} not found")))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        num_docs: state.index.len(),
        num_terms: state.index.vocabulary_len(),
        default_top_k: state.defaults.top_k(),
        default_threshold: state.defaults.threshold(),
    })
}
