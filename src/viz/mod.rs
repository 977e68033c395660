//! HTTP front for one visualization session.
//!
//! Serves the current render payload as JSON and exposes the session's
//! interactions (filter, expand, collapse, depth) as endpoints, so any
//! browser-side charting library can act as the renderer.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::LnGraphError;
use crate::graph::BuildStats;
use crate::render::RenderPayload;
use crate::session::VisualizationSession;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct VizState {
    session: Mutex<VisualizationSession>,
}

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StatsJson {
    build: BuildStats,
    placeholder: bool,
    filter: Option<String>,
    depth: u32,
    metrics: serde_json::Value,
}

#[derive(Serialize)]
struct ExpandJson {
    node: String,
    added: usize,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct GraphQuery {
    q: Option<String>,
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

struct ApiError(LnGraphError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LnGraphError::UnknownNode(_) => StatusCode::NOT_FOUND,
            LnGraphError::NodeNotVisible(_) => StatusCode::CONFLICT,
            LnGraphError::CycleDetected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({"error": self.0.to_string()}))).into_response()
    }
}

impl From<LnGraphError> for ApiError {
    fn from(e: LnGraphError) -> Self {
        Self(e)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// The current view. `?q=` filters this response only.
async fn get_graph(
    State(state): State<Arc<VizState>>,
    Query(params): Query<GraphQuery>,
) -> Result<Json<RenderPayload>, ApiError> {
    let session = state.session.lock().await;
    let payload = match params.q {
        Some(q) => session.preview_filter(&q)?,
        None => session.payload()?,
    };
    Ok(Json(payload))
}

/// Store `?q=` as the session filter; a missing or blank query resets it.
async fn set_filter(
    State(state): State<Arc<VizState>>,
    Query(params): Query<GraphQuery>,
) -> Result<Json<RenderPayload>, ApiError> {
    let mut session = state.session.lock().await;
    match params.q {
        Some(q) => session.set_filter(&q),
        None => session.reset_filter(),
    }
    Ok(Json(session.payload()?))
}

async fn expand_node(
    State(state): State<Arc<VizState>>,
    Path(node_id): Path<String>,
) -> Result<Json<ExpandJson>, ApiError> {
    let mut session = state.session.lock().await;
    let added = session.expand(&node_id)?;
    Ok(Json(ExpandJson {
        node: node_id,
        added,
    }))
}

async fn collapse_all(State(state): State<Arc<VizState>>) -> Result<Json<RenderPayload>, ApiError> {
    let mut session = state.session.lock().await;
    session.collapse_all();
    Ok(Json(session.payload()?))
}

async fn set_depth(
    State(state): State<Arc<VizState>>,
    Path(depth): Path<u32>,
) -> Result<Json<RenderPayload>, ApiError> {
    let mut session = state.session.lock().await;
    session.set_depth(depth);
    Ok(Json(session.payload()?))
}

async fn search_nodes(
    State(state): State<Arc<VizState>>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<String>> {
    let query = match params.q {
        Some(q) if !q.trim().is_empty() => q,
        _ => return Json(Vec::new()),
    };
    let session = state.session.lock().await;
    Json(
        session
            .search(&query)
            .into_iter()
            .map(|id| id.to_string())
            .collect(),
    )
}

async fn get_stats(State(state): State<Arc<VizState>>) -> Json<StatsJson> {
    let session = state.session.lock().await;
    Json(StatsJson {
        build: session.stats(),
        placeholder: session.is_placeholder(),
        filter: session.filter_query().map(str::to_string),
        depth: session.disclosure_state().depth(),
        metrics: session.metrics().to_json(),
    })
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Build the viz Router (extracted for testability).
fn build_router(state: Arc<VizState>) -> Router {
    Router::new()
        .route("/api/graph", get(get_graph))
        .route("/api/filter", post(set_filter))
        .route("/api/expand/{id}", post(expand_node))
        .route("/api/collapse", post(collapse_all))
        .route("/api/depth/{depth}", post(set_depth))
        .route("/api/search", get(search_nodes))
        .route("/api/stats", get(get_stats))
        .with_state(state)
}

/// Serve `session` on `addr` until Ctrl-C.
pub async fn run_viz_server(
    session: VisualizationSession,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(VizState {
        session: Mutex::new(session),
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Visualization server listening");
    eprintln!("lngraph viz server at http://{addr}/api/graph");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down visualization server");
        })
        .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::types::Record;

    fn test_state() -> Arc<VizState> {
        let mut session = VisualizationSession::new(GraphConfig::default()).unwrap();
        session
            .load_records(&[
                Record::from_pairs([
                    ("Major Group", "NHL"),
                    ("WHO-HAEM5 Category", "LBCL"),
                    ("WHO-HAEM5 Family-Class", "DLBCL"),
                ]),
                Record::from_pairs([("Major Group", "HL")]),
            ])
            .unwrap();
        Arc::new(VizState {
            session: Mutex::new(session),
        })
    }

    #[tokio::test]
    async fn get_graph_returns_default_depth_view() {
        let state = test_state();
        let params = GraphQuery { q: None };
        let Json(payload) = get_graph(State(state), Query(params)).await.ok().unwrap();
        assert_eq!(payload.nodes.len(), 4);
        assert_eq!(payload.links.len(), 3);
    }

    #[tokio::test]
    async fn get_graph_query_filters_one_response() {
        let state = test_state();
        let params = GraphQuery {
            q: Some("lbcl".into()),
        };
        let Json(payload) = get_graph(State(state.clone()), Query(params))
            .await
            .ok()
            .unwrap();
        assert_eq!(payload.nodes.len(), 2);

        // nothing was stored by the GET
        let Json(payload) = get_graph(State(state.clone()), Query(GraphQuery { q: None }))
            .await
            .ok()
            .unwrap();
        assert_eq!(payload.nodes.len(), 4);
        assert_eq!(state.session.lock().await.filter_query(), None);
    }

    #[tokio::test]
    async fn post_filter_sticks_until_reset() {
        let state = test_state();
        let Json(payload) = set_filter(
            State(state.clone()),
            Query(GraphQuery {
                q: Some("lbcl".into()),
            }),
        )
        .await
        .ok()
        .unwrap();
        assert_eq!(payload.nodes.len(), 2);

        let Json(payload) = get_graph(State(state.clone()), Query(GraphQuery { q: None }))
            .await
            .ok()
            .unwrap();
        assert_eq!(payload.nodes.len(), 2);

        let Json(payload) = set_filter(State(state.clone()), Query(GraphQuery { q: None }))
            .await
            .ok()
            .unwrap();
        assert_eq!(payload.nodes.len(), 4);
        assert_eq!(state.session.lock().await.filter_query(), None);
    }

    #[tokio::test]
    async fn expand_reveals_descendants() {
        let state = test_state();
        let Json(body) = expand_node(State(state.clone()), Path("MG|NHL".into()))
            .await
            .ok()
            .unwrap();
        assert_eq!(body.added, 1);

        let Json(payload) = get_graph(State(state), Query(GraphQuery { q: None }))
            .await
            .ok()
            .unwrap();
        assert_eq!(payload.nodes.len(), 5);
    }

    #[tokio::test]
    async fn expand_unknown_node_is_not_found() {
        let state = test_state();
        let resp = expand_node(State(state), Path("MG|nope".into()))
            .await
            .err()
            .unwrap()
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn expand_hidden_node_is_conflict() {
        let state = test_state();
        let resp = expand_node(State(state), Path("C2|DLBCL".into()))
            .await
            .err()
            .unwrap()
            .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn collapse_restores_default_view() {
        let state = test_state();
        let _ = expand_node(State(state.clone()), Path("MG|NHL".into())).await;
        let Json(payload) = collapse_all(State(state)).await.ok().unwrap();
        assert_eq!(payload.nodes.len(), 4);
    }

    #[tokio::test]
    async fn set_depth_changes_visible_levels() {
        let state = test_state();
        let Json(payload) = set_depth(State(state), Path(1)).await.ok().unwrap();
        assert_eq!(payload.nodes.len(), 3);
    }

    #[tokio::test]
    async fn search_empty_query_returns_empty() {
        let state = test_state();
        let Json(results) = search_nodes(State(state), Query(SearchQuery { q: None })).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn search_finds_visible_nodes() {
        let state = test_state();
        let Json(results) = search_nodes(
            State(state),
            Query(SearchQuery {
                q: Some("hl".into()),
            }),
        )
        .await;
        assert_eq!(results, vec!["MG|NHL", "MG|HL"]);
    }

    #[tokio::test]
    async fn get_stats_reflects_session() {
        let state = test_state();
        let Json(stats) = get_stats(State(state)).await;
        assert_eq!(stats.build.records_used, 2);
        assert_eq!(stats.build.nodes, 5);
        assert!(!stats.placeholder);
        assert_eq!(stats.depth, 2);
    }

    #[tokio::test]
    async fn build_router_creates_valid_router() {
        let state = test_state();
        let _router = build_router(state);
    }
}
