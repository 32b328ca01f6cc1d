// Fraud Investigation Dashboard - JSON API Server
// Read-only endpoints over a snapshot loaded at startup

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use fraud_investigation::{
    init_tracing, open_source, recent_alerts, top_risk, Account, AccountQuery, Config,
    DashboardMetrics, DateRange, GraphLayoutProjector, GraphScene, NodeLookup, Report,
    ReportQuery, RiskFilter, Snapshot, TimelineController, TimelineEvent, TimelineSummary,
    TypeFilter, VisibleEvent,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
struct AppState {
    snapshot: Arc<Snapshot>,
    reference_date: Option<NaiveDate>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// Query parameters
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct AccountParams {
    q: Option<String>,
    risk: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GraphParams {
    selected: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TimelineParams {
    risk: Option<String>,
    index: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportParams {
    #[serde(rename = "type")]
    report_type: Option<String>,
    range: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Serialize)]
struct DashboardResponse<'a> {
    metrics: DashboardMetrics,
    top_accounts: Vec<&'a Account>,
    recent_alerts: Vec<&'a TimelineEvent>,
}

#[derive(Serialize)]
struct TimelineResponse<'a> {
    current_index: usize,
    progress: f64,
    filter: RiskFilter,
    events: Vec<VisibleEvent<'a>>,
    summary: TimelineSummary,
}

#[derive(Serialize)]
struct ReportsResponse<'a> {
    type_filter: &'static str,
    range: &'static str,
    reference: NaiveDate,
    reports: Vec<&'a Report>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/dashboard - Headline metrics, top accounts and recent alerts
async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = &state.snapshot;
    let response = DashboardResponse {
        metrics: DashboardMetrics::from_snapshot(snapshot),
        top_accounts: top_risk(&snapshot.accounts, 5),
        recent_alerts: recent_alerts(&snapshot.timeline, 5),
    };

    (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
}

/// GET /api/accounts?q=&risk= - Filtered account table
async fn get_accounts(
    State(state): State<AppState>,
    Query(params): Query<AccountParams>,
) -> impl IntoResponse {
    let query = AccountQuery::new()
        .with_search(params.q.as_deref().unwrap_or_default())
        .with_risk(RiskFilter::parse(params.risk.as_deref().unwrap_or("all")));

    let accounts = query.apply(&state.snapshot.accounts);
    (StatusCode::OK, Json(ApiResponse::ok(accounts))).into_response()
}

/// GET /api/graph?selected= - Drawable graph scene
async fn get_graph(
    State(state): State<AppState>,
    Query(params): Query<GraphParams>,
) -> impl IntoResponse {
    let mut projector = GraphLayoutProjector::new(state.snapshot.nodes.clone(), state.snapshot.edges.clone());
    projector.select_node(params.selected.as_deref());

    let scene: GraphScene = projector.project();
    if scene.skipped_edges > 0 {
        warn!(skipped = scene.skipped_edges, "graph has edges with unknown endpoints");
    }

    (StatusCode::OK, Json(ApiResponse::ok(scene))).into_response()
}

/// GET /api/graph/nodes/:id - Node detail
async fn get_node(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let projector = GraphLayoutProjector::new(state.snapshot.nodes.clone(), state.snapshot.edges.clone());

    match projector.lookup(&id, &state.snapshot.accounts) {
        NodeLookup::Found(detail) => (StatusCode::OK, Json(ApiResponse::ok(detail))).into_response(),
        NodeLookup::NotFound(missing) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Node not found: {}", missing))),
        )
            .into_response(),
        NodeLookup::NoSelection => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("No node selected")),
        )
            .into_response(),
    }
}

/// GET /api/timeline?risk=&index= - Filtered timeline at a playback position
async fn get_timeline(
    State(state): State<AppState>,
    Query(params): Query<TimelineParams>,
) -> impl IntoResponse {
    let mut controller = TimelineController::new(state.snapshot.timeline.clone());
    controller.set_filter(RiskFilter::parse(params.risk.as_deref().unwrap_or("all")));
    if let Some(index) = params.index {
        controller.set_current_index(index);
    }

    let response = TimelineResponse {
        current_index: controller.current_index(),
        progress: controller.progress(),
        filter: controller.filter(),
        events: controller.visible_events(),
        summary: controller.summary(),
    };

    // Visible rows borrow the controller; serialize before it drops
    Json(ApiResponse::ok(response)).into_response()
}

/// GET /api/reports?type=&range= - Filtered report list
async fn get_reports(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> impl IntoResponse {
    let mut query = ReportQuery::for_reports(&state.snapshot.reports, state.reference_date);
    if let Some(kind) = params.report_type.as_deref() {
        query.type_filter = TypeFilter::parse(kind);
    }
    if let Some(range) = params.range.as_deref() {
        query.range = DateRange::parse(range);
    }

    let response = ReportsResponse {
        type_filter: query.type_filter.label(),
        range: query.range.label(),
        reference: query.reference,
        reports: query.apply(&state.snapshot.reports),
    };

    (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
}

// ============================================================================
// Main Server
// ============================================================================

fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/accounts", get(get_accounts))
        .route("/graph", get(get_graph))
        .route("/graph/nodes/:id", get(get_node))
        .route("/timeline", get(get_timeline))
        .route("/reports", get(get_reports))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config.log_level);

    println!("🌐 Fraud Investigation Dashboard - API Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let source = open_source(&config)?;
    let snapshot = Snapshot::load(source.as_ref())?;
    println!(
        "✓ Snapshot loaded: {} accounts, {} nodes, {} events, {} reports",
        snapshot.accounts.len(),
        snapshot.nodes.len(),
        snapshot.timeline.len(),
        snapshot.reports.len()
    );

    let state = AppState {
        snapshot: Arc::new(snapshot),
        reference_date: config.reference_date,
    };

    let listener = tokio::net::TcpListener::bind(config.server_addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", config.server_addr))?;

    println!("\n🚀 Server running on http://{}", config.server_addr);
    println!("   API:       http://{}/api/health", config.server_addr);
    println!("   Dashboard: http://{}/api/dashboard", config.server_addr);
    println!("\nPress Ctrl+C to stop");
    info!(addr = %config.server_addr, "listening");

    axum::serve(listener, app(state)).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use fraud_investigation::SampleData;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(AppState {
            snapshot: Arc::new(SampleData::snapshot().unwrap()),
            reference_date: None,
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_accounts_filters() {
        let (_, body) = get_json("/api/accounts?risk=high").await;
        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["ACC-7821", "ACC-3456"]);

        let (_, body) = get_json("/api/accounts?q=acc-90").await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        // Unknown risk value falls back to every account
        let (_, body) = get_json("/api/accounts?risk=critical").await;
        assert_eq!(body["data"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_graph_scene() {
        let (status, body) = get_json("/api/graph?selected=A004").await;
        assert_eq!(status, StatusCode::OK);
        let nodes = body["data"]["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 8);
        let selected: Vec<&Value> = nodes.iter().filter(|n| n["selected"] == true).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["id"], "A004");
        assert_eq!(body["data"]["skipped_edges"], 0);
    }

    #[tokio::test]
    async fn test_node_detail_and_not_found() {
        let (status, body) = get_json("/api/graph/nodes/A001").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["node"]["id"], "A001");
        assert!(body["data"]["degree"]["out_degree"].as_u64().unwrap() > 0);

        let (status, body) = get_json("/api/graph/nodes/ACC-7821").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Node not found: ACC-7821");
    }

    #[tokio::test]
    async fn test_timeline_clamps_and_filters() {
        let (_, body) = get_json("/api/timeline?index=99").await;
        assert_eq!(body["data"]["current_index"], 9);
        assert_eq!(body["data"]["events"].as_array().unwrap().len(), 10);

        let (_, body) = get_json("/api/timeline?risk=high&index=3").await;
        let events = body["data"]["events"].as_array().unwrap();
        assert_eq!(events.len(), 5);
        let highlighted = events.iter().filter(|e| e["highlighted"] == true).count();
        assert_eq!(highlighted, 2);

        let (_, body) = get_json("/api/timeline?index=-4").await;
        assert_eq!(body["data"]["current_index"], 0);
    }

    #[tokio::test]
    async fn test_reports_type_filter() {
        let (_, body) = get_json("/api/reports?type=investigation").await;
        assert_eq!(body["data"]["type_filter"], "Investigation");
        assert_eq!(body["data"]["reports"].as_array().unwrap().len(), 2);

        let (_, body) = get_json("/api/reports?type=everything&range=all").await;
        assert_eq!(body["data"]["type_filter"], "All Types");
        assert_eq!(body["data"]["range"], "All time");
        assert_eq!(body["data"]["reports"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_dashboard() {
        let (status, body) = get_json("/api/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["metrics"]["high_risk_accounts"], 2);
        assert_eq!(body["data"]["top_accounts"][0]["id"], "ACC-7821");
        assert_eq!(body["data"]["recent_alerts"][0]["id"], "E010");
    }
}
