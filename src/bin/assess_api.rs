//! assess_api: a minimal REST façade over the assessment orchestrator.
//!
//! Endpoints (JSON):
//! - GET  /v1/health                -> { status }
//! - POST /v1/assess                 AssessmentRequest -> AssessmentResult
//! - POST /v1/assess/batch           Vec<AssessmentRequest> -> Vec<BatchItemOutcome>
//! - POST /v1/assess/portfolio       Vec<AssessmentRequest> -> PortfolioResult
//! - GET  /v1/explain/:request_id    -> { explanation } (requires a configured store)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use assessor::config::{AssessmentConfig, EquivalentsConfig, ModelConfig};
use assessor::contracts::{TracingLogger, TracingMetrics};
use assessor::doubles::{
    InMemoryExplanationStore, StubEquivalentsModel, StubMoleculeValidator, StubNlpParser, StubPropertyPredictor,
    StubSmartsMatcher, StubStructureAnalyzer, TemplateExplanationGenerator,
};
use assessor::inference::LocalInferenceModel;
use assessor::{AssessError, AssessmentRequest, Assessor};

#[derive(Clone)]
struct AppState {
    assessor: Arc<Assessor>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

fn error_status(e: &AssessError) -> StatusCode {
    match e.kind() {
        "invalid_input" | "invalid_molecule" | "parsing_failed" | "invalid_config" => StatusCode::BAD_REQUEST,
        "not_found" => StatusCode::NOT_FOUND,
        "deadline_exceeded" => StatusCode::GATEWAY_TIMEOUT,
        "cancelled" => StatusCode::CONFLICT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: String,
}

async fn assess_one(State(state): State<AppState>, Json(request): Json<AssessmentRequest>) -> impl IntoResponse {
    match state.assessor.assess(request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => (
            error_status(&e),
            Json(ErrorBody {
                error: e.to_string(),
                kind: e.kind().to_string(),
            }),
        )
            .into_response(),
    }
}

async fn assess_batch(
    State(state): State<AppState>,
    Json(requests): Json<Vec<AssessmentRequest>>,
) -> impl IntoResponse {
    let outcomes = state.assessor.assess_batch(requests).await;
    (StatusCode::OK, Json(outcomes))
}

async fn assess_portfolio(
    State(state): State<AppState>,
    Json(requests): Json<Vec<AssessmentRequest>>,
) -> impl IntoResponse {
    let portfolio = state.assessor.assess_portfolio(requests).await;
    (StatusCode::OK, Json(portfolio))
}

async fn explain(State(state): State<AppState>, Path(request_id): Path<String>) -> impl IntoResponse {
    match state.assessor.explain(&request_id).await {
        Ok(explanation) => (StatusCode::OK, explanation).into_response(),
        Err(e) => (
            error_status(&e),
            Json(ErrorBody {
                error: e.to_string(),
                kind: e.kind().to_string(),
            }),
        )
            .into_response(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "assess_api=info,tower_http=info".into()))
        .with_target(false)
        .compact()
        .init();

    info!("starting assess_api server");

    let addr: SocketAddr = std::env::var("ASSESS_API_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

    let model_config = ModelConfig::default();
    let assessor = Assessor::new(
        Arc::new(StubNlpParser),
        Arc::new(StubStructureAnalyzer),
        Arc::new(LocalInferenceModel::new(
            Arc::new(StubMoleculeValidator),
            Arc::new(StubSmartsMatcher),
            Arc::new(StubPropertyPredictor),
            model_config.clone(),
        )),
        Arc::new(StubEquivalentsModel),
        Arc::new(TracingLogger),
        Arc::new(TracingMetrics),
        AssessmentConfig::default(),
        model_config,
        EquivalentsConfig::default(),
    )
    .with_store(Arc::new(InMemoryExplanationStore::default()))
    .with_explainer(Arc::new(TemplateExplanationGenerator));

    let state = AppState {
        assessor: Arc::new(assessor),
    };

    let app = Router::new()
        .route("/v1/health", get(health))
        .route("/v1/assess", post(assess_one))
        .route("/v1/assess/batch", post(assess_batch))
        .route("/v1/assess/portfolio", post(assess_portfolio))
        .route("/v1/explain/:request_id", get(explain))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    println!("assess_api listening on http://{addr}");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
