//! # voca-server
//!
//! HTTP API over the forge workflows:
//!
//! - `POST /api/skills/generate` and `GET /api/skills/{word}`
//! - `POST /api/translation/question` and `POST /api/translation/evaluate`
//! - `GET /health` and a Prometheus `GET /metrics`

pub mod metrics;

use axum::{
    Router,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use voca_config::ServerConfig;
use voca_core::{SkillOrigin, SkillResult, VocaError};
use voca_forge::{
    CreateQuestionRequest, CreateQuestionResponse, EvaluateRequest, EvaluateResponse, Forge,
};
use voca_store::SkillStore;

/// Shared server state.
pub struct AppState {
    pub config: ServerConfig,
    pub forge: Forge,
    pub metrics: metrics::Metrics,
}

impl AppState {
    pub fn new(config: ServerConfig, forge: Forge) -> Self {
        Self {
            config,
            forge,
            metrics: metrics::Metrics::new(),
        }
    }

    fn store(&self) -> &SkillStore {
        self.forge.skills.store()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateSkillRequest {
    word: String,
    meaning_ko: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: String,
    uptime_secs: u64,
    /// Stored skill count; absent when the store cannot be read.
    skills: Option<usize>,
}

/// An error rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message,
        }
    }
}

impl From<VocaError> for ApiError {
    fn from(e: VocaError) -> Self {
        let status = match &e {
            VocaError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            VocaError::LlmProvider(_)
            | VocaError::MalformedOutput(_)
            | VocaError::ImageApi { .. }
            | VocaError::ImageProvider(_)
            | VocaError::MaxRetriesExceeded { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

/// Build the Axum router.
pub fn build_router(config: ServerConfig, forge: Forge) -> Router {
    let cors = config.cors;
    let state = Arc::new(AppState::new(config, forge));

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/skills/generate", post(generate_skill_handler))
        .route("/api/skills/{word}", get(get_skill_handler))
        .route("/api/translation/question", post(question_handler))
        .route("/api/translation/evaluate", post(evaluate_handler))
        .layer(middleware::from_fn_with_state(state.clone(), count_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}

/// Counts every request, and every 4xx/5xx response, including extractor
/// rejections that never reach a handler.
async fn count_requests(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    state.metrics.inc_http_requests();
    let resp = next.run(req).await;
    if resp.status().is_client_error() || resp.status().is_server_error() {
        state.metrics.inc_http_errors();
    }
    resp
}

fn require_non_blank(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(VocaError::InvalidRequest(format!("{field} must not be blank")).into());
    }
    Ok(())
}

async fn generate_skill_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateSkillRequest>,
) -> Result<Json<SkillResult>, ApiError> {
    require_non_blank("word", &req.word)?;
    require_non_blank("meaningKo", &req.meaning_ko)?;

    match state.forge.skills.generate_skill(&req.word, &req.meaning_ko).await {
        Ok(result) => {
            state.metrics.record_skill(&result);
            Ok(Json(result))
        }
        Err(e) => {
            error!(word = %req.word, error = %e, "skill generation failed");
            Err(e.into())
        }
    }
}

async fn get_skill_handler(
    State(state): State<Arc<AppState>>,
    Path(word): Path<String>,
) -> Result<Json<SkillResult>, ApiError> {
    match state.store().find_by_word(&word)? {
        Some(skill) => Ok(Json(SkillResult::from_stored(skill, SkillOrigin::Cached))),
        None => Err(ApiError::not_found(format!("no skill stored for word '{word}'"))),
    }
}

async fn question_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateQuestionRequest>,
) -> Json<CreateQuestionResponse> {
    state.metrics.inc_translation_questions();
    let resp = state.forge.translation.create_question(&req).await;
    if !resp.success {
        state.metrics.inc_translation_failures();
    }
    Json(resp)
}

async fn evaluate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> Json<EvaluateResponse> {
    state.metrics.inc_translation_evaluations();
    let resp = state.forge.translation.evaluate(&req).await;
    if !resp.success {
        state.metrics.inc_translation_failures();
    }
    Json(resp)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, skills) = match state.store().count() {
        Ok(n) => ("ok", Some(n)),
        Err(e) => {
            warn!(error = %e, "health check could not read the store");
            ("degraded", None)
        }
    };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_secs: state.metrics.uptime_secs(),
        skills,
    })
}

/// Prometheus-compatible metrics endpoint.
async fn metrics_handler(
    State(state): State<Arc<AppState>>,
) -> (
    StatusCode,
    [(axum::http::header::HeaderName, &'static str); 1],
    String,
) {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.metrics.render_prometheus(),
    )
}

/// Bind `config.listen` and serve until Ctrl-C.
pub async fn start_server(config: ServerConfig, forge: Forge) -> voca_core::Result<()> {
    let listen = config.listen.clone();
    let router = build_router(config, forge);

    info!(listen = %listen, "starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .map_err(|e| VocaError::Config(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
