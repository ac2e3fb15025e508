//! HTTP server for the dashboard API and static assets.

use std::path::PathBuf;

use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::services::ServeDir;

use qos_protocol::{Toggle, TrafficKind};

use crate::backend::Backend;
use crate::DashboardError;

pub struct FileServer {
    bind_addr: String,
    backend: Backend,
    static_root: PathBuf,
}

impl FileServer {
    pub fn new(bind_addr: String, backend: Backend) -> Self {
        let static_root = backend.config().static_root();
        Self {
            bind_addr,
            backend,
            static_root,
        }
    }

    pub async fn run(self) -> Result<(), anyhow::Error> {
        let app = router(self.backend);
        let listener = tokio::net::TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(
            addr = %self.bind_addr,
            static_root = %self.static_root.display(),
            "Dashboard API listening"
        );
        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// All routes over `backend`. Static files are served from the configured
/// static directory under `/static`.
pub fn router(backend: Backend) -> Router {
    let static_service = ServeDir::new(backend.config().static_root());

    Router::new()
        .route("/", get(index))
        .route("/api/health", get(api_health))
        .route("/api/run/:script", post(api_run))
        .route("/api/video/start", post(api_video_start))
        .route("/api/video/stop", post(api_video_stop))
        .route("/api/download/start", post(api_download_start))
        .route("/api/download/stop", post(api_download_stop))
        .route("/api/logs/:channel", get(api_logs))
        .route("/api/qos-status", get(api_qos_status))
        .route("/api/traffic", get(api_traffic))
        .route("/api/decision-log", get(api_decision_log))
        .route("/api/state-flags", get(api_state_flags))
        .nest_service("/static", static_service)
        .with_state(backend)
}

fn error_response(status: StatusCode, error: &DashboardError) -> Response {
    (status, Json(serde_json::json!({"error": error.to_string()}))).into_response()
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "qos-dashboard",
        "version": env!("CARGO_PKG_VERSION"),
        "static": "/static",
        "endpoints": [
            "POST /api/run/{script}",
            "POST /api/video/start",
            "POST /api/video/stop",
            "POST /api/download/start",
            "POST /api/download/stop",
            "GET /api/logs/{channel}",
            "GET /api/qos-status",
            "GET /api/traffic",
            "GET /api/decision-log",
            "GET /api/state-flags"
        ]
    }))
}

async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true, "service": "qos-dashboard"}))
}

async fn api_run(State(backend): State<Backend>, AxumPath(script): AxumPath<String>) -> Response {
    match backend.run_script(&script).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::warn!(script = %script, error = %e, "Failed to start script");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

async fn toggle(backend: Backend, kind: TrafficKind, toggle: Toggle) -> Response {
    match backend.toggle_traffic(kind, toggle).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::warn!(kind = %kind, action = toggle.as_str(), error = %e, "Traffic toggle failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

async fn api_video_start(State(backend): State<Backend>) -> Response {
    toggle(backend, TrafficKind::Video, Toggle::Start).await
}

async fn api_video_stop(State(backend): State<Backend>) -> Response {
    toggle(backend, TrafficKind::Video, Toggle::Stop).await
}

async fn api_download_start(State(backend): State<Backend>) -> Response {
    toggle(backend, TrafficKind::Download, Toggle::Start).await
}

async fn api_download_stop(State(backend): State<Backend>) -> Response {
    toggle(backend, TrafficKind::Download, Toggle::Stop).await
}

async fn api_logs(State(backend): State<Backend>, AxumPath(channel): AxumPath<String>) -> impl IntoResponse {
    Json(backend.logs(&channel).await)
}

async fn api_qos_status(State(backend): State<Backend>) -> impl IntoResponse {
    Json(backend.qos_status().await)
}

async fn api_traffic(State(backend): State<Backend>) -> Response {
    match backend.traffic() {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read traffic CSV");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

async fn api_decision_log(State(backend): State<Backend>) -> Response {
    match backend.decision_log() {
        Ok(log) => (StatusCode::OK, Json(log)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read decision log");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

async fn api_state_flags(State(backend): State<Backend>) -> impl IntoResponse {
    Json(backend.flags().await)
}
