//! HTTP 路由

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::diagnostics::{DiagnosticReporter, DiagnosticResult};
use crate::view::DiagnosticsView;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub reporter: DiagnosticReporter,
    pub view: Arc<DiagnosticsView>,
    pub metrics: Option<PrometheusHandle>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(diagnostics_page))
        .route("/diagnostics", get(diagnostics_page))
        .route("/api/diagnostics", get(diagnostics_json))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// 诊断页面，失败也以页面内容呈现
async fn diagnostics_page(State(state): State<AppState>) -> Response {
    let result = state.reporter.run_diagnostics().await;

    match state.view.render(&result) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render diagnostics page");
            plain_text_report(&result)
        }
    }
}

/// 模板渲染失败时的纯文本结果，错误信息不经 HTML 解析
fn plain_text_report(result: &DiagnosticResult) -> Response {
    let body = format!(
        "Vault Integration Test\n\n{}",
        serde_json::to_string_pretty(result).unwrap_or_default()
    );
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

async fn diagnostics_json(State(state): State<AppState>) -> Json<DiagnosticResult> {
    Json(state.reporter.run_diagnostics().await)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}
