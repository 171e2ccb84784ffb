use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{analysis::AnalysisRun, app::AppState, localization, service::PlannedReport};

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateReportRequest {
    #[serde(default = "default_language")]
    language: String,
    #[serde(flatten)]
    run: AnalysisRun,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize)]
struct GenerateReportResponse {
    request_id: Uuid,
    language: String,
    #[serde(flatten)]
    report: PlannedReport,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub(crate) async fn generate(
    State(state): State<AppState>,
    Json(payload): Json<GenerateReportRequest>,
) -> impl IntoResponse {
    state.telemetry().record_report_request();

    if payload.run.comments.is_empty() {
        let body = Json(ErrorResponse {
            error: "comments array must include at least one comment".into(),
        });
        return (StatusCode::BAD_REQUEST, body).into_response();
    }
    if !localization::is_supported_language(&payload.language) {
        let body = Json(ErrorResponse {
            error: format!("unsupported output language: {}", payload.language),
        });
        return (StatusCode::BAD_REQUEST, body).into_response();
    }

    let request_id = Uuid::new_v4();
    let report = state.service().plan_report(&payload.language, &payload.run);
    info!(
        %request_id,
        language = %payload.language,
        comments = payload.run.comments.len(),
        errors = report.errors.len(),
        "report planned"
    );

    let body = Json(GenerateReportResponse {
        request_id,
        language: payload.language,
        report,
    });
    (StatusCode::OK, body).into_response()
}
