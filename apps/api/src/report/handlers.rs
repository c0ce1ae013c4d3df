//! Axum route handlers for the Report API.

use axum::{extract::State, Json};
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::report::models::{GeneratedReport, ReportRequest};
use crate::state::AppState;

/// POST /api/v1/reports
///
/// Generates a histopathology report from the five clinical fields.
/// 400 when a field is empty, 502 when the completion service fails.
pub async fn handle_generate_report(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<GeneratedReport>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("report", %request_id);

    let report = state
        .reports
        .generate(&request)
        .instrument(span)
        .await?;

    info!(%request_id, "Report returned via API");

    Ok(Json(GeneratedReport {
        request_id,
        report,
        model: state.reports.model().to_string(),
        generated_at: chrono::Utc::now(),
    }))
}
