//! Form handlers. The page itself is the error surface, so a rendered page is always 200.

pub mod page;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::report::models::{ReportError, ReportRequest};
use crate::state::AppState;
use page::{Outcome, ReportPage};

fn render_page(request: &ReportRequest, outcome: &Outcome) -> Response {
    match (ReportPage { request, outcome }).render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Template error: {e}")),
            )
                .into_response()
        }
    }
}

/// GET /
pub async fn handle_index() -> Response {
    render_page(&ReportRequest::default(), &Outcome::None)
}

/// POST /report
pub async fn handle_submit(
    State(state): State<AppState>,
    Form(request): Form<ReportRequest>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("report", %request_id);

    let outcome = match state.reports.generate(&request).instrument(span).await {
        Ok(report) => Outcome::Report(report),
        Err(e @ ReportError::Validation { .. }) => Outcome::Warning(e.to_string()),
        Err(e @ ReportError::RemoteService(_)) => Outcome::Error(e.to_string()),
    };

    render_page(&request, &outcome)
}
