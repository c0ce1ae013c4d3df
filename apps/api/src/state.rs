use crate::config::Config;
use crate::report::generator::ReportRequestHandler;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub reports: ReportRequestHandler,
    /// Read-only after startup.
    pub config: Config,
}
