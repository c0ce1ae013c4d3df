//! Report generation — validate, build the prompt, make one completion call.
//!
//! Every failure is returned as a `ReportError`; nothing here panics or retries.

use std::sync::Arc;

use tracing::{info, warn};

use crate::llm_client::prompts::REPORT_WRITER_SYSTEM;
use crate::llm_client::ChatCompletion;
use crate::report::models::{ReportError, ReportRequest, ReportResult};
use crate::report::prompts::build_report_prompt;

/// Turns a `ReportRequest` into report text through a chat-completion transport.
///
/// Holds no per-request state; share it across handlers behind an `Arc`.
#[derive(Clone)]
pub struct ReportRequestHandler {
    llm: Arc<dyn ChatCompletion>,
}

impl ReportRequestHandler {
    pub fn new(llm: Arc<dyn ChatCompletion>) -> Self {
        Self { llm }
    }

    /// Model identifier of the underlying transport.
    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Generates a report for one submission.
    ///
    /// Incomplete requests are rejected before any network call. The remote
    /// call is made exactly once; its content is returned trimmed.
    pub async fn generate(&self, request: &ReportRequest) -> ReportResult {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            info!("Rejecting report request: missing {:?}", missing);
            return Err(ReportError::Validation { missing });
        }

        let prompt = build_report_prompt(request);

        match self.llm.complete(REPORT_WRITER_SYSTEM, &prompt).await {
            Ok(content) => {
                let report = content.trim().to_string();
                info!("Report generated ({} chars)", report.len());
                Ok(report)
            }
            Err(e) => {
                warn!("Report generation failed: {e}");
                Err(ReportError::RemoteService(e.to_string()))
            }
        }
    }
}
