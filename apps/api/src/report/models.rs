use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The five free-text clinical inputs of a single submission.
///
/// Missing fields deserialize as empty strings so that an incomplete form
/// is rejected by validation, not by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    pub patient_info: String,
    pub specimen: String,
    pub clinical_history: String,
    pub gross_description: String,
    pub microscopic_findings: String,
}

impl ReportRequest {
    pub fn new(
        patient_info: impl Into<String>,
        specimen: impl Into<String>,
        clinical_history: impl Into<String>,
        gross_description: impl Into<String>,
        microscopic_findings: impl Into<String>,
    ) -> Self {
        Self {
            patient_info: patient_info.into(),
            specimen: specimen.into(),
            clinical_history: clinical_history.into(),
            gross_description: gross_description.into(),
            microscopic_findings: microscopic_findings.into(),
        }
    }

    /// Field labels paired with their values, in form order.
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("Patient Information", self.patient_info.as_str()),
            ("Specimen Details", self.specimen.as_str()),
            ("Clinical History", self.clinical_history.as_str()),
            ("Gross Description", self.gross_description.as_str()),
            ("Microscopic Findings", self.microscopic_findings.as_str()),
        ]
    }

    /// Labels of fields that are empty or whitespace-only.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| label)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error("Please fill in all fields before generating the report. Missing: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    #[error("API Error: {0}")]
    RemoteService(String),
}

/// Outcome of one submission: the trimmed report text or the reason it failed.
pub type ReportResult = Result<String, ReportError>;

/// JSON body returned by the report API on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedReport {
    pub request_id: Uuid,
    pub report: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}
