//! Report prompt template and its interpolation.

use crate::report::models::ReportRequest;

/// Fills the fixed report template with the request's fields, verbatim.
///
/// Values are substituted once by `format!`, so braces typed into a field are
/// never expanded.
pub fn build_report_prompt(request: &ReportRequest) -> String {
    format!(
        "You are an expert histopathologist. \
         Generate a comprehensive histopathology report with these sections:\n\
         Patient Information: {patient_info}\n\
         Specimen Details: {specimen}\n\
         Clinical History: {clinical_history}\n\
         Gross Description: {gross_description}\n\
         Microscopic Findings: {microscopic_findings}\n\
         \n\
         Report:\n\
         - Diagnosis:\n\
         - Commentary and Recommendations:\n",
        patient_info = request.patient_info,
        specimen = request.specimen,
        clinical_history = request.clinical_history,
        gross_description = request.gross_description,
        microscopic_findings = request.microscopic_findings,
    )
}
