//! Server-rendered report form.

use askama::Template;

use crate::report::models::ReportRequest;

/// What the page shows beneath the form after a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    None,
    Report(String),
    Warning(String),
    Error(String),
}

/// The form page, echoing the submitted values back into the inputs.
#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportPage<'a> {
    pub request: &'a ReportRequest,
    pub outcome: &'a Outcome,
}
