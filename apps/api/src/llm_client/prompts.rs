// Shared system prompts for completion calls.

/// System message sent with every report generation request.
pub const REPORT_WRITER_SYSTEM: &str =
    "You are a histopathology report writing assistant. Use professional medical language.";
