use crate::explanation::types::DiagnosisReport;

/// JSON formatter for diagnosis reports
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format report as pretty-printed JSON
    pub fn format(report: &DiagnosisReport) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(report)
    }

    /// Format report as compact JSON (no whitespace)
    pub fn format_compact(report: &DiagnosisReport) -> Result<String, serde_json::Error> {
        serde_json::to_string(report)
    }
}
