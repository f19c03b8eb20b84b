use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of the printer's hardware condition.
///
/// Produced fresh by every status inquiry and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterStatus {
    is_head_open: bool,
    is_paper_out: bool,
    is_paused: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
    queried_at: DateTime<Utc>,
}

impl PrinterStatus {
    pub fn new(is_head_open: bool, is_paper_out: bool, is_paused: bool) -> Self {
        Self {
            is_head_open,
            is_paper_out,
            is_paused,
            raw: None,
            queried_at: Utc::now(),
        }
    }

    /// Attach the raw response for diagnostics
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn is_head_open(&self) -> bool {
        self.is_head_open
    }

    pub fn is_paper_out(&self) -> bool {
        self.is_paper_out
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn queried_at(&self) -> DateTime<Utc> {
        self.queried_at
    }

    /// No error condition reported
    pub fn is_ready(&self) -> bool {
        !(self.is_head_open || self.is_paper_out || self.is_paused)
    }
}

/// Status together with the optional print head temperature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    #[serde(flatten)]
    pub status: PrinterStatus,
    pub temperature: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_only_when_all_flags_clear() {
        assert!(PrinterStatus::new(false, false, false).is_ready());
        assert!(!PrinterStatus::new(true, false, false).is_ready());
        assert!(!PrinterStatus::new(false, true, false).is_ready());
        assert!(!PrinterStatus::new(false, false, true).is_ready());
    }

    #[test]
    fn test_serializes_with_camel_case_flags() {
        let status = PrinterStatus::new(false, true, false);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["isPaperOut"], true);
        assert_eq!(json["isHeadOpen"], false);
        assert_eq!(json["isPaused"], false);
        assert!(json.get("raw").is_none());
    }

    #[test]
    fn test_report_flattens_status() {
        let report = StatusReport {
            status: PrinterStatus::new(true, false, false).with_raw("x"),
            temperature: Some("25".to_string()),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["isHeadOpen"], true);
        assert_eq!(json["temperature"], "25");
        assert_eq!(json["raw"], "x");
    }
}
