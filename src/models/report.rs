use serde::Serialize;

use super::scan::{Decision, ImageFile, ScanResult};

/// User-initiated feedback, optionally tied to one prior scan. Constructed
/// client-side and sent exactly once; a failed submit is surfaced to the user
/// rather than retried.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSubmission {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Presence selects the multipart encoding; absence selects JSON.
    #[serde(skip)]
    pub attached_image: Option<ImageFile>,
}

impl ReportSubmission {
    pub fn new<T: Into<String>, U: Into<String>>(user_id: T, note: U) -> Self {
        Self {
            user_id: user_id.into(),
            note: note.into(),
            filename: None,
            decision: None,
            confidence: None,
            threshold: None,
            attached_image: None,
        }
    }

    /// Carry the verdict fields over from the scan being reported, the way
    /// every report screen in this family pre-fills them.
    pub fn from_scan<T: Into<String>, U: Into<String>>(
        user_id: T,
        note: U,
        scan: &ScanResult,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            note: note.into(),
            filename: scan.filename.clone(),
            decision: Some(scan.decision),
            confidence: Some(scan.confidence),
            threshold: scan.threshold,
            attached_image: None,
        }
    }

    pub fn with_image(mut self, image: ImageFile) -> Self {
        self.attached_image = Some(image);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scan() -> ScanResult {
        ScanResult {
            raw_label: "fake".to_string(),
            decision: Decision::Fake,
            confidence: 0.92,
            threshold: Some(0.8),
            is_confident: Some(true),
            timestamp: None,
            filename: Some("a.jpg".to_string()),
        }
    }

    #[test]
    fn test_from_scan_carries_verdict_fields() {
        let report = ReportSubmission::from_scan("u1", "looks wrong", &sample_scan());
        assert_eq!(report.decision, Some(Decision::Fake));
        assert_eq!(report.confidence, Some(0.92));
        assert_eq!(report.threshold, Some(0.8));
        assert_eq!(report.filename.as_deref(), Some("a.jpg"));
    }

    #[test]
    fn test_json_body_omits_absent_fields() {
        let report = ReportSubmission::new("u1", "note text");
        let body = serde_json::to_value(&report).unwrap();
        assert_eq!(body["userId"], "u1");
        assert_eq!(body["note"], "note text");
        assert!(body.get("decision").is_none());
        assert!(body.get("confidence").is_none());
        assert!(body.get("filename").is_none());
    }
}
