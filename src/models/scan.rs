use serde::{Deserialize, Serialize};

/// Normalized verdict of a scan. Backends emit `label`/`decision` strings in
/// varying case; the raw string `"unknown"` maps to `Uncertain`. Everything
/// else the crate touches sees only this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Fake,
    Real,
    Uncertain,
}

impl Decision {
    /// Parse a backend-supplied decision or label string. Case-insensitive;
    /// returns `None` for anything outside the contract.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "fake" => Some(Self::Fake),
            "real" => Some(Self::Real),
            "uncertain" | "unknown" => Some(Self::Uncertain),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fake => "fake",
            Self::Real => "real",
            Self::Uncertain => "uncertain",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one detection request. Created fresh per response, never
/// mutated. `confidence` and `threshold` are always within [0, 1]; the
/// normalization layer rejects anything else as a contract violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Backend's raw classification string, lowercased.
    pub raw_label: String,
    pub decision: Decision,
    pub confidence: f64,
    /// Backend-side cutoff, informational only. Absent when the deployment
    /// does not report one; never defaulted client-side.
    pub threshold: Option<f64>,
    /// Backend-supplied, or computed as `confidence >= threshold` when the
    /// threshold is known. `None` when neither is available.
    pub is_confident: Option<bool>,
    /// Opaque display string; not parsed beyond ordering in history.
    pub timestamp: Option<String>,
    pub filename: Option<String>,
}

/// One image queued for upload: the bytes plus the metadata the multipart
/// form needs.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

impl ImageFile {
    pub fn new<T: Into<Vec<u8>>>(bytes: T, filename: &str, content_type: &str) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
        }
    }

    pub fn jpeg<T: Into<Vec<u8>>>(bytes: T, filename: &str) -> Self {
        Self::new(bytes, filename, "image/jpeg")
    }

    /// Name used for the multipart `file` part. Mobile pickers sometimes
    /// yield URIs with no usable basename; fall back like the clients do.
    pub fn upload_name(&self) -> &str {
        if self.filename.trim().is_empty() {
            "image.jpg"
        } else {
            &self.filename
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_parse_is_case_insensitive() {
        assert_eq!(Decision::parse("FAKE"), Some(Decision::Fake));
        assert_eq!(Decision::parse("Real"), Some(Decision::Real));
        assert_eq!(Decision::parse(" uncertain "), Some(Decision::Uncertain));
    }

    #[test]
    fn test_unknown_label_maps_to_uncertain() {
        assert_eq!(Decision::parse("unknown"), Some(Decision::Uncertain));
    }

    #[test]
    fn test_unexpected_decision_rejected() {
        assert_eq!(Decision::parse("maybe"), None);
        assert_eq!(Decision::parse(""), None);
    }

    #[test]
    fn test_decision_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Decision::Fake).unwrap(), "\"fake\"");
        assert_eq!(Decision::Uncertain.to_string(), "uncertain");
    }

    #[test]
    fn test_empty_filename_falls_back() {
        let image = ImageFile::jpeg(vec![0xFF, 0xD8], "");
        assert_eq!(image.upload_name(), "image.jpg");

        let named = ImageFile::jpeg(vec![0xFF, 0xD8], "photo.jpg");
        assert_eq!(named.upload_name(), "photo.jpg");
    }
}
