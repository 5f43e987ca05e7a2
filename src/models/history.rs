use serde::{Deserialize, Serialize};

use super::scan::Decision;

/// One past scan as reported by the backend's history store. Unlike a live
/// `ScanResult`, older records may predate confidence reporting, so
/// `confidence` is tolerated as absent rather than required. The `/history`
/// wire shape also never carries a separate raw label or an `is_confident`
/// flag (history rows persist only the final verdict), so those two live
/// result fields are deliberately not part of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub filename: Option<String>,
    pub decision: Decision,
    pub confidence: Option<f64>,
    pub threshold: Option<f64>,
    /// Display string as the backend sent it; ordering uses a coerced epoch
    /// key computed during normalization, not this field.
    pub timestamp: Option<String>,
}
