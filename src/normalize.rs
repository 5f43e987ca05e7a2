//! The single liberal-to-strict boundary. Backends in this family disagree on
//! field names (`label` vs `decision`), omit confidence on older records, and
//! emit timestamps as RFC 3339 strings, `"YYYY-MM-DD HH:MM:SS"` strings, or
//! numeric epochs. Everything tolerant lives here; the rest of the crate only
//! sees the strict model types.

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::{Decision, HistoryEntry, ScanResult};

/// Tolerant wire shape shared by `/scan` responses and `/history` records.
/// Field presence is treated as OR: liberal in what we accept.
#[derive(Debug, Clone, Deserialize)]
pub struct RawScanRecord {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub decision: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub is_confident: Option<bool>,
    /// String or numeric epoch depending on the backend deployment.
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
    #[serde(default)]
    pub filename: Option<String>,
}

fn in_unit_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Strict normalization for a live `/scan` response. Missing label/decision,
/// an unrecognized decision string, a missing confidence, or any value
/// outside [0, 1] is a contract violation and rejects the whole response.
pub fn scan_result(raw: RawScanRecord) -> ApiResult<ScanResult> {
    let decision_str = raw
        .decision
        .as_deref()
        .or(raw.label.as_deref())
        .ok_or_else(|| ApiError::malformed("response has neither 'label' nor 'decision'"))?;
    let decision = Decision::parse(decision_str)
        .ok_or_else(|| ApiError::malformed(format!("unexpected decision '{}'", decision_str)))?;

    let raw_label = raw
        .label
        .as_deref()
        .unwrap_or(decision_str)
        .trim()
        .to_lowercase();

    let confidence = raw
        .confidence
        .ok_or_else(|| ApiError::malformed("response is missing 'confidence'"))?;
    if !in_unit_range(confidence) {
        return Err(ApiError::malformed(format!(
            "confidence {} outside [0, 1]",
            confidence
        )));
    }

    if let Some(threshold) = raw.threshold {
        if !in_unit_range(threshold) {
            return Err(ApiError::malformed(format!(
                "threshold {} outside [0, 1]",
                threshold
            )));
        }
    }

    let is_confident = raw
        .is_confident
        .or_else(|| raw.threshold.map(|t| confidence >= t));

    Ok(ScanResult {
        raw_label,
        decision,
        confidence,
        threshold: raw.threshold,
        is_confident,
        timestamp: raw.timestamp.as_ref().map(display_timestamp),
        filename: raw.filename,
    })
}

/// Defensive normalization for one history record. Missing confidence or
/// threshold is tolerated as `None`; a record without a parseable decision or
/// with out-of-range numerics is unusable and yields `None` so the caller can
/// skip it without failing the whole list.
pub fn history_entry(raw: &RawScanRecord) -> Option<HistoryEntry> {
    let decision_str = raw.decision.as_deref().or(raw.label.as_deref())?;
    let decision = Decision::parse(decision_str)?;

    if raw.confidence.is_some_and(|c| !in_unit_range(c)) {
        return None;
    }
    if raw.threshold.is_some_and(|t| !in_unit_range(t)) {
        return None;
    }

    Some(HistoryEntry {
        filename: raw.filename.clone(),
        decision,
        confidence: raw.confidence,
        threshold: raw.threshold,
        timestamp: raw.timestamp.as_ref().map(display_timestamp),
    })
}

/// Millisecond-epoch ordering key for one record's timestamp. `None` when the
/// timestamp is absent or in no recognizable form; such records sort last.
pub fn timestamp_sort_key(raw: &RawScanRecord) -> Option<i64> {
    match raw.timestamp.as_ref()? {
        serde_json::Value::String(s) => parse_timestamp_string(s),
        serde_json::Value::Number(n) => n.as_f64().map(epoch_to_millis),
        _ => None,
    }
}

fn parse_timestamp_string(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    // The Flask backend formats Firestore timestamps this way.
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc().timestamp_millis());
    }

    s.parse::<f64>().ok().map(epoch_to_millis)
}

// Magnitude heuristic: anything past ~Nov 2286 in seconds is a millisecond epoch.
fn epoch_to_millis(value: f64) -> i64 {
    if value.abs() >= 1e12 {
        value as i64
    } else {
        (value * 1000.0) as i64
    }
}

fn display_timestamp(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n
            .as_f64()
            .and_then(|f| DateTime::from_timestamp_millis(epoch_to_millis(f)))
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}
