use reqwest::Client;
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::http::{error_from_response, transport_failure};
use crate::models::HistoryEntry;
use crate::normalize::{self, RawScanRecord};

/// Fetches a user's past scans from `POST /history` and normalizes the
/// heterogeneous record shapes into `HistoryEntry`. Each call re-fetches;
/// the backend bounds the list size on its side.
#[derive(Debug, Clone)]
pub struct HistoryClient {
    client: Client,
    base_url: Url,
}

impl HistoryClient {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// List past scans for `user_id`, newest first. Individually malformed
    /// records are skipped and logged; a transport failure yields no partial
    /// results.
    pub async fn list(&self, user_id: &str) -> ApiResult<Vec<HistoryEntry>> {
        if user_id.trim().is_empty() {
            return Err(ApiError::validation("userId is required"));
        }

        let url = self
            .base_url
            .join("history")
            .map_err(|e| ApiError::configuration(format!("invalid history URL: {}", e)))?;

        tracing::debug!(user_id = %user_id, "fetching scan history");

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "userId": user_id }))
            .send()
            .await
            .map_err(transport_failure)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let raw_records: Vec<RawScanRecord> = response
            .json()
            .await
            .map_err(|e| ApiError::malformed(format!("unreadable history response: {}", e)))?;

        let total = raw_records.len();
        let mut keyed: Vec<(Option<i64>, HistoryEntry)> = Vec::with_capacity(total);
        for raw in &raw_records {
            match normalize::history_entry(raw) {
                Some(entry) => keyed.push((normalize::timestamp_sort_key(raw), entry)),
                None => {
                    tracing::warn!(
                        filename = raw.filename.as_deref().unwrap_or(""),
                        "skipping malformed history record"
                    );
                }
            }
        }

        // Newest first regardless of backend order; unorderable timestamps last.
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        let entries: Vec<HistoryEntry> = keyed.into_iter().map(|(_, entry)| entry).collect();
        tracing::debug!(
            user_id = %user_id,
            records = total,
            kept = entries.len(),
            "history fetched"
        );

        Ok(entries)
    }
}
