use reqwest::multipart::{Form, Part};
use reqwest::Client;
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::http::{error_from_response, transport_failure};
use crate::models::{ImageFile, ScanResult};
use crate::normalize::{self, RawScanRecord};

/// Submits one image to `POST /scan` and normalizes the response. Performs
/// exactly one outbound request per call; retries are a caller policy, and
/// the anonymous quota is enforced above this layer.
#[derive(Debug, Clone)]
pub struct ScanClient {
    client: Client,
    base_url: Url,
}

impl ScanClient {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Upload `image` for detection. `user_id` is `None` for anonymous
    /// callers, in which case the backend receives no `userId` field and
    /// writes no history record.
    pub async fn scan(&self, image: &ImageFile, user_id: Option<&str>) -> ApiResult<ScanResult> {
        if image.bytes.is_empty() {
            return Err(ApiError::validation("no image supplied"));
        }
        if !image.content_type.starts_with("image/") {
            return Err(ApiError::validation(format!(
                "unsupported content type '{}'",
                image.content_type
            )));
        }

        let url = self
            .base_url
            .join("scan")
            .map_err(|e| ApiError::configuration(format!("invalid scan URL: {}", e)))?;

        let file_part = Part::bytes(image.bytes.clone())
            .file_name(image.upload_name().to_string())
            .mime_str(&image.content_type)
            .map_err(ApiError::HttpClient)?;

        let mut form = Form::new().part("file", file_part);
        if let Some(user_id) = user_id {
            form = form.text("userId", user_id.to_string());
        }

        tracing::debug!(
            filename = %image.upload_name(),
            bytes = image.bytes.len(),
            anonymous = user_id.is_none(),
            "uploading image for scan"
        );

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_failure)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let raw: RawScanRecord = response
            .json()
            .await
            .map_err(|e| ApiError::malformed(format!("unreadable scan response: {}", e)))?;

        let mut result = normalize::scan_result(raw)?;
        if result.filename.is_none() {
            result.filename = Some(image.upload_name().to_string());
        }

        tracing::debug!(
            decision = %result.decision,
            confidence = result.confidence,
            "scan completed"
        );

        Ok(result)
    }
}
