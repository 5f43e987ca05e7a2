use reqwest::multipart::{Form, Part};
use reqwest::Client;
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::http::{error_from_response, transport_failure};
use crate::models::ReportSubmission;

/// Submits user feedback to `POST /report`. The encoding is a hard branch on
/// whether an image is attached: multipart with the file, JSON without.
/// Exactly one attempt per call; a duplicate press is a UI concern.
#[derive(Debug, Clone)]
pub struct ReportClient {
    client: Client,
    base_url: Url,
}

impl ReportClient {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub async fn submit(&self, report: &ReportSubmission) -> ApiResult<()> {
        if report.note.trim().is_empty() {
            return Err(ApiError::validation("report note must not be empty"));
        }
        if report.user_id.trim().is_empty() {
            return Err(ApiError::validation("userId is required"));
        }

        let url = self
            .base_url
            .join("report")
            .map_err(|e| ApiError::configuration(format!("invalid report URL: {}", e)))?;

        tracing::debug!(
            user_id = %report.user_id,
            with_image = report.attached_image.is_some(),
            "submitting report"
        );

        let request = match &report.attached_image {
            Some(image) => {
                let file_part = Part::bytes(image.bytes.clone())
                    .file_name(image.upload_name().to_string())
                    .mime_str(&image.content_type)
                    .map_err(ApiError::HttpClient)?;

                let mut form = Form::new()
                    .part("file", file_part)
                    .text("userId", report.user_id.clone())
                    .text("note", report.note.clone());

                if let Some(filename) = &report.filename {
                    form = form.text("filename", filename.clone());
                }
                if let Some(decision) = report.decision {
                    form = form.text("decision", decision.as_str());
                }
                if let Some(confidence) = report.confidence {
                    form = form.text("confidence", confidence.to_string());
                }
                if let Some(threshold) = report.threshold {
                    form = form.text("threshold", threshold.to_string());
                }

                self.client.post(url).multipart(form)
            }
            None => self.client.post(url).json(report),
        };

        let response = request.send().await.map_err(transport_failure)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        // Acknowledgement body is not load-bearing
        Ok(())
    }
}
