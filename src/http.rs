use std::time::Duration;

use reqwest::{Client, ClientBuilder, Response};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

/// Transport configuration shared by the scan, history, and report clients.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Timeout for HTTP requests
    pub request_timeout: Duration,
    /// Maximum number of redirects to follow
    pub max_redirects: usize,
    /// User agent string to use
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_redirects: 5,
            user_agent: format!("DFShield-Client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build the shared reqwest client. No retries and no per-call timeout are
/// layered on top; the transport timeout here is the only one.
pub fn build_client(config: &HttpConfig) -> ApiResult<Client> {
    let client = ClientBuilder::new()
        .timeout(config.request_timeout)
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .user_agent(&config.user_agent)
        .build()
        .map_err(ApiError::HttpClient)?;

    Ok(client)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Turn a non-2xx response into a `Transport` error carrying the backend's
/// own text. The backends in this family answer failures with either plain
/// text or JSON `{"error": ...}`; an empty body falls back to the status line.
pub async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
        parsed.error
    } else {
        body
    };

    ApiError::transport(Some(status.as_u16()), message)
}

/// Map a send-level failure (connect, timeout, DNS) into the transport kind.
pub fn transport_failure(err: reqwest::Error) -> ApiError {
    ApiError::transport(err.status().map(|s| s.as_u16()), err.to_string())
}
