use std::path::PathBuf;

use serde::Deserialize;
use url::Url;

use crate::error::{ApiError, ApiResult};

fn default_request_timeout() -> f64 {
    30.0
}

/// Upper bound on the configured request timeout. Values past this (or
/// non-finite ones) would panic inside `Duration::from_secs_f64`.
const MAX_REQUEST_TIMEOUT_SECONDS: f64 = 3600.0;

fn default_user_agent() -> String {
    format!("DFShield-Client/{}", env!("CARGO_PKG_VERSION"))
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_anonymous_scan_limit() -> u32 {
    3
}

/// Client configuration. The base URL of the detection backend is the only
/// required value; different deployment targets point it at localhost, a LAN
/// IP, or a hosted instance.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: f64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Scans an unauthenticated user may perform before sign-in is required.
    #[serde(default = "default_anonymous_scan_limit")]
    pub anonymous_scan_limit: u32,

    /// Where the anonymous scan counter is persisted. When unset the counter
    /// lives in memory only and does not survive a restart.
    #[serde(default)]
    pub quota_file: Option<PathBuf>,

    /// Display cutoff for UIs that want to flag low-confidence verdicts.
    /// The backend's own threshold always travels with each result; this is
    /// never used to re-derive decisions and has no built-in default.
    #[serde(default)]
    pub display_threshold: Option<f64>,
}

impl Settings {
    /// Load configuration from an optional `dfshield.toml` file and
    /// `DFSHIELD_*` environment variables, environment taking precedence.
    pub fn new() -> ApiResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("dfshield").required(false))
            .add_source(config::Environment::with_prefix("DFSHIELD"))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Build settings directly from a base URL, with defaults for the rest.
    pub fn with_base_url<T: Into<String>>(api_base_url: T) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            request_timeout_seconds: default_request_timeout(),
            user_agent: default_user_agent(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            anonymous_scan_limit: default_anonymous_scan_limit(),
            quota_file: None,
            display_threshold: None,
        }
    }

    pub fn validate(&self) -> ApiResult<()> {
        self.base_url()?;

        if !self.request_timeout_seconds.is_finite()
            || self.request_timeout_seconds <= 0.0
            || self.request_timeout_seconds > MAX_REQUEST_TIMEOUT_SECONDS
        {
            return Err(ApiError::configuration(format!(
                "request_timeout_seconds must be a positive number of seconds, at most {}",
                MAX_REQUEST_TIMEOUT_SECONDS
            )));
        }

        if self.anonymous_scan_limit == 0 {
            return Err(ApiError::configuration(
                "anonymous_scan_limit must be at least 1",
            ));
        }

        if let Some(threshold) = self.display_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ApiError::configuration(
                    "display_threshold must be within [0, 1]",
                ));
            }
        }

        Ok(())
    }

    pub fn base_url(&self) -> ApiResult<Url> {
        Url::parse(&self.api_base_url).map_err(|e| {
            ApiError::configuration(format!(
                "invalid api_base_url '{}': {}",
                self.api_base_url, e
            ))
        })
    }
}
