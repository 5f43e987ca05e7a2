//! Client SDK for the DeepFake Shield detection backend.
//!
//! Wraps the three endpoint contracts (`/scan`, `/history`, `/report`) behind
//! typed clients that normalize the backend's loosely-shaped responses into
//! strict models, plus the device-local quota guard that limits anonymous
//! usage. All inference, identity, and persistence stay on the backend side;
//! this crate owns only the wire contract and its error surface.

use std::sync::Arc;

use crate::{
    clients::{HistoryClient, ReportClient, ScanClient},
    config::Settings,
    error::{ApiError, ApiResult},
    http::HttpConfig,
    models::{HistoryEntry, ImageFile, ReportSubmission, ScanResult},
    quota::{AnonymousQuotaGuard, FileQuotaStore, MemoryQuotaStore, QuotaStore},
};

pub mod clients;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod quota;

/// Facade over the endpoint clients and the quota guard, built once from
/// `Settings` with a single shared HTTP client underneath.
#[derive(Debug)]
pub struct DetectionClient {
    settings: Arc<Settings>,
    scan_client: ScanClient,
    history_client: HistoryClient,
    report_client: ReportClient,
    quota: AnonymousQuotaGuard,
}

impl DetectionClient {
    /// Build from settings. The quota counter persists to
    /// `settings.quota_file` when configured, otherwise in memory only.
    pub fn new(settings: Settings) -> ApiResult<Self> {
        let store: Box<dyn QuotaStore> = match &settings.quota_file {
            Some(path) => Box::new(FileQuotaStore::new(path.clone())),
            None => Box::new(MemoryQuotaStore::new()),
        };
        Self::with_quota_store(settings, store)
    }

    /// Build with an injected quota store, for hosts that persist the
    /// counter through their own key-value mechanism.
    pub fn with_quota_store(settings: Settings, store: Box<dyn QuotaStore>) -> ApiResult<Self> {
        settings.validate()?;
        let base_url = settings.base_url()?;

        let http_config = HttpConfig {
            request_timeout: std::time::Duration::from_secs_f64(settings.request_timeout_seconds),
            user_agent: settings.user_agent.clone(),
            ..Default::default()
        };
        let client = http::build_client(&http_config)?;

        let quota = AnonymousQuotaGuard::new(store, settings.anonymous_scan_limit);

        Ok(Self {
            settings: Arc::new(settings),
            scan_client: ScanClient::new(client.clone(), base_url.clone()),
            history_client: HistoryClient::new(client.clone(), base_url.clone()),
            report_client: ReportClient::new(client, base_url),
            quota,
        })
    }

    /// Submit one image for detection. Anonymous calls (`user_id = None`)
    /// are gated by the quota first and consume one unit only after the scan
    /// succeeds, so a failed upload never burns the allowance.
    pub async fn scan(
        &self,
        image: &ImageFile,
        user_id: Option<&str>,
    ) -> ApiResult<ScanResult> {
        let gated = user_id.is_none() && self.quota.is_applicable();
        if gated && self.quota.remaining() == 0 {
            return Err(ApiError::quota_exceeded(0));
        }

        let result = self.scan_client.scan(image, user_id).await?;

        if gated {
            let decision = self.quota.check_and_consume();
            tracing::debug!(remaining = decision.remaining, "anonymous scan consumed");
        }

        Ok(result)
    }

    /// Fetch the user's past scans, newest first.
    pub async fn history(&self, user_id: &str) -> ApiResult<Vec<HistoryEntry>> {
        self.history_client.list(user_id).await
    }

    /// Submit one feedback report.
    pub async fn submit_report(&self, report: &ReportSubmission) -> ApiResult<()> {
        self.report_client.submit(report).await
    }

    /// Record a successful sign-in: quota enforcement stops applying for the
    /// rest of the session.
    pub fn sign_in(&self) {
        self.quota.reset();
    }

    /// Anonymous scans left before sign-in is required.
    pub fn anonymous_scans_remaining(&self) -> u32 {
        self.quota.remaining()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn quota(&self) -> &AnonymousQuotaGuard {
        &self.quota
    }
}
