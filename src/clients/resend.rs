//! Resend transactional email API.

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

use super::{join_url, UpstreamError};
use crate::domain::{OutgoingEmail, ProviderError, SentEmail};
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::make_http_client;

/// Anything that can deliver an [`OutgoingEmail`].
#[async_trait]
pub trait MailSender: Send + Sync + 'static {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, UpstreamError>;
}

#[derive(Clone)]
pub struct ResendRemote {
    base: String,
    api_key: String,
    http: Client,
}

impl ResendRemote {
    pub fn new(base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_timeout(
            base,
            api_key,
            Duration::from_secs(crate::infra::config::DEFAULT_UPSTREAM_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(base: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self { base: base.into(), api_key: api_key.into(), http: make_http_client(timeout) }
    }
}

#[async_trait]
impl MailSender for ResendRemote {
    /// `POST {base}/emails`; a non-2xx reply carries `{message, name, statusCode}`.
    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, UpstreamError> {
        let url = join_url(&self.base, "emails");
        tracing::debug!(endpoint = %url, to = %email.to, "resend request");
        let start = Instant::now();
        let (builder, _rid) = add_standard_headers(self.http.post(url), None);
        let resp = builder.bearer_auth(&self.api_key).json(email).send().await?;
        let status = resp.status();
        if !status.is_success() {
            crate::infra::logging::log_metric("send_email", "remote_error_total", 1.0);
            let body = resp.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ProviderError>(&body) {
                Ok(err) => {
                    tracing::warn!(name = ?err.name, status = status.as_u16(), "resend rejected email");
                    UpstreamError::Provider(err.message)
                }
                Err(_) => UpstreamError::Status { service: "Email", status: status.as_u16() },
            });
        }
        let sent = resp
            .json::<SentEmail>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;
        let elapsed_ms = start.elapsed().as_millis() as f64;
        crate::infra::logging::log_metric("send_email", "remote_latency_ms", elapsed_ms);
        Ok(sent)
    }
}
