use reqwest::Client;
use std::time::{Duration, Instant};

use super::{join_url, UpstreamError};
use crate::domain::SearchHit;
use crate::infra::config::SearchConfig;
use crate::infra::http::headers::{add_standard_headers, generate_request_id};
use crate::infra::runtime::limits::{make_http_client, retry_async};

#[derive(Clone)]
pub struct SearchRemote {
    base: String,
    http: Client,
    retries: u32,
}

impl SearchRemote {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            http: make_http_client(Duration::from_secs(crate::infra::config::DEFAULT_UPSTREAM_TIMEOUT_SECS)),
            retries: 0,
        }
    }

    /// `None` when no base URL is configured.
    pub fn from_config(cfg: &SearchConfig, timeout: Duration) -> Option<Self> {
        let base = cfg.base_url.clone()?;
        Some(Self { base, http: make_http_client(timeout), retries: cfg.retries })
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// `GET {base}/search?q=<query>`.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, UpstreamError> {
        let url = join_url(&self.base, "search");
        tracing::debug!(endpoint = %url, "search request");
        let req_id = generate_request_id();
        let start = Instant::now();
        let res = retry_async(self.retries, UpstreamError::is_transient, |_| {
            let (builder, _rid) =
                add_standard_headers(self.http.get(url.as_str()).query(&[("q", query)]), Some(req_id.clone()));
            fetch_hits(builder)
        })
        .await;
        if res.is_err() {
            crate::infra::logging::log_metric("search_emails", "remote_error_total", 1.0);
        }
        let hits = res?;
        let elapsed_ms = start.elapsed().as_millis() as f64;
        crate::infra::logging::log_metric("search_emails", "remote_latency_ms", elapsed_ms);
        Ok(hits)
    }
}

async fn fetch_hits(builder: reqwest::RequestBuilder) -> Result<Vec<SearchHit>, UpstreamError> {
    let resp = builder.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(UpstreamError::Status { service: "Search", status: status.as_u16() });
    }
    resp.json::<Vec<SearchHit>>()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}
