use reqwest::Client;
use std::time::{Duration, Instant};

use super::{join_url, UpstreamError};
use crate::domain::{Booking, BookingRequest};
use crate::infra::config::AppointmentConfig;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::make_http_client;

#[derive(Clone)]
pub struct AppointmentRemote {
    base: String,
    http: Client,
}

impl AppointmentRemote {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            http: make_http_client(Duration::from_secs(crate::infra::config::DEFAULT_UPSTREAM_TIMEOUT_SECS)),
        }
    }

    /// `None` when no base URL is configured.
    pub fn from_config(cfg: &AppointmentConfig, timeout: Duration) -> Option<Self> {
        let base = cfg.base_url.clone()?;
        Some(Self { base, http: make_http_client(timeout) })
    }

    /// `POST {base}/book`. Never retried: booking is not idempotent.
    pub async fn book(&self, req: &BookingRequest) -> Result<Booking, UpstreamError> {
        let url = join_url(&self.base, "book");
        tracing::debug!(endpoint = %url, date = %req.date, time = %req.time, "appointment request");
        let start = Instant::now();
        let (builder, rid) = add_standard_headers(self.http.post(url), None);
        let res = post_booking(builder.json(req)).await;
        match &res {
            Ok(_) => {
                let elapsed_ms = start.elapsed().as_millis() as f64;
                crate::infra::logging::log_metric("create_appointment", "remote_latency_ms", elapsed_ms);
            }
            Err(e) => {
                tracing::warn!(request_id = %rid, error = %e, "appointment request failed");
                crate::infra::logging::log_metric("create_appointment", "remote_error_total", 1.0);
            }
        }
        res
    }
}

async fn post_booking(builder: reqwest::RequestBuilder) -> Result<Booking, UpstreamError> {
    let resp = builder.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(UpstreamError::Status { service: "Appointment", status: status.as_u16() });
    }
    resp.json::<Booking>()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn request() -> BookingRequest {
        BookingRequest { doctor_id: "default-doc".into(), date: "2024-01-01".into(), time: "10:00".into() }
    }

    #[tokio::test]
    async fn it_posts_booking_json() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/book")
                .header("content-type", "application/json")
                .json_body_obj(&request());
            then.status(201).json_body(json!({"appointment_id":"apt-1","status":"confirmed"}));
        });

        let out = AppointmentRemote::new(server.base_url()).book(&request()).await.unwrap();
        m.assert();
        assert_eq!(out.appointment_id, json!("apt-1"));
        assert_eq!(out.status, json!("confirmed"));
    }

    #[tokio::test]
    async fn server_error_is_not_retried() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/book");
            then.status(503);
        });
        let err = AppointmentRemote::new(server.base_url()).book(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "Appointment service responded with status 503");
        m.assert_hits(1);
    }
}
