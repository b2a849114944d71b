//! Typed HTTP clients for the three upstreams.

pub mod appointment;
pub mod resend;
pub mod search;

use thiserror::Error;

/// Failure talking to an upstream. `Display` is what ends up in a tool's failure text.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} service responded with status {status}")]
    Status { service: &'static str, status: u16 },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response from upstream: {0}")]
    Decode(String),
    #[error("{0}")]
    Provider(String),
}

impl UpstreamError {
    /// Worth retrying on an idempotent request.
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Status { status, .. } => *status >= 500,
            UpstreamError::Transport(e) => e.is_connect() || e.is_timeout(),
            UpstreamError::Decode(_) | UpstreamError::Provider(_) => false,
        }
    }
}

/// `{base}/{path}` without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_service_and_code() {
        let e = UpstreamError::Status { service: "Search", status: 503 };
        assert_eq!(e.to_string(), "Search service responded with status 503");
        assert!(e.is_transient());
        assert!(!UpstreamError::Status { service: "Search", status: 404 }.is_transient());
    }

    #[test]
    fn joins_urls() {
        assert_eq!(join_url("http://x/", "/search"), "http://x/search");
        assert_eq!(join_url("http://x", "book"), "http://x/book");
    }
}
