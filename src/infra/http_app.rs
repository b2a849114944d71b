use axum::{
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{any_service, get, post_service},
    Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::infra::mcp::GatewaySvc;
use crate::infra::runtime::mcp_transport::{make_streamable_http_service, LocalSessionManager};

pub const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

pub const BANNER: &str = "office-mcp-gateway: MCP server exposing send_email, search_emails and create_appointment.\n\
Send MCP JSON-RPC requests with POST /mcp (Accept: application/json, text/event-stream).\n";

pub const USE_POST: &str = "Use POST /mcp for MCP requests.";

async fn banner() -> &'static str {
    BANNER
}

const ALLOW_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Cross-origin preflight: empty 204, any origin, any requested headers.
async fn preflight(headers: header::HeaderMap) -> impl IntoResponse {
    let allow_headers = headers
        .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"));
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS)),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, allow_headers),
        ],
    )
}

async fn use_post() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "POST")], USE_POST)
}

/// `/` banner, `/healthz`, and streamable MCP at `/mcp`.
///
/// Stateless mode (default) binds a fresh service per request and answers GET
/// on `/mcp` with 405. Stateful mode hands every method on `/mcp` to rmcp so
/// sessions can open SSE streams and be deleted.
pub fn build_app(svc: GatewaySvc, stateful: bool) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let mcp_service = make_streamable_http_service(move || svc.clone(), session_mgr, stateful);

    let mcp_route = if stateful {
        any_service(mcp_service)
    } else {
        post_service(mcp_service).get(use_post)
    };

    Router::new()
        .route("/", get(banner).options(preflight))
        .route("/healthz", get(|| async { "ok" }))
        .route("/mcp", mcp_route.options(preflight))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static("mcp-session-id"),
        ))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::{Config, FileConfig};
    use crate::infra::mcp::svc_from_config;
    use axum::body::{to_bytes, Body};
    use hyper::Request;
    use tower::ServiceExt;

    fn app(stateful: bool) -> Router {
        let cfg = Config::from_sources(FileConfig::default(), |_| None);
        build_app(svc_from_config(&cfg), stateful)
    }

    #[tokio::test]
    async fn root_serves_banner() {
        let resp = app(false)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), 1 << 16).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("POST /mcp"));
    }

    #[tokio::test]
    async fn options_is_empty_204_on_both_paths() {
        for path in ["/", "/mcp"] {
            let resp = app(false)
                .oneshot(Request::builder().method("OPTIONS").uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::NO_CONTENT, "path {path}");
            assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            let bytes = to_bytes(resp.into_body(), 1 << 16).await.unwrap();
            assert!(bytes.is_empty());
        }
    }

    #[tokio::test]
    async fn get_mcp_is_405_when_stateless() {
        let resp = app(false)
            .oneshot(Request::builder().uri("/mcp").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[header::ALLOW], "POST");
        let bytes = to_bytes(resp.into_body(), 1 << 16).await.unwrap();
        assert_eq!(&bytes[..], USE_POST.as_bytes());
    }

    #[tokio::test]
    async fn healthz_ok() {
        let resp = app(true)
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
