//! Request tracing, HTTP metrics and response hardening.
//!
//! [`logging_middleware`] sits outermost. It opens the `request` span and
//! hands it to inner layers through [`RequestSpan`] so the auth middleware can
//! attach the caller's id regardless of which span is current at that point.
//! Error responses carry their envelope code in [`ErrorCode`] so the request
//! can be labelled by outcome without parsing the body.

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, Span, info, info_span, warn};
use uuid::Uuid;

use super::AppState;
use super::auth::AuthUser;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Span of the request being served.
#[derive(Debug, Clone)]
pub struct RequestSpan(pub Span);

/// Envelope code of an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.prometheus_handle {
        Some(handle) => (
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            handle.render(),
        )
            .into_response(),
        None => "# metrics are disabled\n".into_response(),
    }
}

/// Keeps a caller-supplied request id when it is a short printable token,
/// otherwise mints one.
fn request_id(headers: &HeaderMap) -> HeaderValue {
    headers
        .get(&REQUEST_ID)
        .filter(|v| {
            let bytes = v.as_bytes();
            !bytes.is_empty() && bytes.len() <= 128 && bytes.iter().all(u8::is_ascii_graphic)
        })
        .cloned()
        .or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok())
        .unwrap_or_else(|| HeaderValue::from_static("unknown"))
}

pub async fn logging_middleware(mut req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = request_id(req.headers());
    let method = req.method().clone();

    // Unmatched paths share one label.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = request_id.to_str().unwrap_or_default(),
        method = %method,
        route = %route,
        user_id = tracing::field::Empty,
    );
    req.extensions_mut().insert(RequestSpan(span.clone()));

    async move {
        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status();
        let code = response
            .extensions()
            .get::<ErrorCode>()
            .map_or("ok", |c| c.0);
        let user_id = response.extensions().get::<AuthUser>().map(|u| u.0);

        metrics::counter!(
            "watch_http_requests_total",
            "method" => method.to_string(),
            "route" => route.clone(),
            "status" => status.as_u16().to_string(),
            "code" => code,
            "authenticated" => if user_id.is_some() { "true" } else { "false" },
        )
        .increment(1);
        metrics::histogram!(
            "watch_http_request_duration_seconds",
            "method" => method.to_string(),
            "route" => route,
        )
        .record(elapsed.as_secs_f64());

        response.headers_mut().insert(REQUEST_ID, request_id);

        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if status.is_server_error() {
            warn!(status = status.as_u16(), code, elapsed_ms, "Request failed");
        } else {
            info!(status = status.as_u16(), code, elapsed_ms, "Request served");
        }

        response
    }
    .instrument(span)
    .await
}

/// Headers set on every response unless the handler chose its own.
const HARDENING_HEADERS: [(HeaderName, &str); 4] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::CACHE_CONTROL, "no-store"),
    (header::REFERRER_POLICY, "no-referrer"),
];

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in HARDENING_HEADERS {
        headers
            .entry(name)
            .or_insert_with(|| HeaderValue::from_static(value));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, http::StatusCode, middleware, routing::get};
    use tower::ServiceExt;
    use tower_http::trace::TraceLayer;

    fn app() -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(RequestSpan(span)): Extension<RequestSpan>| async move {
                    span.record("user_id", 7);
                    if span.has_field("user_id") {
                        StatusCode::NO_CONTENT
                    } else {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                }),
            )
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(logging_middleware))
    }

    #[tokio::test]
    async fn test_request_span_reaches_inner_layers() {
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::fmt().with_test_writer().finish(),
        );

        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().contains_key(&REQUEST_ID));
    }

    #[test]
    fn test_request_id_is_kept_or_minted() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");

        headers.insert(REQUEST_ID, HeaderValue::from_static("has space"));
        let minted = request_id(&headers);
        assert_ne!(minted, "has space");
        assert!(Uuid::parse_str(minted.to_str().unwrap()).is_ok());

        let minted = request_id(&HeaderMap::new());
        assert!(Uuid::parse_str(minted.to_str().unwrap()).is_ok());
    }
}
