//! Request ID middleware for request tracing and correlation.
//!
//! Uses, in order: an upstream `x-request-id`, Shopify's
//! `x-shopify-webhook-id` (stable across redeliveries of one event), or a
//! fresh UUID v4. The ID is recorded in the tracing span, tagged on the
//! Sentry scope, and echoed in the response headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shopify's per-event delivery identifier.
pub const SHOPIFY_WEBHOOK_ID_HEADER: &str = "x-shopify-webhook-id";

/// Middleware that ensures every request carries a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = [REQUEST_ID_HEADER, SHOPIFY_WEBHOOK_ID_HEADER]
        .iter()
        .find_map(|name| {
            request
                .headers()
                .get(*name)
                .and_then(|h| h.to_str().ok())
                .filter(|v| !v.is_empty())
        })
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::Request as HttpRequest, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    async fn request_id_for(request: HttpRequest<Body>) -> String {
        let response = app().oneshot(request).await.expect("response");
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("request id header")
            .to_string()
    }

    #[tokio::test]
    async fn test_propagates_upstream_request_id() {
        let request = HttpRequest::get("/")
            .header(REQUEST_ID_HEADER, "abc-123")
            .header(SHOPIFY_WEBHOOK_ID_HEADER, "shopify-1")
            .body(Body::empty())
            .expect("request");
        assert_eq!(request_id_for(request).await, "abc-123");
    }

    #[tokio::test]
    async fn test_falls_back_to_shopify_webhook_id() {
        let request = HttpRequest::get("/")
            .header(SHOPIFY_WEBHOOK_ID_HEADER, "shopify-1")
            .body(Body::empty())
            .expect("request");
        assert_eq!(request_id_for(request).await, "shopify-1");
    }

    #[tokio::test]
    async fn test_generates_uuid() {
        let request = HttpRequest::get("/").body(Body::empty()).expect("request");
        let id = request_id_for(request).await;
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
