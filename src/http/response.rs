//! Outcome rendering.
//!
//! # Responsibilities
//! - Pass the representative upstream response through verbatim
//! - Render job failures as a single gateway-class error response
//!
//! # Design Decisions
//! - Success keeps the chosen branch's status, headers and body untouched,
//!   apart from hop-by-hop headers which terminate at the proxy
//! - Failures carry the aggregate cause in the body; individual branch
//!   results are logged, never surfaced

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;

use crate::dispatch::DispatchError;
use crate::http::request::strip_hop_by_hop_headers;

/// Render the representative upstream response for the original caller.
pub fn success_response(upstream_response: hyper::Response<Incoming>) -> Response {
    let (mut parts, body) = upstream_response.into_parts();
    strip_hop_by_hop_headers(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

/// Render a failed fan-out job for the original caller.
pub fn failure_response(error: &DispatchError) -> Response {
    (error.client_status(), error.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn failure_body_names_the_cause() {
        let error = DispatchError::NoUpstreams;
        let response = failure_response(&error);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"no upstreams registered");
    }
}
