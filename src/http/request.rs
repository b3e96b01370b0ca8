//! Request identification and forwarding-copy hygiene.
//!
//! # Responsibilities
//! - Stamp every inbound request with an `x-request-id` (UUID v4)
//! - Build the header set for outbound copies: end-to-end headers only
//! - Strip hop-by-hop headers from upstream responses
//!
//! # Design Decisions
//! - The request ID is added as early as possible and propagated verbatim
//! - Hop-by-hop headers (RFC 9110 §7.6.1) and anything nominated by the
//!   `Connection` header never cross the proxy in either direction
//! - `Host` is dropped from outbound copies; the client derives it from
//!   the target authority

use std::collections::HashSet;
use std::task::{Context, Poll};

use axum::http::header::{HeaderMap, HeaderValue, CONNECTION};
use axum::http::Request;
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Hop-by-hop headers, never forwarded in either direction.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Headers nominated as hop-by-hop by the `Connection` header value.
fn connection_nominated(headers: &HeaderMap) -> HashSet<String> {
    headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Copy the end-to-end headers of an inbound request into an outbound copy.
pub fn copy_forwarding_headers(src: &HeaderMap, dst: &mut HeaderMap) {
    let nominated = connection_nominated(src);
    for (name, value) in src.iter() {
        let name_str = name.as_str();
        if name_str == "host" || HOP_BY_HOP.contains(&name_str) || nominated.contains(name_str) {
            continue;
        }
        dst.append(name.clone(), value.clone());
    }
}

/// Remove hop-by-hop headers in place (used on upstream responses before
/// they are handed back to the original caller).
pub fn strip_hop_by_hop_headers(headers: &mut HeaderMap) {
    let nominated = connection_nominated(headers);
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    for name in nominated {
        headers.remove(name.as_str());
    }
}

/// Request ID stamped by [`RequestIdLayer`], for log correlation.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Tower layer that stamps `x-request-id` on requests that lack one.
#[derive(Debug, Clone, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if !request.headers().contains_key(X_REQUEST_ID) {
            let id = Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&id) {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(request)
    }
}
