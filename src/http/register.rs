//! Registration boundary.
//!
//! # Responsibilities
//! - Parse and validate the registration payload
//! - Reject malformed registrations before they reach the registry
//! - Acknowledge with an empty success body
//!
//! # Design Decisions
//! - Malformed JSON is rejected by the extractor with a client error
//! - Callbacks must be absolute `http` URLs with a host; the outbound
//!   transport is plain HTTP, so `https` callbacks are refused here rather
//!   than failing later inside a fan-out job

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use url::Url;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::registry::Registration;

/// Payload an upstream sends on startup to receive forwarded traffic.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Logical name; registering the same name again replaces the callback.
    pub name: String,
    /// Callback URL forwarded requests will be issued against.
    pub callback: String,
}

/// `PUT /register`: insert or replace the callback for a name.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Response {
    let name = payload.name.trim();
    if name.is_empty() {
        return (StatusCode::BAD_REQUEST, "name must not be empty").into_response();
    }

    let callback = match parse_callback(&payload.callback) {
        Ok(url) => url,
        Err(reason) => return (StatusCode::BAD_REQUEST, reason).into_response(),
    };

    match state.registry.register(name, callback) {
        Registration::Replaced(old) => {
            tracing::info!(
                name,
                old = %old,
                new = %payload.callback,
                "Replaced upstream registration"
            );
            metrics::record_registration(true);
        }
        Registration::New => {
            tracing::info!(name, callback = %payload.callback, "Registered upstream");
            metrics::record_registration(false);
        }
    }

    StatusCode::OK.into_response()
}

/// A callback must be an absolute plain-HTTP URL with a host.
fn parse_callback(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid callback URL: {}", e))?;
    if url.scheme() != "http" {
        return Err(format!(
            "unsupported callback scheme \"{}\" (only http is forwarded)",
            url.scheme()
        ));
    }
    if url.host_str().is_none() {
        return Err("callback URL must include a host".to_string());
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_http_callbacks() {
        let url = parse_callback("http://somehost:1234").unwrap();
        assert_eq!(url.host_str(), Some("somehost"));
        assert_eq!(url.port(), Some(1234));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_callback("not a url").is_err());
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(parse_callback("https://h:1").is_err());
        assert!(parse_callback("ftp://h:1").is_err());
    }
}
