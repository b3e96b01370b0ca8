//! Fan-out dispatch engine.
//!
//! # Responsibilities
//! - Copy the inbound request once per upstream in the snapshot
//! - Issue every copy concurrently with connect/read deadlines
//! - Drain completions in real-time order and apply the completion policy
//! - Abort in-flight branches the moment the job reaches a terminal outcome

use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::Request;
use hyper::body::Incoming;
use hyper::Response;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tokio::task::JoinSet;
use tokio::time;

use crate::config::TimeoutConfig;
use crate::dispatch::outcome::{CallOutcome, DispatchError, UpstreamCallResult};
use crate::dispatch::policy::{RequireAll, Verdict};
use crate::http::request::copy_forwarding_headers;
use crate::registry::Upstream;

/// Issues one inbound request to every upstream in a registry snapshot.
///
/// The connect timeout lives on the connector; the read deadline is applied
/// per call. The client itself is cheap to clone (shared pool) and one
/// instance serves every job.
pub struct Dispatcher {
    client: Client<HttpConnector, Body>,
    read_timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher with the configured per-upstream timeouts.
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_millis(timeouts.connect_ms)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            read_timeout: Duration::from_millis(timeouts.read_ms),
        }
    }

    /// Forward the buffered inbound request to every target concurrently.
    ///
    /// Returns the last-completing response once every branch answered 2xx,
    /// or the first branch failure. In-flight branches are aborted as soon
    /// as the outcome is decided; their results are never observed.
    pub async fn dispatch(
        &self,
        parts: &Parts,
        body: Bytes,
        targets: Vec<Upstream>,
    ) -> Result<Response<Incoming>, DispatchError> {
        if targets.is_empty() {
            tracing::warn!(
                method = %parts.method,
                path = %parts.uri.path(),
                "Dispatch with empty registry"
            );
            return Err(DispatchError::NoUpstreams);
        }

        let started = Instant::now();
        let fanout = targets.len();

        // Build every outbound copy up front; a copy that cannot be built
        // fails the job before any branch is spawned.
        let mut calls = Vec::with_capacity(fanout);
        for upstream in targets {
            let request = build_upstream_request(parts, body.clone(), &upstream).map_err(
                |reason| DispatchError::Unreachable {
                    upstream: upstream.name.clone(),
                    reason,
                },
            )?;
            calls.push((upstream, request));
        }

        let mut branches = JoinSet::new();
        for (upstream, request) in calls {
            let client = self.client.clone();
            let deadline = self.read_timeout;
            branches.spawn(call_upstream(client, deadline, upstream, request));
        }

        let mut policy = RequireAll::new();
        while let Some(joined) = branches.join_next().await {
            // Branch tasks never panic and are only aborted by us, so a
            // join error still folds into the aggregate as a failed branch.
            let call = joined.unwrap_or_else(|e| UpstreamCallResult {
                upstream: "<branch>".to_string(),
                outcome: CallOutcome::Unreachable(e.to_string()),
            });

            match policy.observe(call) {
                Verdict::Continue => {}
                Verdict::Abort(error) => {
                    tracing::warn!(
                        %error,
                        fanout,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Fan-out failed, abandoning remaining branches"
                    );
                    // Dropping the JoinSet aborts every in-flight branch.
                    return Err(error);
                }
            }
        }

        tracing::debug!(
            fanout,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "All branches succeeded"
        );
        policy.finish()
    }
}

/// Copy the inbound request for one target: same method, path and query,
/// end-to-end headers; the target's scheme and authority.
fn build_upstream_request(
    parts: &Parts,
    body: Bytes,
    upstream: &Upstream,
) -> Result<Request<Body>, String> {
    let mut target = upstream.callback.clone();
    target.set_path(parts.uri.path());
    target.set_query(parts.uri.query());

    let mut builder = Request::builder()
        .method(parts.method.clone())
        .uri(target.as_str());

    if let Some(headers) = builder.headers_mut() {
        copy_forwarding_headers(&parts.headers, headers);
    }

    builder.body(Body::from(body)).map_err(|e| e.to_string())
}

/// One branch: issue the call, classify the result.
async fn call_upstream(
    client: Client<HttpConnector, Body>,
    deadline: Duration,
    upstream: Upstream,
    request: Request<Body>,
) -> UpstreamCallResult<Response<Incoming>> {
    let outcome = match time::timeout(deadline, client.request(request)).await {
        Err(_) => CallOutcome::TimedOut,
        Ok(Err(error)) => {
            // The connect timeout surfaces as a connector error wrapping an
            // io timeout; classify it with read timeouts rather than as a
            // generic connection failure.
            if io_timed_out(&error) {
                CallOutcome::TimedOut
            } else {
                CallOutcome::Unreachable(error.to_string())
            }
        }
        Ok(Ok(response)) if response.status().is_success() => CallOutcome::Ok(response),
        Ok(Ok(response)) => CallOutcome::ErrorStatus(response.status()),
    };

    match &outcome {
        CallOutcome::Ok(response) => {
            tracing::debug!(upstream = %upstream.name, status = %response.status(), "Upstream answered");
        }
        CallOutcome::TimedOut => {
            tracing::warn!(upstream = %upstream.name, "Upstream call timed out");
        }
        CallOutcome::Unreachable(reason) => {
            tracing::warn!(upstream = %upstream.name, %reason, "Upstream unreachable");
        }
        CallOutcome::ErrorStatus(status) => {
            tracing::warn!(upstream = %upstream.name, %status, "Upstream answered with error status");
        }
    }

    UpstreamCallResult {
        upstream: upstream.name,
        outcome,
    }
}

/// True if the error chain bottoms out in an io timeout.
fn io_timed_out(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_snapshot_fails_immediately() {
        let dispatcher = Dispatcher::new(&TimeoutConfig::default());
        let (parts, _) = Request::builder()
            .uri("http://proxy/anything")
            .body(())
            .unwrap()
            .into_parts();

        let started = Instant::now();
        let outcome = dispatcher.dispatch(&parts, Bytes::new(), Vec::new()).await;

        assert!(matches!(outcome, Err(DispatchError::NoUpstreams)));
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn upstream_request_replaces_scheme_and_authority() {
        let (parts, _) = Request::builder()
            .method("POST")
            .uri("http://proxy:9876/api/v1/things?x=1")
            .header("content-type", "application/json")
            .header("connection", "keep-alive")
            .body(())
            .unwrap()
            .into_parts();

        let upstream = Upstream::new("app", url::Url::parse("http://backend:8080").unwrap());
        let request = build_upstream_request(&parts, Bytes::from_static(b"{}"), &upstream).unwrap();

        assert_eq!(request.uri().to_string(), "http://backend:8080/api/v1/things?x=1");
        assert_eq!(request.method(), "POST");
        assert!(request.headers().contains_key("content-type"));
        assert!(!request.headers().contains_key("connection"));
    }
}
