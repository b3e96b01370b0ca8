//! Branch and job outcome model.

use axum::http::StatusCode;
use thiserror::Error;

/// Why a fan-out job failed. Only this aggregate ever crosses the front-end
/// boundary; individual branch results stay internal.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Dispatch was attempted with an empty registry snapshot.
    #[error("no upstreams registered")]
    NoUpstreams,

    /// A branch exceeded its connect or read deadline.
    #[error("upstream {upstream} timed out")]
    Timeout { upstream: String },

    /// A branch failed before a response could be read.
    #[error("upstream {upstream} unreachable: {reason}")]
    Unreachable { upstream: String, reason: String },

    /// An upstream answered, but outside the 2xx range.
    #[error("upstream {upstream} returned status {status}")]
    ErrorStatus { upstream: String, status: StatusCode },
}

impl DispatchError {
    /// Status presented to the original caller. No upstream "won", so the
    /// whole class is 5xx; the variant picks the closest gateway status.
    pub fn client_status(&self) -> StatusCode {
        match self {
            DispatchError::NoUpstreams => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            DispatchError::Unreachable { .. } => StatusCode::BAD_GATEWAY,
            DispatchError::ErrorStatus { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Terminal classification of one outbound call.
#[derive(Debug)]
pub enum CallOutcome<R> {
    /// 2xx response within the deadline.
    Ok(R),
    /// Connect or read deadline exceeded.
    TimedOut,
    /// Connection-level failure (refused, reset, DNS, ...).
    Unreachable(String),
    /// The upstream answered with a non-2xx status.
    ErrorStatus(StatusCode),
}

/// Result of one branch within a fan-out job. One per target; owned by the
/// job and discarded when the job reaches a terminal outcome.
#[derive(Debug)]
pub struct UpstreamCallResult<R> {
    /// Logical name of the upstream this branch called.
    pub upstream: String,
    pub outcome: CallOutcome<R>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_status_mapping() {
        assert_eq!(
            DispatchError::NoUpstreams.client_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            DispatchError::Timeout {
                upstream: "a".into()
            }
            .client_status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            DispatchError::Unreachable {
                upstream: "a".into(),
                reason: "connection refused".into()
            }
            .client_status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            DispatchError::ErrorStatus {
                upstream: "a".into(),
                status: StatusCode::INTERNAL_SERVER_ERROR
            }
            .client_status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
