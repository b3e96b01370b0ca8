//! Job-completion policy.
//!
//! # Responsibilities
//! - Decide, per completed branch, whether the job continues or aborts
//! - Select the representative response once every branch has completed
//!
//! # Design Decisions
//! - The rule is explicit and test-visible instead of buried in the engine
//!   loop: every branch must succeed, and the response returned to the
//!   caller is from the branch that completed last in real time
//! - Generic over the response type so completion orders can be exercised
//!   in unit tests without fabricating hyper responses

use crate::dispatch::outcome::{CallOutcome, DispatchError, UpstreamCallResult};

/// Decision after observing one completed branch.
#[derive(Debug)]
pub enum Verdict {
    /// Keep draining branches.
    Continue,
    /// Abort the job now; in-flight branches are abandoned.
    Abort(DispatchError),
}

/// "All branches must succeed, last completion wins."
///
/// Feed branches with [`observe`](RequireAll::observe) in the order they
/// complete; once the job has drained every branch, [`finish`](RequireAll::finish)
/// yields the representative response.
#[derive(Debug)]
pub struct RequireAll<R> {
    last: Option<R>,
}

impl<R> RequireAll<R> {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Observe one completed branch, in real-time completion order.
    pub fn observe(&mut self, call: UpstreamCallResult<R>) -> Verdict {
        match call.outcome {
            CallOutcome::Ok(response) => {
                self.last = Some(response);
                Verdict::Continue
            }
            CallOutcome::TimedOut => Verdict::Abort(DispatchError::Timeout {
                upstream: call.upstream,
            }),
            CallOutcome::Unreachable(reason) => Verdict::Abort(DispatchError::Unreachable {
                upstream: call.upstream,
                reason,
            }),
            CallOutcome::ErrorStatus(status) => Verdict::Abort(DispatchError::ErrorStatus {
                upstream: call.upstream,
                status,
            }),
        }
    }

    /// All branches have completed without an abort; yield the response of
    /// the last one observed.
    pub fn finish(self) -> Result<R, DispatchError> {
        self.last.ok_or(DispatchError::NoUpstreams)
    }
}

impl<R> Default for RequireAll<R> {
    fn default() -> Self {
        Self::new()
    }
}
