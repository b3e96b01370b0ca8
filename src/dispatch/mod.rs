//! Parallel fan-out dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (parts + buffered body) + registry snapshot
//!     → engine.rs (one outbound copy per upstream, spawned concurrently)
//!     → outcome.rs (per-branch classification: ok / timeout / unreachable /
//!       error status)
//!     → policy.rs (all branches must succeed, last completion wins)
//!     → Result<representative response, DispatchError>
//! ```
//!
//! # Design Decisions
//! - One tokio task per branch; completions drained in real-time order
//! - First failed branch aborts the job and every in-flight sibling
//! - Success only once every branch answered 2xx; the returned response is
//!   whichever branch finished last, a race outcome by design
//! - Branch results belong to their job and are never shared across jobs

pub mod engine;
pub mod outcome;
pub mod policy;

pub use engine::Dispatcher;
pub use outcome::DispatchError;
