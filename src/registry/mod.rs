//! Upstream registration subsystem.
//!
//! # Data Flow
//! ```text
//! PUT /register {"name", "callback"}
//!     → http/register.rs (parse & validate payload)
//!     → store.rs Registry::register (atomic insert-or-replace)
//!
//! Proxied request
//!     → Registry::snapshot (owned, point-in-time target set)
//!     → dispatch engine (snapshot is immutable from here on)
//! ```
//!
//! # Design Decisions
//! - The Registry is the only runtime-mutable shared state in the process
//! - Snapshots are owned copies; a register call can never alter the target
//!   set of a dispatch that has already started
//! - Names live until replaced or process restart (no unregister, no TTL)

pub mod store;
pub mod upstream;

pub use store::{Registration, Registry};
pub use upstream::Upstream;
