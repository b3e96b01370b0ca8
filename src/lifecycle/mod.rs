//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse CLI → load config → validate → init tracing/metrics → bind →
//!     serve
//!
//! Shutdown:
//!     SIGINT/SIGTERM (signals.rs) → Shutdown::trigger (shutdown.rs)
//!     → server drains via graceful shutdown → process exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
