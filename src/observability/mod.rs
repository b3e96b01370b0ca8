//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured, request_id/upstream/status fields)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber (EnvFilter)
//!     → Prometheus scrape of the metrics endpoint
//! ```
//!
//! # Design Decisions
//! - Branch-level failure detail goes to the log only; the caller sees a
//!   single aggregate status
//! - Metric updates are cheap (atomic increments); recording is a no-op
//!   when no exporter is installed

pub mod metrics;
