//! Registering fan-out reverse proxy.
//!
//! HTTP requests to this server are forwarded to _all_ registered upstreams
//! in parallel and every one of them is expected to succeed. Upstreams
//! register themselves with a JSON payload like
//!
//! ```json
//! {"name": "appname", "callback": "http://somehost:1234"}
//! ```
//!
//! Names are unique; registering the same name again replaces the existing
//! callback. Only the last-completing response is returned to the client —
//! nothing is done to aggregate or compare responses.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                  REGPROXY                    │
//!   PUT /register        │  ┌─────────┐        ┌──────────────┐         │
//!   ─────────────────────┼─▶│  http   │───────▶│   registry   │         │
//!                        │  │ server  │        │ (name→addr)  │         │
//!   any other request    │  └────┬────┘        └──────┬───────┘         │
//!   ─────────────────────┼──────▶│                    │ snapshot        │
//!                        │       ▼                    ▼                 │
//!                        │  ┌──────────────────────────────┐            │
//!                        │  │       dispatch engine        │──────────▶ │──── every
//!   last response        │  │  fan-out · fail-fast · last  │◀────────── │     upstream
//!   ◀────────────────────┼──│        completion wins       │            │
//!                        │  └──────────────────────────────┘            │
//!                        │  config · observability · lifecycle          │
//!                        └──────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod dispatch;
pub mod http;
pub mod registry;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::Registry;
