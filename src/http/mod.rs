//! HTTP front-end subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, routing)
//!     → PUT /register → register.rs → Registry
//!     → anything else → request.rs (request ID, buffered body)
//!                     → dispatch engine (fan-out)
//!                     → response.rs (render outcome)
//!     → Send to client
//! ```

pub mod register;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
