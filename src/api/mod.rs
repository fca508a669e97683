//! HTTP API for the browser frontend.
//!
//! Exposes the session registry, extraction pipeline, regimen tables,
//! and chat as HTTP endpoints under `/api/`. Session-scoped routes sit
//! behind a middleware layer that resolves the `X-Session-Id` header;
//! the embed WebSocket authenticates via its query string instead.
//!
//! The router is composable — `api_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod session_layer;
pub mod types;
pub mod websocket;

pub use error::ApiError;
pub use router::api_router;
pub use types::ApiContext;
