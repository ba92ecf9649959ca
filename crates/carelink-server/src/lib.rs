//! HTTP server for CareLink session renewal.
//!
//! Wires [`carelink_auth`] into an axum router with request ids, tracing,
//! CORS, a body limit and a request timeout.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use server::{AppState, CarelinkServer, ServerBuilder, build_app, build_router};
