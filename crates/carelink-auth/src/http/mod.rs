//! Axum HTTP handlers for the session endpoints.
//!
//! # Available Handlers
//!
//! - [`refresh`] - `POST /auth/refresh`
//! - [`session`] - `GET /auth/session`

pub mod refresh;
pub mod response;
pub mod session;

pub use refresh::{RefreshRequest, RefreshState, method_not_allowed, refresh_handler};
pub use response::{ApiResponse, CredentialKind, ErrorResponse};
pub use session::{SessionPrincipal, SessionResponse, session_handler};
