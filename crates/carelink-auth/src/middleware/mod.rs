//! HTTP middleware for access token authentication.

pub mod auth;

pub use auth::{AccessAuthState, BearerAuth};
