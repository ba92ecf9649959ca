//! Bearer token authentication extractor.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use carelink_auth::middleware::{AccessAuthState, BearerAuth};
//!
//! async fn protected_handler(BearerAuth(claims): BearerAuth) -> String {
//!     format!("Hello, {}!", claims.display_name)
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(access_state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AuthError;
use crate::http::response::ErrorResponse;
use crate::token::jwt::AccessTokenClaims;
use crate::token::verifier::AccessTokenVerifier;

/// State required for bearer token authentication.
///
/// Make it available to [`BearerAuth`] via `FromRef` on the application
/// state.
#[derive(Clone)]
pub struct AccessAuthState {
    /// Verifier bound to the access secret.
    pub verifier: Arc<AccessTokenVerifier>,
}

impl AccessAuthState {
    pub fn new(verifier: Arc<AccessTokenVerifier>) -> Self {
        Self { verifier }
    }
}

/// Axum extractor yielding the claims of a valid access token.
///
/// Reads `Authorization: Bearer <token>`. A missing header or empty token is
/// rejected as a missing credential, anything else that fails verification
/// as invalid or expired.
pub struct BearerAuth(pub AccessTokenClaims);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AccessAuthState: FromRef<S>,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AccessAuthState::from_ref(state);

        let token = bearer_token(parts).ok_or_else(|| {
            tracing::debug!("Missing bearer token");
            ErrorResponse::access(AuthError::MissingCredential)
        })?;

        let claims = auth_state
            .verifier
            .verify(token)
            .map_err(ErrorResponse::access)?;

        tracing::debug!(principal_id = %claims.principal_id, "Access token validated");

        Ok(BearerAuth(claims))
    }
}

/// Extracts a non-empty bearer token from the `Authorization` header.
///
/// The scheme name is matched case-insensitively.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}
