//! JSON envelope shared by the auth endpoints.
//!
//! Every response carries `success` and `message`. Failures never echo the
//! submitted token; the `error` detail is only attached when the deployment
//! allows it.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AuthError;

/// Response body for the auth endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            token: None,
            error: None,
        }
    }
}

/// Which credential a failed request presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Refresh,
    Access,
}

/// An [`AuthError`] rendered for a specific endpoint.
#[derive(Debug)]
pub struct ErrorResponse {
    error: AuthError,
    credential: CredentialKind,
    expose_details: bool,
}

impl ErrorResponse {
    #[must_use]
    pub fn refresh(error: AuthError) -> Self {
        Self {
            error,
            credential: CredentialKind::Refresh,
            expose_details: false,
        }
    }

    #[must_use]
    pub fn access(error: AuthError) -> Self {
        Self {
            error,
            credential: CredentialKind::Access,
            expose_details: false,
        }
    }

    /// Attaches internal error detail when `expose` is set.
    #[must_use]
    pub fn with_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }

    #[must_use]
    pub fn error(&self) -> &AuthError {
        &self.error
    }

    /// The caller-facing message for this failure.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match (&self.error, self.credential) {
            (AuthError::MissingCredential, CredentialKind::Refresh) => "Refresh token is required",
            (AuthError::MissingCredential, CredentialKind::Access) => "Access token is required",
            (AuthError::InvalidOrExpired, CredentialKind::Refresh) => {
                "Invalid or expired refresh token"
            }
            (AuthError::InvalidOrExpired, CredentialKind::Access) => {
                "Invalid or expired access token"
            }
            (AuthError::PrincipalInactive, _) => "User not found or inactive",
            (AuthError::Timeout, _) => "Request timed out",
            (AuthError::IssuanceFailed { .. } | AuthError::Unexpected { .. }, _) => {
                "Failed to refresh token"
            }
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let mut body = ApiResponse::failure(self.public_message());
        if self.expose_details {
            body.error = self.error.detail().map(ToString::to_string);
        }

        let mut headers = no_store_headers();
        if status == StatusCode::UNAUTHORIZED && self.credential == CredentialKind::Access {
            headers.insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer error=\"invalid_token\""),
            );
        }

        (status, headers, Json(body)).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ErrorResponse::refresh(self).into_response()
    }
}

/// Headers that keep credentials out of caches.
pub(crate) fn no_store_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}
