//! Session introspection endpoint.
//!
//! `GET /auth/session` with `Authorization: Bearer <access token>` returns
//! the principal the token was minted for.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::middleware::BearerAuth;
use crate::token::jwt::AccessTokenClaims;

use super::response::no_store_headers;

/// Principal view returned by the session endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPrincipal {
    pub principal_id: String,
    pub subject_identifier: String,
    pub role: String,
    pub display_name: String,
}

/// Response body of the session endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub principal: SessionPrincipal,
    /// Expiration time of the presented token (Unix timestamp).
    pub expires_at: i64,
}

impl From<AccessTokenClaims> for SessionResponse {
    fn from(claims: AccessTokenClaims) -> Self {
        Self {
            success: true,
            expires_at: claims.exp,
            principal: SessionPrincipal {
                principal_id: claims.principal_id,
                subject_identifier: claims.subject_identifier,
                role: claims.role,
                display_name: claims.display_name,
            },
        }
    }
}

/// Session endpoint handler.
pub async fn session_handler(BearerAuth(claims): BearerAuth) -> Response {
    (
        StatusCode::OK,
        no_store_headers(),
        Json(SessionResponse::from(claims)),
    )
        .into_response()
}
