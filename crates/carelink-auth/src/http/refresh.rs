//! Refresh endpoint handler.
//!
//! # Request Format
//!
//! ```text
//! POST /auth/refresh
//! Content-Type: application/json
//!
//! { "refreshToken": "<refresh token>" }
//! ```
//!
//! # Response
//!
//! ```text
//! 200 { "success": true, "message": "Token refreshed successfully", "token": "<access token>" }
//! ```
//!
//! Failures use the envelope from [`super::response`].

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::refresh::RefreshService;

use super::response::{ApiResponse, ErrorResponse, no_store_headers};

/// State required for the refresh endpoint.
#[derive(Clone)]
pub struct RefreshState {
    /// Service performing the renewal.
    pub service: Arc<RefreshService>,
    /// Whether internal error detail is returned to callers.
    pub expose_error_details: bool,
}

impl RefreshState {
    pub fn new(service: Arc<RefreshService>, expose_error_details: bool) -> Self {
        Self {
            service,
            expose_error_details,
        }
    }
}

/// Body of a refresh request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl RefreshRequest {
    /// Parses a request body.
    ///
    /// A body that is empty or not a JSON object with a string
    /// `refreshToken` yields a request without a token.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

/// Refresh endpoint handler.
///
/// Handles `POST /auth/refresh`. The body is read raw so that a missing or
/// malformed body is reported as a missing refresh token (400) rather than
/// an extractor error.
pub async fn refresh_handler(State(state): State<RefreshState>, body: Bytes) -> Response {
    let request = RefreshRequest::from_body(&body);

    match state.service.refresh(request.refresh_token.as_deref()).await {
        Ok(outcome) => {
            let body = ApiResponse {
                success: true,
                message: "Token refreshed successfully".to_string(),
                token: Some(outcome.access_token.token),
                error: None,
            };
            (StatusCode::OK, no_store_headers(), Json(body)).into_response()
        }
        Err(e) => ErrorResponse::refresh(e)
            .with_details(state.expose_error_details)
            .into_response(),
    }
}

/// Fallback for non-POST requests to the refresh endpoint.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, HeaderValue::from_static("POST"))],
        Json(ApiResponse::failure("Method not allowed")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::principal::StatelessPrincipalResolver;
    use crate::token::issuer::{AccessTokenIssuer, RefreshTokenIssuer};
    use crate::token::jwt::SigningSecret;
    use crate::token::verifier::RefreshTokenVerifier;

    const REFRESH: &str = "test-refresh-secret";

    /// State whose access issuer cannot sign, so every valid refresh fails
    /// with a server error.
    fn broken_issuer_state(expose_error_details: bool) -> RefreshState {
        let service = RefreshService::new(
            Arc::new(RefreshTokenVerifier::new(&SigningSecret::new(REFRESH))),
            Arc::new(StatelessPrincipalResolver),
            AccessTokenIssuer::new(&SigningSecret::new("")),
        );
        RefreshState::new(Arc::new(service), expose_error_details)
    }

    fn refresh_body() -> Bytes {
        let token = RefreshTokenIssuer::new(&SigningSecret::new(REFRESH), Duration::from_secs(600))
            .issue("+919876543210", Some("patient"))
            .unwrap()
            .token;
        Bytes::from(serde_json::json!({ "refreshToken": token }).to_string())
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_issuance_failure_detail_in_development() {
        let response = refresh_handler(State(broken_issuer_state(true)), refresh_body()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Failed to refresh token");
        assert_eq!(json["error"], "signing secret is empty");
        assert!(json.get("token").is_none());
    }

    #[tokio::test]
    async fn test_issuance_failure_detail_hidden_in_production() {
        let response = refresh_handler(State(broken_issuer_state(false)), refresh_body()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["message"], "Failed to refresh token");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_parse_request() {
        let request = RefreshRequest::from_body(br#"{"refreshToken":"abc"}"#);
        assert_eq!(request.refresh_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_parse_request_without_token() {
        let bodies: [&[u8]; 5] = [b"", b"{}", b"not json", br#"{"refreshToken":42}"#, b"[]"];
        for body in bodies {
            assert!(RefreshRequest::from_body(body).refresh_token.is_none());
        }
    }

    #[test]
    fn test_parse_request_ignores_unknown_fields() {
        let request = RefreshRequest::from_body(br#"{"refreshToken":"abc","device":"ios"}"#);
        assert_eq!(request.refresh_token.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let response = method_not_allowed().await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }
}
