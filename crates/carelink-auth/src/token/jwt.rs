//! JWT encoding and decoding for CareLink session tokens.
//!
//! Both token classes are HS256 tokens. Each class has its own
//! [`SigningSecret`] and therefore its own [`JwtService`]; a token signed for
//! one class never validates under the other.
//!
//! ## Example
//!
//! ```ignore
//! use carelink_auth::token::jwt::{JwtService, SigningSecret};
//!
//! let service = JwtService::new(&SigningSecret::new("refresh-secret"));
//! let token = service.encode(&claims)?;
//! let decoded = service.decode::<RefreshTokenClaims>(&token)?;
//! ```

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token claims are invalid.
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::ImmatureSignature
            | ErrorKind::Json(_) => Self::invalid_claims(err.to_string()),
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

// ============================================================================
// Signing Secret
// ============================================================================

/// Shared HMAC secret for one token class.
///
/// The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Arc<str>);

impl SigningSecret {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::from(secret.into()))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Claims carried by a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenClaims {
    /// Contact string (phone number) the session belongs to.
    #[serde(alias = "phone")]
    pub subject_identifier: String,

    /// Role asserted at login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Issued at (Unix timestamp).
    #[serde(default)]
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenClaims {
    /// Stable pseudo-identifier derived from the subject.
    pub principal_id: String,

    /// Contact string (phone number) the session belongs to.
    pub subject_identifier: String,

    pub role: String,

    pub display_name: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// JWT ID.
    pub jti: String,
}

// ============================================================================
// JWT Service
// ============================================================================

/// HS256 encoder/decoder bound to one signing secret.
///
/// This service is thread-safe (`Send + Sync`) and can be shared across
/// async tasks.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Creates a new JWT service for the given secret.
    #[must_use]
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Encodes claims into a JWT string.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Decodes and validates a JWT string.
    ///
    /// Expiry is checked with zero leeway, which still admits a token during
    /// the second its `exp` names. The verifiers reject that second
    /// themselves.
    ///
    /// # Errors
    /// Returns an error if decoding or validation fails.
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<TokenData<T>, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        decode(token, &self.decoding_key, &validation).map_err(JwtError::from)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn refresh_claims(exp_offset: i64) -> RefreshTokenClaims {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        RefreshTokenClaims {
            subject_identifier: "+919876543210".to_string(),
            role: Some("doctor".to_string()),
            iat: now,
            exp: now + exp_offset,
        }
    }

    #[test]
    fn test_encode_decode() {
        let service = JwtService::new(&SigningSecret::new("secret-a"));

        let token = service.encode(&refresh_claims(3600)).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let decoded = service.decode::<RefreshTokenClaims>(&token).unwrap();
        assert_eq!(decoded.claims.subject_identifier, "+919876543210");
        assert_eq!(decoded.claims.role.as_deref(), Some("doctor"));
        assert_eq!(decoded.header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtService::new(&SigningSecret::new("secret-a"));
        let token = service.encode(&refresh_claims(-10)).unwrap();

        let result = service.decode::<RefreshTokenClaims>(&token);
        assert!(matches!(result.unwrap_err(), JwtError::Expired));
    }

    #[test]
    fn test_invalid_signature_rejected() {
        let signer = JwtService::new(&SigningSecret::new("secret-a"));
        let verifier = JwtService::new(&SigningSecret::new("secret-b"));

        let token = signer.encode(&refresh_claims(3600)).unwrap();
        let result = verifier.decode::<RefreshTokenClaims>(&token);
        assert!(matches!(result.unwrap_err(), JwtError::InvalidSignature));
    }

    #[test]
    fn test_garbage_rejected() {
        let service = JwtService::new(&SigningSecret::new("secret-a"));
        assert!(service.decode::<RefreshTokenClaims>("not-a-jwt").is_err());
        assert!(service.decode::<RefreshTokenClaims>("a.b.c").is_err());
    }

    #[test]
    fn test_missing_exp_rejected() {
        #[derive(Serialize)]
        struct NoExp {
            #[serde(rename = "subjectIdentifier")]
            subject_identifier: String,
        }

        let service = JwtService::new(&SigningSecret::new("secret-a"));
        let token = service
            .encode(&NoExp {
                subject_identifier: "+911111111111".to_string(),
            })
            .unwrap();
        assert!(service.decode::<RefreshTokenClaims>(&token).is_err());
    }

    #[test]
    fn test_refresh_claims_accept_phone_alias() {
        let json = r#"{"phone":"+919876543210","role":"patient","iat":1,"exp":2}"#;
        let claims: RefreshTokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.subject_identifier, "+919876543210");
    }

    #[test]
    fn test_access_claims_serialization() {
        let claims = AccessTokenClaims {
            principal_id: "abc".to_string(),
            subject_identifier: "+919876543210".to_string(),
            role: "patient".to_string(),
            display_name: "User".to_string(),
            iat: 1,
            exp: 2,
            jti: "j".to_string(),
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"principalId\":\"abc\""));
        assert!(json.contains("\"subjectIdentifier\":\"+919876543210\""));
        assert!(json.contains("\"displayName\":\"User\""));
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = SigningSecret::new("super-secret");
        assert_eq!(format!("{secret:?}"), "SigningSecret(<redacted>)");
    }
}
