//! Credential verification.
//!
//! Every decoding, signature and expiry failure collapses into
//! [`AuthError::InvalidOrExpired`]. The precise cause is only logged at debug
//! level, and the token itself is never logged.

use time::OffsetDateTime;

use crate::AuthResult;
use crate::error::AuthError;
use crate::token::jwt::{AccessTokenClaims, JwtService, RefreshTokenClaims, SigningSecret};

/// Rejects a token whose `exp` is not strictly after the current second.
///
/// The JWT library only rejects `exp < now`, so a token is still accepted
/// during the second it expires in without this check.
fn ensure_unexpired(exp: i64) -> AuthResult<()> {
    if exp <= OffsetDateTime::now_utc().unix_timestamp() {
        tracing::debug!("Token expired at the current second");
        return Err(AuthError::InvalidOrExpired);
    }
    Ok(())
}

/// Verifies refresh credentials.
pub trait CredentialVerifier: Send + Sync {
    /// Verifies a refresh token and returns its claims.
    ///
    /// # Errors
    ///
    /// `MissingCredential` for an empty token, `InvalidOrExpired` for any
    /// other failure.
    fn verify(&self, token: &str) -> AuthResult<RefreshTokenClaims>;
}

/// Verifies refresh tokens against the refresh secret.
pub struct RefreshTokenVerifier {
    jwt: JwtService,
}

impl RefreshTokenVerifier {
    #[must_use]
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            jwt: JwtService::new(secret),
        }
    }
}

impl CredentialVerifier for RefreshTokenVerifier {
    fn verify(&self, token: &str) -> AuthResult<RefreshTokenClaims> {
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let claims = self
            .jwt
            .decode::<RefreshTokenClaims>(token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token rejected");
                AuthError::InvalidOrExpired
            })?
            .claims;

        ensure_unexpired(claims.exp)?;

        if claims.subject_identifier.is_empty() {
            tracing::debug!("Refresh token has an empty subject");
            return Err(AuthError::InvalidOrExpired);
        }

        Ok(claims)
    }
}

/// Verifies access tokens against the access secret.
pub struct AccessTokenVerifier {
    jwt: JwtService,
}

impl AccessTokenVerifier {
    #[must_use]
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            jwt: JwtService::new(secret),
        }
    }

    /// Verifies an access token and returns its claims.
    ///
    /// # Errors
    ///
    /// `MissingCredential` for an empty token, `InvalidOrExpired` for any
    /// other failure.
    pub fn verify(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let claims = self
            .jwt
            .decode::<AccessTokenClaims>(token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                AuthError::InvalidOrExpired
            })?
            .claims;

        ensure_unexpired(claims.exp)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sign(secret: &str, subject: &str, exp_offset: i64) -> String {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        JwtService::new(&SigningSecret::new(secret))
            .encode(&RefreshTokenClaims {
                subject_identifier: subject.to_string(),
                role: Some("patient".to_string()),
                iat: now,
                exp: now + exp_offset,
            })
            .unwrap()
    }

    #[test]
    fn test_valid_refresh_token() {
        let verifier = RefreshTokenVerifier::new(&SigningSecret::new("refresh"));
        let claims = verifier.verify(&sign("refresh", "+919876543210", 600)).unwrap();
        assert_eq!(claims.subject_identifier, "+919876543210");
        assert_eq!(claims.role.as_deref(), Some("patient"));
    }

    #[test]
    fn test_empty_token_is_missing() {
        let verifier = RefreshTokenVerifier::new(&SigningSecret::new("refresh"));
        assert!(matches!(
            verifier.verify(""),
            Err(AuthError::MissingCredential)
        ));
    }

    #[test]
    fn test_failures_collapse_to_invalid_or_expired() {
        let verifier = RefreshTokenVerifier::new(&SigningSecret::new("refresh"));

        let wrong_secret = sign("other", "+919876543210", 600);
        let expired = sign("refresh", "+919876543210", -1);
        let empty_subject = sign("refresh", "", 600);

        for token in [wrong_secret.as_str(), expired.as_str(), empty_subject.as_str(), "garbage"] {
            assert!(matches!(
                verifier.verify(token),
                Err(AuthError::InvalidOrExpired)
            ));
        }
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let verifier = RefreshTokenVerifier::new(&SigningSecret::new("refresh"));
        let token = sign("refresh", "+919876543210", 600);
        let forged_payload = sign("refresh", "+910000000000", 600);

        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged_payload.split('.').nth(1).unwrap();
        let tampered = parts.join(".");

        assert!(matches!(
            verifier.verify(&tampered),
            Err(AuthError::InvalidOrExpired)
        ));
    }

    #[test]
    fn test_access_verifier_rejects_refresh_tokens() {
        let verifier = AccessTokenVerifier::new(&SigningSecret::new("access"));
        let refresh = sign("refresh", "+919876543210", 600);
        assert!(matches!(
            verifier.verify(&refresh),
            Err(AuthError::InvalidOrExpired)
        ));
    }

    #[test]
    fn test_refresh_token_expiring_this_second_rejected() {
        let verifier = RefreshTokenVerifier::new(&SigningSecret::new("refresh"));
        let token = sign("refresh", "+919876543210", 0);
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidOrExpired)
        ));
    }

    #[test]
    fn test_access_token_expiring_this_second_rejected() {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let secret = SigningSecret::new("access");
        let token = JwtService::new(&secret)
            .encode(&AccessTokenClaims {
                principal_id: "0123456789abcdef01234567".to_string(),
                subject_identifier: "+919876543210".to_string(),
                role: "patient".to_string(),
                display_name: "User".to_string(),
                iat: now - 10,
                exp: now,
                jti: "jti".to_string(),
            })
            .unwrap();

        assert!(matches!(
            AccessTokenVerifier::new(&secret).verify(&token),
            Err(AuthError::InvalidOrExpired)
        ));
    }
}
