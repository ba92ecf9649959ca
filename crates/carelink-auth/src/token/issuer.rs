//! Access and refresh token issuance.
//!
//! Issuers hold their own signing secret. The access issuer and the refresh
//! issuer must be built from different secrets; [`crate::config::AuthConfig`]
//! refuses configurations where they coincide.

use std::time::Duration;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::principal::Principal;
use crate::token::jwt::{AccessTokenClaims, JwtService, RefreshTokenClaims, SigningSecret};

/// Default lifetime of an access token.
pub const DEFAULT_ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(15 * 60);

/// A freshly signed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Issued at (Unix timestamp).
    pub issued_at: i64,
    /// Expiration time (Unix timestamp).
    pub expires_at: i64,
}

impl IssuedToken {
    /// Seconds between issuance and expiry.
    #[must_use]
    pub fn expires_in(&self) -> i64 {
        self.expires_at - self.issued_at
    }
}

/// Computes `(iat, exp)` for a token issued now.
fn validity_window(lifetime: Duration) -> AuthResult<(i64, i64)> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let exp = i64::try_from(lifetime.as_secs())
        .ok()
        .and_then(|secs| now.checked_add(secs))
        .ok_or_else(|| AuthError::issuance_failed("token lifetime out of range"))?;
    Ok((now, exp))
}

fn ensure_key_material(secret: &SigningSecret) -> AuthResult<()> {
    if secret.is_empty() {
        return Err(AuthError::issuance_failed("signing secret is empty"));
    }
    Ok(())
}

/// Mints access tokens bound to a principal.
pub struct AccessTokenIssuer {
    jwt: JwtService,
    secret: SigningSecret,
    lifetime: Duration,
}

impl AccessTokenIssuer {
    /// Creates an issuer with the default 15 minute lifetime.
    #[must_use]
    pub fn new(secret: &SigningSecret) -> Self {
        Self::with_lifetime(secret, DEFAULT_ACCESS_TOKEN_LIFETIME)
    }

    #[must_use]
    pub fn with_lifetime(secret: &SigningSecret, lifetime: Duration) -> Self {
        Self {
            jwt: JwtService::new(secret),
            secret: secret.clone(),
            lifetime,
        }
    }

    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Signs a new access token for `principal`.
    ///
    /// # Errors
    ///
    /// `IssuanceFailed` if the key material is empty, the lifetime overflows
    /// or signing fails.
    pub fn issue(&self, principal: &Principal) -> AuthResult<IssuedToken> {
        ensure_key_material(&self.secret)?;
        let (iat, exp) = validity_window(self.lifetime)?;

        let claims = AccessTokenClaims {
            principal_id: principal.principal_id.clone(),
            subject_identifier: principal.subject_identifier.clone(),
            role: principal.role.clone(),
            display_name: principal.display_name.clone(),
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        let token = self
            .jwt
            .encode(&claims)
            .map_err(|e| AuthError::issuance_failed(e.to_string()))?;

        Ok(IssuedToken {
            token,
            issued_at: iat,
            expires_at: exp,
        })
    }
}

/// Mints refresh tokens at login time.
pub struct RefreshTokenIssuer {
    jwt: JwtService,
    secret: SigningSecret,
    lifetime: Duration,
}

impl RefreshTokenIssuer {
    #[must_use]
    pub fn new(secret: &SigningSecret, lifetime: Duration) -> Self {
        Self {
            jwt: JwtService::new(secret),
            secret: secret.clone(),
            lifetime,
        }
    }

    /// Signs a new refresh token for a subject.
    ///
    /// # Errors
    ///
    /// `IssuanceFailed` if the subject or key material is empty, the
    /// lifetime overflows or signing fails.
    pub fn issue(&self, subject_identifier: &str, role: Option<&str>) -> AuthResult<IssuedToken> {
        if subject_identifier.is_empty() {
            return Err(AuthError::issuance_failed("subject identifier is empty"));
        }
        ensure_key_material(&self.secret)?;
        let (iat, exp) = validity_window(self.lifetime)?;

        let claims = RefreshTokenClaims {
            subject_identifier: subject_identifier.to_string(),
            role: role.map(ToString::to_string),
            iat,
            exp,
        };

        let token = self
            .jwt
            .encode(&claims)
            .map_err(|e| AuthError::issuance_failed(e.to_string()))?;

        Ok(IssuedToken {
            token,
            issued_at: iat,
            expires_at: exp,
        })
    }
}
