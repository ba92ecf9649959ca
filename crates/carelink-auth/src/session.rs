//! Session token minting at login.
//!
//! Once a subject has authenticated (for instance by OTP), a
//! [`SessionIssuer`] hands out the refresh token that the refresh flow later
//! consumes, together with a first access token.

use crate::AuthResult;
use crate::config::{AuthConfig, SigningKeys};
use crate::principal::Principal;
use crate::token::issuer::{AccessTokenIssuer, IssuedToken, RefreshTokenIssuer};

/// Tokens handed out when a session starts.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub principal: Principal,
    pub access_token: IssuedToken,
    pub refresh_token: IssuedToken,
}

/// Mints access and refresh token pairs.
pub struct SessionIssuer {
    access: AccessTokenIssuer,
    refresh: RefreshTokenIssuer,
}

impl SessionIssuer {
    #[must_use]
    pub fn new(access: AccessTokenIssuer, refresh: RefreshTokenIssuer) -> Self {
        Self { access, refresh }
    }

    #[must_use]
    pub fn from_config(config: &AuthConfig, keys: &SigningKeys) -> Self {
        Self::new(
            AccessTokenIssuer::with_lifetime(&keys.access, config.access_token_lifetime),
            RefreshTokenIssuer::new(&keys.refresh, config.refresh_token_lifetime),
        )
    }

    /// Starts a session for an authenticated subject.
    ///
    /// # Errors
    ///
    /// `IssuanceFailed` if either token cannot be signed.
    pub fn issue(&self, subject_identifier: &str, role: Option<&str>) -> AuthResult<SessionTokens> {
        let refresh_token = self.refresh.issue(subject_identifier, role)?;
        let principal = Principal::for_subject(subject_identifier, role);
        let access_token = self.access.issue(&principal)?;

        tracing::info!(
            principal_id = %principal.principal_id,
            role = %principal.role,
            "Session tokens issued"
        );

        Ok(SessionTokens {
            principal,
            access_token,
            refresh_token,
        })
    }
}
