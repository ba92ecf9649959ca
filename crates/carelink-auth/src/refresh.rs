//! Stateless session renewal.
//!
//! A refresh request moves through
//! `Received -> Verifying -> Reconstructing -> Issuing -> Issued`, and any
//! stage may end in a terminal rejection instead. Nothing is persisted and
//! nothing is retried; the caller re-authenticates on failure.
//!
//! # Usage
//!
//! ```ignore
//! use carelink_auth::refresh::RefreshService;
//!
//! let keys = config.signing_keys()?;
//! let service = RefreshService::from_config(&config, &keys);
//!
//! let outcome = service.refresh(Some(&refresh_token)).await?;
//! println!("{}", outcome.access_token.token);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::AuthResult;
use crate::config::{AuthConfig, SigningKeys};
use crate::error::AuthError;
use crate::principal::{Principal, PrincipalResolver, StatelessPrincipalResolver};
use crate::token::issuer::{AccessTokenIssuer, IssuedToken};
use crate::token::verifier::{CredentialVerifier, RefreshTokenVerifier};

/// Stage of a refresh request, recorded in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStage {
    Received,
    Verifying,
    Reconstructing,
    Issuing,
    Issued,
}

impl fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Received => write!(f, "received"),
            Self::Verifying => write!(f, "verifying"),
            Self::Reconstructing => write!(f, "reconstructing"),
            Self::Issuing => write!(f, "issuing"),
            Self::Issued => write!(f, "issued"),
        }
    }
}

/// Result of a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// The principal the new token is bound to.
    pub principal: Principal,
    /// The newly minted access token.
    pub access_token: IssuedToken,
}

/// Renews access tokens from refresh tokens.
pub struct RefreshService {
    verifier: Arc<dyn CredentialVerifier>,
    resolver: Arc<dyn PrincipalResolver>,
    issuer: AccessTokenIssuer,
}

impl RefreshService {
    /// Creates a service from explicit collaborators.
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        resolver: Arc<dyn PrincipalResolver>,
        issuer: AccessTokenIssuer,
    ) -> Self {
        Self {
            verifier,
            resolver,
            issuer,
        }
    }

    /// Creates the stateless service for resolved signing keys.
    #[must_use]
    pub fn from_config(config: &AuthConfig, keys: &SigningKeys) -> Self {
        Self::new(
            Arc::new(RefreshTokenVerifier::new(&keys.refresh)),
            Arc::new(StatelessPrincipalResolver),
            AccessTokenIssuer::with_lifetime(&keys.access, config.access_token_lifetime),
        )
    }

    /// Replaces the principal resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn PrincipalResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Renews an access token.
    ///
    /// # Errors
    ///
    /// - `MissingCredential` if `refresh_token` is absent or empty; the
    ///   verifier is not consulted
    /// - `InvalidOrExpired` if verification fails for any reason
    /// - `PrincipalInactive` if the resolved principal is not active
    /// - `IssuanceFailed` if the access token cannot be signed
    pub async fn refresh(&self, refresh_token: Option<&str>) -> AuthResult<RefreshOutcome> {
        let token = match refresh_token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(reject(RefreshStage::Received, AuthError::MissingCredential)),
        };

        let claims = self
            .verifier
            .verify(token)
            .map_err(|e| reject(RefreshStage::Verifying, e))?;

        let principal = self
            .resolver
            .resolve(&claims)
            .await
            .map_err(|e| reject(RefreshStage::Reconstructing, e))?;

        if !principal.is_active {
            return Err(reject(
                RefreshStage::Reconstructing,
                AuthError::PrincipalInactive,
            ));
        }

        let access_token = self
            .issuer
            .issue(&principal)
            .map_err(|e| reject(RefreshStage::Issuing, e))?;

        tracing::info!(
            stage = %RefreshStage::Issued,
            principal_id = %principal.principal_id,
            role = %principal.role,
            expires_at = access_token.expires_at,
            "Access token refreshed"
        );

        Ok(RefreshOutcome {
            principal,
            access_token,
        })
    }
}

fn reject(stage: RefreshStage, error: AuthError) -> AuthError {
    if error.is_server_error() {
        tracing::error!(stage = %stage, kind = %error.kind(), error = %error, "Refresh failed");
    } else {
        tracing::warn!(stage = %stage, kind = %error.kind(), "Refresh rejected");
    }
    error
}
