//! # carelink-auth
//!
//! Stateless session renewal for CareLink.
//!
//! A refresh token is verified against the refresh secret, the principal is
//! rebuilt from its claims without touching storage, and a short-lived access
//! token is minted with the separate access secret.
//!
//! ## Modules
//!
//! - [`config`] - Secrets, lifetimes and deployment mode
//! - [`error`] - Rejection taxonomy
//! - [`token`] - JWT codec, verifiers and issuers
//! - [`principal`] - Principal reconstruction and resolution
//! - [`refresh`] - The refresh flow
//! - [`session`] - Token minting at login
//! - [`middleware`] - Bearer token extractor
//! - [`http`] - Axum handlers

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod principal;
pub mod refresh;
pub mod session;
pub mod token;

pub use config::{AuthConfig, ConfigError, DeploymentMode, SigningKeys};
pub use error::{AuthError, RejectionKind};
pub use http::{
    ApiResponse, ErrorResponse, RefreshRequest, RefreshState, SessionResponse,
    method_not_allowed, refresh_handler, session_handler,
};
pub use middleware::{AccessAuthState, BearerAuth};
pub use principal::{
    Principal, PrincipalResolver, StatelessPrincipalResolver, derive_principal_id,
};
pub use refresh::{RefreshOutcome, RefreshService, RefreshStage};
pub use session::{SessionIssuer, SessionTokens};
pub use token::{
    AccessTokenClaims, AccessTokenIssuer, AccessTokenVerifier, CredentialVerifier, IssuedToken,
    JwtService, RefreshTokenClaims, RefreshTokenIssuer, RefreshTokenVerifier, SigningSecret,
};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;
