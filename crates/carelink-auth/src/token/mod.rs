//! Token encoding, verification and issuance.
//!
//! - [`jwt`] - HS256 codec and claim types
//! - [`verifier`] - refresh and access token verification
//! - [`issuer`] - access and refresh token minting

pub mod issuer;
pub mod jwt;
pub mod verifier;

pub use issuer::{AccessTokenIssuer, DEFAULT_ACCESS_TOKEN_LIFETIME, IssuedToken, RefreshTokenIssuer};
pub use jwt::{AccessTokenClaims, JwtError, JwtService, RefreshTokenClaims, SigningSecret};
pub use verifier::{AccessTokenVerifier, CredentialVerifier, RefreshTokenVerifier};
