//! Principal reconstruction.
//!
//! A [`Principal`] is rebuilt from verified refresh claims on every request
//! and dropped once the access token is minted. Its id is a pure function of
//! the subject identifier, so no lookup table is needed to keep it stable.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::AuthResult;
use crate::token::jwt::RefreshTokenClaims;

/// Suffix appended to the subject before hashing.
pub const PRINCIPAL_ID_DOMAIN: &str = "carelink:principal:v1";

/// Number of hex characters kept from the digest.
pub const PRINCIPAL_ID_LENGTH: usize = 24;

/// Role assumed when the refresh token carries none.
pub const DEFAULT_ROLE: &str = "patient";

/// Display name used while no profile store is consulted.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// Identity reconstructed from a verified refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: String,
    pub subject_identifier: String,
    pub role: String,
    pub display_name: String,
    pub is_verified: bool,
    pub is_active: bool,
}

impl Principal {
    /// Rebuilds a principal from verified claims.
    ///
    /// `is_verified` and `is_active` are `true`: a valid refresh signature is
    /// taken as proof of continued standing. Stores that know better should
    /// implement [`PrincipalResolver`] instead.
    #[must_use]
    pub fn reconstruct(claims: &RefreshTokenClaims) -> Self {
        Self::for_subject(&claims.subject_identifier, claims.role.as_deref())
    }

    /// Builds the principal for a subject and optional role.
    #[must_use]
    pub fn for_subject(subject_identifier: &str, role: Option<&str>) -> Self {
        let role = role.filter(|role| !role.is_empty()).unwrap_or(DEFAULT_ROLE);

        Self {
            principal_id: derive_principal_id(subject_identifier),
            subject_identifier: subject_identifier.to_string(),
            role: role.to_string(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            is_verified: true,
            is_active: true,
        }
    }
}

/// Derives the stable principal id for a subject identifier.
///
/// SHA-256 over `subject || PRINCIPAL_ID_DOMAIN`, hex encoded and truncated
/// to [`PRINCIPAL_ID_LENGTH`] characters. This is an identifier, not a
/// secret.
#[must_use]
pub fn derive_principal_id(subject_identifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(subject_identifier.as_bytes());
    hasher.update(PRINCIPAL_ID_DOMAIN.as_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(PRINCIPAL_ID_LENGTH);
    id
}

/// Source of principals for verified refresh claims.
///
/// The default [`StatelessPrincipalResolver`] never touches storage. A
/// resolver backed by a user store may return an inactive principal, which
/// the refresh flow rejects.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// Resolves the principal for verified claims.
    async fn resolve(&self, claims: &RefreshTokenClaims) -> AuthResult<Principal>;
}

/// Resolver that reconstructs principals purely from claims.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatelessPrincipalResolver;

#[async_trait]
impl PrincipalResolver for StatelessPrincipalResolver {
    async fn resolve(&self, claims: &RefreshTokenClaims) -> AuthResult<Principal> {
        Ok(Principal::reconstruct(claims))
    }
}
