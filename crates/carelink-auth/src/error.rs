//! Session renewal error types.
//!
//! Every failure of the refresh flow is mapped onto [`AuthError`] before it
//! reaches the transport layer. The variants form a closed taxonomy: callers
//! only ever see the public message of a variant, never the underlying cause.

use std::fmt;

use axum::http::StatusCode;

/// Errors that can occur while renewing or checking a session.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credential was supplied with the request.
    #[error("Missing credential")]
    MissingCredential,

    /// The credential failed signature, structure or expiry checks.
    ///
    /// These causes are deliberately not distinguished.
    #[error("Invalid or expired credential")]
    InvalidOrExpired,

    /// The reconstructed principal is unknown or no longer active.
    #[error("Principal not found or inactive")]
    PrincipalInactive,

    /// A new credential could not be signed.
    #[error("Issuance failed: {message}")]
    IssuanceFailed {
        /// Description of the signing failure.
        message: String,
    },

    /// The enclosing transport gave up on the request.
    #[error("Request timed out")]
    Timeout,

    /// Any other internal failure.
    #[error("Unexpected error: {message}")]
    Unexpected {
        /// Description of the failure.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `IssuanceFailed` error.
    #[must_use]
    pub fn issuance_failed(message: impl Into<String>) -> Self {
        Self::IssuanceFailed {
            message: message.into(),
        }
    }

    /// Creates a new `Unexpected` error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns the kind of this error, for logging.
    #[must_use]
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::MissingCredential => RejectionKind::MissingCredential,
            Self::InvalidOrExpired => RejectionKind::InvalidOrExpired,
            Self::PrincipalInactive => RejectionKind::PrincipalInactive,
            Self::IssuanceFailed { .. } => RejectionKind::IssuanceFailed,
            Self::Timeout => RejectionKind::Timeout,
            Self::Unexpected { .. } => RejectionKind::Unexpected,
        }
    }

    /// Returns the HTTP status this error is reported with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredential => StatusCode::BAD_REQUEST,
            Self::InvalidOrExpired | Self::PrincipalInactive => StatusCode::UNAUTHORIZED,
            Self::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            Self::IssuanceFailed { .. } | Self::Unexpected { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns `true` if the caller is at fault (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Returns `true` if the server is at fault (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Returns the internal detail of a server-side failure, if any.
    ///
    /// Only ever exposed to callers outside production mode.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::IssuanceFailed { message } | Self::Unexpected { message } => Some(message),
            _ => None,
        }
    }
}

/// Discriminant of [`AuthError`], carried in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    MissingCredential,
    InvalidOrExpired,
    PrincipalInactive,
    IssuanceFailed,
    Timeout,
    Unexpected,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "missing_credential"),
            Self::InvalidOrExpired => write!(f, "invalid_or_expired"),
            Self::PrincipalInactive => write!(f, "principal_inactive"),
            Self::IssuanceFailed => write!(f, "issuance_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::Unexpected => write!(f, "unexpected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(AuthError::MissingCredential.to_string(), "Missing credential");
        assert_eq!(
            AuthError::issuance_failed("empty key").to_string(),
            "Issuance failed: empty key"
        );
        assert_eq!(
            AuthError::unexpected("boom").to_string(),
            "Unexpected error: boom"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::MissingCredential.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidOrExpired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::PrincipalInactive.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::issuance_failed("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::Timeout.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(AuthError::MissingCredential.is_client_error());
        assert!(AuthError::InvalidOrExpired.is_client_error());
        assert!(!AuthError::InvalidOrExpired.is_server_error());
        assert!(AuthError::unexpected("x").is_server_error());
    }

    #[test]
    fn test_detail_only_for_server_failures() {
        assert_eq!(AuthError::issuance_failed("bad key").detail(), Some("bad key"));
        assert_eq!(AuthError::InvalidOrExpired.detail(), None);
        assert_eq!(AuthError::MissingCredential.detail(), None);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(
            AuthError::InvalidOrExpired.kind().to_string(),
            "invalid_or_expired"
        );
        assert_eq!(AuthError::Timeout.kind(), RejectionKind::Timeout);
    }
}
