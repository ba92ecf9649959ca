//! Session renewal configuration.
//!
//! Secrets are read once at startup and handed to the verifier and issuers as
//! explicit [`SigningKeys`]. Outside development mode every secret must be
//! configured; nothing falls back to a guessable default.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::token::issuer::DEFAULT_ACCESS_TOKEN_LIFETIME;
use crate::token::jwt::SigningSecret;

/// Refresh secret used when none is configured in development mode.
pub const DEV_REFRESH_SECRET: &str = "carelink-dev-refresh-secret";

/// Access secret used when none is configured in development mode.
pub const DEV_ACCESS_SECRET: &str = "carelink-dev-access-secret";

/// Deployment mode of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Local development: default secrets allowed, error details exposed.
    #[default]
    Development,
    /// Hardened deployment: secrets required, error details hidden.
    Production,
}

impl DeploymentMode {
    #[must_use]
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Session renewal configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// environment = "production"
/// refresh_secret = "..."
/// access_secret = "..."
/// access_token_lifetime = "15m"
/// refresh_token_lifetime = "7d"
/// ```
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Deployment mode.
    pub environment: DeploymentMode,

    /// Secret for signing and verifying refresh tokens.
    pub refresh_secret: Option<String>,

    /// Secret for signing and verifying access tokens.
    pub access_secret: Option<String>,

    /// Lifetime of minted access tokens.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Lifetime of minted refresh tokens.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            environment: DeploymentMode::Development,
            refresh_secret: None,
            access_secret: None,
            access_token_lifetime: DEFAULT_ACCESS_TOKEN_LIFETIME,
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("environment", &self.environment)
            .field("refresh_secret", &self.refresh_secret.as_ref().map(|_| "<redacted>"))
            .field("access_secret", &self.access_secret.as_ref().map(|_| "<redacted>"))
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .finish()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

/// The two resolved signing secrets.
#[derive(Debug, Clone)]
pub struct SigningKeys {
    pub refresh: SigningSecret,
    pub access: SigningSecret,
    /// `true` if either secret is a development default.
    pub uses_development_defaults: bool,
}

impl AuthConfig {
    /// Whether internal error detail may be returned to callers.
    #[must_use]
    pub fn expose_error_details(&self) -> bool {
        !self.environment.is_production()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a lifetime is zero, the refresh lifetime is
    /// not longer than the access lifetime, or the secrets cannot be resolved
    /// (see [`AuthConfig::signing_keys`]).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.refresh_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "refresh_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.refresh_token_lifetime <= self.access_token_lifetime {
            return Err(ConfigError::InvalidValue(
                "refresh_token_lifetime must be longer than access_token_lifetime".to_string(),
            ));
        }

        self.signing_keys().map(|_| ())
    }

    /// Resolves the refresh and access secrets.
    ///
    /// In development mode an absent secret falls back to the matching
    /// development default, flagged by `uses_development_defaults` so the
    /// caller can warn about it. In production mode a
    /// secret must be present, non-empty and different from the defaults.
    /// In both modes the two secrets must differ.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` or `ConfigError::InvalidValue`.
    pub fn signing_keys(&self) -> Result<SigningKeys, ConfigError> {
        let (refresh, refresh_default) =
            self.resolve_secret("refresh_secret", self.refresh_secret.as_deref(), DEV_REFRESH_SECRET)?;
        let (access, access_default) =
            self.resolve_secret("access_secret", self.access_secret.as_deref(), DEV_ACCESS_SECRET)?;

        if refresh == access {
            return Err(ConfigError::InvalidValue(
                "refresh_secret and access_secret must differ".to_string(),
            ));
        }

        Ok(SigningKeys {
            refresh: SigningSecret::new(refresh),
            access: SigningSecret::new(access),
            uses_development_defaults: refresh_default || access_default,
        })
    }

    fn resolve_secret(
        &self,
        name: &str,
        configured: Option<&str>,
        fallback: &str,
    ) -> Result<(String, bool), ConfigError> {
        match configured {
            Some(secret) if secret.is_empty() => {
                Err(ConfigError::InvalidValue(format!("{name} cannot be empty")))
            }
            Some(secret)
                if self.environment.is_production()
                    && (secret == DEV_REFRESH_SECRET || secret == DEV_ACCESS_SECRET) =>
            {
                Err(ConfigError::InvalidValue(format!(
                    "{name} must not be a development default in production"
                )))
            }
            Some(secret) => Ok((secret.to_string(), false)),
            None if self.environment.is_production() => Err(ConfigError::Missing(format!(
                "{name} (required in production)"
            ))),
            None => Ok((fallback.to_string(), true)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production_config() -> AuthConfig {
        AuthConfig {
            environment: DeploymentMode::Production,
            refresh_secret: Some("prod-refresh".to_string()),
            access_secret: Some("prod-access".to_string()),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.environment, DeploymentMode::Development);
        assert_eq!(config.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(config.refresh_token_lifetime, Duration::from_secs(604_800));
        assert!(config.expose_error_details());
    }

    #[test]
    fn test_default_config_validates() {
        assert!(AuthConfig::default().validate().is_ok());
    }

    #[test]
    fn test_development_falls_back_to_defaults() {
        let keys = AuthConfig::default().signing_keys().unwrap();
        assert!(keys.uses_development_defaults);
        assert_eq!(keys.refresh.as_bytes(), DEV_REFRESH_SECRET.as_bytes());
        assert_eq!(keys.access.as_bytes(), DEV_ACCESS_SECRET.as_bytes());
    }

    #[test]
    fn test_production_requires_secrets() {
        let mut config = production_config();
        config.access_secret = None;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().contains("access_secret"));
    }

    #[test]
    fn test_production_rejects_development_defaults() {
        let mut config = production_config();
        config.refresh_secret = Some(DEV_REFRESH_SECRET.to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("development default"));
    }

    #[test]
    fn test_production_config_validates() {
        let config = production_config();
        assert!(config.validate().is_ok());
        assert!(!config.expose_error_details());
        assert!(!config.signing_keys().unwrap().uses_development_defaults);
    }

    #[test]
    fn test_identical_secrets_rejected() {
        let mut config = production_config();
        config.access_secret = config.refresh_secret.clone();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let config = AuthConfig {
            refresh_secret: Some(String::new()),
            ..AuthConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("refresh_secret cannot be empty"));
    }

    #[test]
    fn test_zero_lifetime_fails_validation() {
        let config = AuthConfig {
            access_token_lifetime: Duration::ZERO,
            ..AuthConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("access_token_lifetime"));
    }

    #[test]
    fn test_refresh_must_outlive_access() {
        let config = AuthConfig {
            access_token_lifetime: Duration::from_secs(3600),
            refresh_token_lifetime: Duration::from_secs(60),
            ..AuthConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", production_config());
        assert!(!debug.contains("prod-refresh"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_deserialize_humantime_lifetimes() {
        let json = r#"{
            "environment": "production",
            "refresh_secret": "r",
            "access_secret": "a",
            "access_token_lifetime": "5m",
            "refresh_token_lifetime": "30d"
        }"#;
        let config: AuthConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.environment, DeploymentMode::Production);
        assert_eq!(config.access_token_lifetime, Duration::from_secs(300));
        assert_eq!(config.refresh_token_lifetime, Duration::from_secs(30 * 86_400));
    }
}
