//! Configuration types for auth service

use std::time::Duration;

use crate::crypto::{SecretError, SigningSecret};

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret for access tokens
    pub access_secret: SigningSecret,
    /// Secret for refresh tokens
    pub refresh_secret: SigningSecret,
    /// Secret for password-reset tokens
    pub reset_secret: SigningSecret,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime; also the refresh cookie's Max-Age
    pub refresh_token_ttl: Duration,
    /// Password-reset token lifetime
    pub reset_token_ttl: Duration,
    /// Public base URL used to build reset links (e.g., https://app.example.com)
    pub app_domain: String,
    /// Upper bound on any single store call
    pub store_timeout: Duration,
}

impl AuthConfig {
    pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);
    pub const DEFAULT_REFRESH_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);
    pub const DEFAULT_RESET_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);
    pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Create a new auth config with default lifetimes
    ///
    /// # Errors
    /// Fails if any secret is shorter than 32 bytes, or if two purposes share a secret.
    pub fn try_new(
        access_secret: impl AsRef<[u8]>,
        refresh_secret: impl AsRef<[u8]>,
        reset_secret: impl AsRef<[u8]>,
        app_domain: impl Into<String>,
    ) -> Result<Self, AuthConfigError> {
        let access_secret = SigningSecret::new(access_secret)
            .map_err(|source| AuthConfigError::Secret { purpose: "access", source })?;
        let refresh_secret = SigningSecret::new(refresh_secret)
            .map_err(|source| AuthConfigError::Secret { purpose: "refresh", source })?;
        let reset_secret = SigningSecret::new(reset_secret)
            .map_err(|source| AuthConfigError::Secret { purpose: "reset", source })?;

        if access_secret.same_as(&refresh_secret) {
            return Err(AuthConfigError::SharedSecret("access", "refresh"));
        }
        if access_secret.same_as(&reset_secret) {
            return Err(AuthConfigError::SharedSecret("access", "reset"));
        }
        if refresh_secret.same_as(&reset_secret) {
            return Err(AuthConfigError::SharedSecret("refresh", "reset"));
        }

        Ok(Self {
            access_secret,
            refresh_secret,
            reset_secret,
            access_token_ttl: Self::DEFAULT_ACCESS_TOKEN_TTL,
            refresh_token_ttl: Self::DEFAULT_REFRESH_TOKEN_TTL,
            reset_token_ttl: Self::DEFAULT_RESET_TOKEN_TTL,
            app_domain: app_domain.into(),
            store_timeout: Self::DEFAULT_STORE_TIMEOUT,
        })
    }

    /// Build the link mailed to a user requesting a password reset
    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.app_domain.trim_end_matches('/'),
            token
        )
    }

    /// Set access token lifetime
    pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    /// Set refresh token lifetime
    pub fn with_refresh_token_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_token_ttl = ttl;
        self
    }

    /// Set reset token lifetime
    pub fn with_reset_token_ttl(mut self, ttl: Duration) -> Self {
        self.reset_token_ttl = ttl;
        self
    }

    /// Set store call timeout
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }
}

/// Invalid auth configuration
#[derive(Debug, thiserror::Error)]
pub enum AuthConfigError {
    #[error("{purpose} token secret rejected: {source}")]
    Secret {
        purpose: &'static str,
        #[source]
        source: SecretError,
    },

    #[error("{0} and {1} tokens must use different secrets")]
    SharedSecret(&'static str, &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS: &str = "access-secret-access-secret-access-secret";
    const REFRESH: &str = "refresh-secret-refresh-secret-refresh-secret";
    const RESET: &str = "reset-secret-reset-secret-reset-secret-reset";

    #[test]
    fn test_defaults() {
        let config = AuthConfig::try_new(ACCESS, REFRESH, RESET, "http://localhost:3000").unwrap();
        assert_eq!(config.access_token_ttl, Duration::from_secs(900));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(2_592_000));
        assert_eq!(config.reset_token_ttl, Duration::from_secs(300));
        assert_eq!(config.store_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = AuthConfig::try_new(ACCESS, "too-short", RESET, "http://localhost").unwrap_err();
        assert!(matches!(
            err,
            AuthConfigError::Secret {
                purpose: "refresh",
                ..
            }
        ));
    }

    #[test]
    fn test_shared_secret_rejected() {
        let err = AuthConfig::try_new(ACCESS, REFRESH, ACCESS, "http://localhost").unwrap_err();
        assert!(matches!(err, AuthConfigError::SharedSecret("access", "reset")));
    }

    #[test]
    fn test_reset_link() {
        let config = AuthConfig::try_new(ACCESS, REFRESH, RESET, "https://app.example.com/").unwrap();
        assert_eq!(
            config.reset_link("abc.def.ghi"),
            "https://app.example.com/reset-password?token=abc.def.ghi"
        );
    }

    #[test]
    fn test_builders() {
        let config = AuthConfig::try_new(ACCESS, REFRESH, RESET, "http://localhost")
            .unwrap()
            .with_access_token_ttl(Duration::from_secs(60))
            .with_store_timeout(Duration::from_millis(250));
        assert_eq!(config.access_token_ttl, Duration::from_secs(60));
        assert_eq!(config.store_timeout, Duration::from_millis(250));
    }
}
