//! Configuration for the Rolodex API service.

use rolodex_auth_core::{AuthConfig, SmtpSettings};
use std::time::Duration;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

/// Rolodex API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL
    pub database_url: String,

    /// Maximum pooled database connections
    pub db_max_connections: u32,

    /// Deployment environment; production marks cookies `Secure`
    pub app_env: AppEnv,

    /// Auth core configuration
    pub auth: AuthConfig,

    /// Request timeout for non-health routes
    pub request_timeout: Duration,

    /// SMTP relay; required in production, reset mail is only logged when absent
    pub smtp: Option<SmtpSettings>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Database
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let db_max_connections = parse_or(&get, "DB_MAX_CONNECTIONS", 10)?;

        // Server
        let http_port = parse_or(&get, "HTTP_PORT", 3000)?;
        let request_timeout_secs: u64 = parse_or(&get, "REQUEST_TIMEOUT_SECS", 30)?;

        let app_env = match get("APP_ENV").as_deref() {
            None | Some("development") | Some("dev") | Some("test") => AppEnv::Development,
            Some("production") | Some("prod") => AppEnv::Production,
            Some(_) => return Err(ConfigError::Invalid("APP_ENV")),
        };
        let app_domain = get("APP_DOMAIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // Token secrets, one per purpose
        let access_secret = get("JWT_ACCESS_SECRET")
            .or_else(|| get("JWT_SECRET"))
            .ok_or(ConfigError::Missing("JWT_ACCESS_SECRET"))?;
        let refresh_secret =
            get("JWT_REFRESH_SECRET").ok_or(ConfigError::Missing("JWT_REFRESH_SECRET"))?;
        let reset_secret = get("JWT_RESET_SECRET").ok_or(ConfigError::Missing("JWT_RESET_SECRET"))?;

        // Lifetimes
        let access_ttl: u64 = parse_or(&get, "ACCESS_TOKEN_TTL_SECS", 15 * 60)?;
        let refresh_ttl: u64 = parse_or(&get, "REFRESH_TOKEN_TTL_SECS", 30 * 24 * 60 * 60)?;
        let reset_ttl: u64 = parse_or(&get, "RESET_TOKEN_TTL_SECS", 5 * 60)?;
        let store_timeout_secs: u64 = parse_or(&get, "STORE_TIMEOUT_SECS", 5)?;

        let auth = AuthConfig::try_new(&access_secret, &refresh_secret, &reset_secret, app_domain)
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?
            .with_access_token_ttl(Duration::from_secs(access_ttl))
            .with_refresh_token_ttl(Duration::from_secs(refresh_ttl))
            .with_reset_token_ttl(Duration::from_secs(reset_ttl))
            .with_store_timeout(Duration::from_secs(store_timeout_secs));

        // Mail
        let smtp = match get("SMTP_HOST") {
            Some(host) => Some(SmtpSettings {
                host,
                port: parse_or(&get, "SMTP_PORT", 587)?,
                username: get("SMTP_USER").ok_or(ConfigError::Missing("SMTP_USER"))?,
                password: get("SMTP_PASSWORD").ok_or(ConfigError::Missing("SMTP_PASSWORD"))?,
                from_address: get("SMTP_FROM").ok_or(ConfigError::Missing("SMTP_FROM"))?,
            }),
            // Reset links must never be left to the log in production
            None if app_env == AppEnv::Production => {
                return Err(ConfigError::Missing("SMTP_HOST"));
            }
            None => None,
        };

        Ok(Self {
            http_port,
            database_url,
            db_max_connections,
            app_env,
            auth,
            request_timeout: Duration::from_secs(request_timeout_secs),
            smtp,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(String),
}
