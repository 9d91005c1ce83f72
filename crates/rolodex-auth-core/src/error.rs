//! Auth errors

use rolodex_db::DbError;
use thiserror::Error;

/// Coarse error classes surfaced at the HTTP boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Duplicate identity
    Conflict,
    /// Bad credentials, bad/expired/revoked token, missing auth header
    Unauthorized,
    /// Password-reset target absent
    NotFound,
    /// Store or mail delivery failure
    ServiceUnavailable,
    /// Misconfiguration or a bug
    Internal,
}

/// Authentication errors
///
/// The `Display` text is for logs. What a client sees is [`AuthError::public_message`],
/// which is fixed per variant so token failures cannot be told apart from outside.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Registration with an email that already exists
    #[error("email already registered")]
    EmailInUse,

    /// Unknown email or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Refresh token failed verification, is unknown, expired or already rotated
    #[error("invalid refresh token")]
    InvalidRefreshToken,

    /// Authorization header absent or not a bearer token
    #[error("missing or malformed authorization header")]
    MissingAuthHeader,

    /// Access token failed verification or its session is gone/expired
    #[error("access token rejected")]
    AccessTokenExpired,

    /// Access token is fine but its user no longer exists
    #[error("authenticated user no longer exists")]
    UnknownUser,

    /// Reset token failed verification
    #[error("invalid reset token")]
    InvalidResetToken,

    /// No user with the given email (password reset)
    #[error("user not found")]
    UserNotFound,

    /// Notification dispatch failed
    #[error("mail delivery failed: {0}")]
    MailDelivery(String),

    /// Store error or timeout
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Error class for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmailInUse => ErrorKind::Conflict,
            Self::InvalidCredentials
            | Self::InvalidRefreshToken
            | Self::MissingAuthHeader
            | Self::AccessTokenExpired
            | Self::UnknownUser
            | Self::InvalidResetToken => ErrorKind::Unauthorized,
            Self::UserNotFound => ErrorKind::NotFound,
            Self::MailDelivery(_) | Self::StoreUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::Configuration(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Conflict => 409,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::Internal => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmailInUse => "EMAIL_IN_USE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::MissingAuthHeader => "MISSING_AUTH_HEADER",
            Self::AccessTokenExpired => "ACCESS_TOKEN_EXPIRED",
            Self::UnknownUser => "UNKNOWN_USER",
            Self::InvalidResetToken => "INVALID_RESET_TOKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::MailDelivery(_) => "MAIL_DELIVERY_FAILED",
            Self::StoreUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-facing message; never includes the internal cause
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::EmailInUse => "Email in use",
            Self::InvalidCredentials => "Invalid credentials",
            Self::InvalidRefreshToken => "Invalid refresh token",
            Self::MissingAuthHeader => "Authorization header missing or invalid",
            Self::AccessTokenExpired => "Access token expired",
            Self::UnknownUser | Self::UserNotFound => "User not found",
            Self::InvalidResetToken => "Token is expired or invalid",
            Self::MailDelivery(_) => "Failed to send the email, please try again later.",
            Self::StoreUnavailable(_) => "Service temporarily unavailable",
            Self::Configuration(_) | Self::Internal(_) => "Internal server error",
        }
    }
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(constraint) if constraint.contains("email") => Self::EmailInUse,
            DbError::Conflict(constraint) => {
                tracing::error!(constraint = %constraint, "Unexpected unique violation");
                Self::Internal(format!("unique violation on {constraint}"))
            }
            other => {
                tracing::error!("Database error: {}", other);
                Self::StoreUnavailable(other.to_string())
            }
        }
    }
}
