//! Signed, expiring tokens with per-purpose secrets

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::SigningSecret;
use crate::{AuthConfig, AuthError};

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    Refresh,
    ResetPassword,
}

impl TokenPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::ResetPassword => "reset_password",
        }
    }
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims carried by every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id for access/refresh tokens, email for reset tokens
    pub sub: String,
    pub purpose: TokenPurpose,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration (seconds since epoch)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// A freshly signed token and the instant it stops verifying
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Token failed verification.
///
/// Bad signature, malformed payload, wrong purpose and expiry all collapse
/// into this one error; the specific reason is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid token")]
pub struct InvalidToken;

struct PurposeKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: ChronoDuration,
}

impl PurposeKeys {
    fn new(secret: &SigningSecret, ttl: std::time::Duration) -> Self {
        Self {
            encoding: secret.encoding_key(),
            decoding: secret.decoding_key(),
            // Out-of-range lifetimes are clamped to ten years.
            ttl: ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::days(3650)),
        }
    }
}

/// Issues and verifies HS256 tokens, one secret per purpose
pub struct TokenCodec {
    access: PurposeKeys,
    refresh: PurposeKeys,
    reset: PurposeKeys,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec from validated config
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access: PurposeKeys::new(&config.access_secret, config.access_token_ttl),
            refresh: PurposeKeys::new(&config.refresh_secret, config.refresh_token_ttl),
            reset: PurposeKeys::new(&config.reset_secret, config.reset_token_ttl),
            validation,
        }
    }

    fn keys(&self, purpose: TokenPurpose) -> &PurposeKeys {
        match purpose {
            TokenPurpose::Access => &self.access,
            TokenPurpose::Refresh => &self.refresh,
            TokenPurpose::ResetPassword => &self.reset,
        }
    }

    /// Sign a token for `subject` that expires after the purpose's lifetime
    pub fn issue(&self, subject: &str, purpose: TokenPurpose) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let expires_at = now + self.keys(purpose).ttl;
        let claims = TokenClaims {
            sub: subject.to_string(),
            purpose,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = self.sign(&claims)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Sign arbitrary claims with the key for `claims.purpose`
    pub(crate) fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.keys(claims.purpose).encoding,
        )
        .map_err(|e| {
            tracing::error!(purpose = %claims.purpose, "Failed to sign token: {}", e);
            AuthError::Internal("Failed to sign token".to_string())
        })
    }

    /// Verify a token for `purpose` and return its subject
    pub fn verify(&self, token: &str, purpose: TokenPurpose) -> Result<String, InvalidToken> {
        let data = decode::<TokenClaims>(token, &self.keys(purpose).decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(purpose = %purpose, "Token rejected: {}", e);
                InvalidToken
            })?;

        if data.claims.purpose != purpose {
            tracing::debug!(
                expected = %purpose,
                actual = %data.claims.purpose,
                "Token purpose mismatch"
            );
            return Err(InvalidToken);
        }

        Ok(data.claims.sub)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .field("reset_ttl", &self.reset.ttl)
            .finish_non_exhaustive()
    }
}
