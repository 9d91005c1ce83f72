//! Session and token types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UserId;

/// Unique session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// One active login.
///
/// Token values are held as SHA-256 digests; the raw tokens only ever exist
/// in the response that issued them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub access_token_hash: String,
    pub access_token_valid_until: DateTime<Utc>,
    pub refresh_token_hash: String,
    pub refresh_token_valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Whether the access token may still gate requests at `now`
    pub fn is_access_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.access_token_valid_until
    }

    /// Whether the refresh token may still be exchanged at `now`
    pub fn is_refresh_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.refresh_token_valid_until
    }
}

/// Token pair returned after login or refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Session the pair belongs to
    pub session_id: SessionId,
    /// Access token (short-lived)
    pub access_token: String,
    pub access_token_valid_until: DateTime<Utc>,
    /// Refresh token (long-lived)
    pub refresh_token: String,
    pub refresh_token_valid_until: DateTime<Utc>,
}
