//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use rolodex_types::{PublicUser, Session, SessionId, UserId};
use sqlx::FromRow;
use uuid::Uuid;

/// User row from the database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub access_token_hash: String,
    pub access_token_valid_until: DateTime<Utc>,
    pub refresh_token_hash: String,
    pub refresh_token_valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    /// Public projection, without the password hash
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.user_id(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            id: SessionId(row.id),
            user_id: UserId(row.user_id),
            access_token_hash: row.access_token_hash,
            access_token_valid_until: row.access_token_valid_until,
            refresh_token_hash: row.refresh_token_hash,
            refresh_token_valid_until: row.refresh_token_valid_until,
            created_at: row.created_at,
        }
    }
}
