//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>>;

    /// Find a user by email (exact, case-sensitive match)
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// Create a new user
    ///
    /// Returns `DbError::Conflict` if the email is already taken.
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;

    /// Replace a user's password hash; returns whether a row was updated
    async fn update_password(&self, id: Uuid, password_hash: &str) -> DbResult<bool>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a session by the digest of its access token
    async fn find_by_access_token_hash(&self, hash: &str) -> DbResult<Option<SessionRow>>;

    /// Find a session by the digest of its refresh token
    async fn find_by_refresh_token_hash(&self, hash: &str) -> DbResult<Option<SessionRow>>;

    /// Create a new session
    async fn create(&self, session: CreateSession) -> DbResult<SessionRow>;

    /// Delete a session; returns whether it existed
    ///
    /// Callers rely on the return value to make refresh tokens single-use:
    /// of two concurrent deletes of the same row, only one sees `true`.
    async fn delete(&self, id: Uuid) -> DbResult<bool>;

    /// Delete all sessions for a user; returns how many were removed
    async fn delete_all_for_user(&self, user_id: Uuid) -> DbResult<u64>;
}

/// Create session input
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub access_token_hash: String,
    pub access_token_valid_until: DateTime<Utc>,
    pub refresh_token_hash: String,
    pub refresh_token_valid_until: DateTime<Utc>,
}
