//! In-memory repositories
//!
//! DashMap-backed stores with the same contracts as the Postgres ones (unique
//! email, delete reports removal). They can be told to fail or hang, which is
//! how store outages are exercised without a database.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{SessionRow, UserRow};
use crate::repo::{CreateSession, CreateUser, SessionRepository, UserRepository};

#[derive(Default)]
struct Faults {
    /// Every call fails with a store error
    unavailable: AtomicBool,
    /// Every call hangs for an hour
    stalled: AtomicBool,
}

impl Faults {
    async fn check(&self) -> DbResult<()> {
        if self.stalled.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

/// In-memory user repository
#[derive(Default, Clone)]
pub struct MemoryUserRepository {
    users: Arc<DashMap<Uuid, UserRow>>,
    by_email: Arc<DashMap<String, Uuid>>,
    faults: Arc<Faults>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a store error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make every call hang
    pub fn set_stalled(&self, stalled: bool) {
        self.faults.stalled.store(stalled, Ordering::SeqCst);
    }

    /// Remove a user directly, bypassing the trait
    pub fn remove_user(&self, id: Uuid) {
        if let Some((_, user)) = self.users.remove(&id) {
            self.by_email.remove(&user.email);
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        self.faults.check().await?;
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        self.faults.check().await?;
        Ok(self
            .by_email
            .get(email)
            .and_then(|id| self.users.get(id.value()).map(|r| r.value().clone())))
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        self.faults.check().await?;
        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(DbError::Conflict("users_email_key".to_string())),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let row = UserRow {
                    id: user.id,
                    name: user.name,
                    email: user.email,
                    password_hash: user.password_hash,
                    created_at: now,
                    updated_at: now,
                };
                self.users.insert(row.id, row.clone());
                slot.insert(row.id);
                Ok(row)
            }
        }
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> DbResult<bool> {
        self.faults.check().await?;
        match self.users.get_mut(&id) {
            Some(mut user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory session repository
#[derive(Default, Clone)]
pub struct MemorySessionRepository {
    sessions: Arc<DashMap<Uuid, SessionRow>>,
    faults: Arc<Faults>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing the trait
    pub fn insert_session(&self, session: SessionRow) {
        self.sessions.insert(session.id, session);
    }

    /// Rewrite a stored session in place; false if it does not exist
    pub fn modify_session(&self, id: Uuid, f: impl FnOnce(&mut SessionRow)) -> bool {
        match self.sessions.get_mut(&id) {
            Some(mut row) => {
                f(&mut row);
                true
            }
            None => false,
        }
    }

    pub fn sessions_for(&self, user_id: Uuid) -> Vec<SessionRow> {
        self.sessions
            .iter()
            .filter(|r| r.value().user_id == user_id)
            .map(|r| r.value().clone())
            .collect()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_stalled(&self, stalled: bool) {
        self.faults.stalled.store(stalled, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn find_by(&self, pred: impl Fn(&SessionRow) -> bool) -> Option<SessionRow> {
        self.sessions
            .iter()
            .find(|r| pred(r.value()))
            .map(|r| r.value().clone())
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn find_by_access_token_hash(&self, hash: &str) -> DbResult<Option<SessionRow>> {
        self.faults.check().await?;
        Ok(self.find_by(|s| s.access_token_hash == hash))
    }

    async fn find_by_refresh_token_hash(&self, hash: &str) -> DbResult<Option<SessionRow>> {
        self.faults.check().await?;
        Ok(self.find_by(|s| s.refresh_token_hash == hash))
    }

    async fn create(&self, session: CreateSession) -> DbResult<SessionRow> {
        self.faults.check().await?;
        let row = SessionRow {
            id: session.id,
            user_id: session.user_id,
            access_token_hash: session.access_token_hash,
            access_token_valid_until: session.access_token_valid_until,
            refresh_token_hash: session.refresh_token_hash,
            refresh_token_valid_until: session.refresh_token_valid_until,
            created_at: Utc::now(),
        };
        self.sessions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        self.faults.check().await?;
        Ok(self.sessions.remove(&id).is_some())
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> DbResult<u64> {
        self.faults.check().await?;
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - self.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        }
    }

    fn new_session(user_id: Uuid, tag: &str) -> CreateSession {
        CreateSession {
            id: Uuid::new_v4(),
            user_id,
            access_token_hash: format!("access-{tag}"),
            access_token_valid_until: Utc::now() + chrono::Duration::minutes(15),
            refresh_token_hash: format!("refresh-{tag}"),
            refresh_token_valid_until: Utc::now() + chrono::Duration::days(30),
        }
    }

    #[tokio::test]
    async fn test_user_repo_crud() {
        let repo = MemoryUserRepository::new();

        let user = repo.create(new_user("test@example.com")).await.unwrap();

        let found = repo.find_by_id(user.id).await.unwrap();
        assert_eq!(found.unwrap().email, "test@example.com");

        assert!(repo.find_by_email("test@example.com").await.unwrap().is_some());
        assert!(repo.find_by_email("TEST@example.com").await.unwrap().is_none());

        assert!(repo.update_password(user.id, "new-hash").await.unwrap());
        let found = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.password_hash, "new-hash");

        assert!(!repo.update_password(Uuid::new_v4(), "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_user_repo_unique_email() {
        let repo = MemoryUserRepository::new();
        repo.create(new_user("dup@example.com")).await.unwrap();
        let err = repo.create(new_user("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_session_repo_crud() {
        let repo = MemorySessionRepository::new();
        let user_id = Uuid::new_v4();

        let session = repo.create(new_session(user_id, "a")).await.unwrap();

        assert!(repo.find_by_access_token_hash("access-a").await.unwrap().is_some());
        assert!(repo.find_by_refresh_token_hash("refresh-a").await.unwrap().is_some());

        assert!(repo.delete(session.id).await.unwrap());
        assert!(!repo.delete(session.id).await.unwrap());
        assert!(repo.find_by_access_token_hash("access-a").await.unwrap().is_none());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_for_user() {
        let repo = MemorySessionRepository::new();
        let user_id = Uuid::new_v4();
        let other = Uuid::new_v4();

        for i in 0..3 {
            repo.create(new_session(user_id, &i.to_string())).await.unwrap();
        }
        repo.create(new_session(other, "other")).await.unwrap();

        assert_eq!(repo.delete_all_for_user(user_id).await.unwrap(), 3);
        assert!(repo.sessions_for(user_id).is_empty());
        assert_eq!(repo.sessions_for(other).len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let repo = MemoryUserRepository::new();
        repo.set_unavailable(true);
        assert!(repo.find_by_email("x@example.com").await.is_err());
        repo.set_unavailable(false);
        assert!(repo.find_by_email("x@example.com").await.is_ok());
    }
}
