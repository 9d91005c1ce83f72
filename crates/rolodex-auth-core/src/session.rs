//! Session lifecycle: registration, login, refresh rotation, logout and password reset
//!
//! Sessions store SHA-256 digests of their tokens, never the tokens themselves.
//! Expiry is checked lazily on every lookup; nothing sweeps stale rows.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;
use rolodex_db::{CreateSession, CreateUser, DbResult, SessionRepository, UserRepository};
use rolodex_types::{PublicUser, Session, SessionId, TokenPair, UserId};

use crate::crypto::{constant_time_eq, hash_token};
use crate::notify::Notifier;
use crate::password::PasswordHasher;
use crate::token::{TokenCodec, TokenPurpose};
use crate::{AuthConfig, AuthError};

/// Subject line of the password reset mail
pub const RESET_EMAIL_SUBJECT: &str = "Reset your password";

/// Verified against when a login names an unknown email
const DECOY_PASSWORD: &str = "rolodex-decoy-password";

/// Session manager handles user credentials and the sessions minted for them
///
/// Repositories may be concrete or `dyn` trait objects.
pub struct SessionManager<U: UserRepository + ?Sized, S: SessionRepository + ?Sized> {
    config: AuthConfig,
    codec: TokenCodec,
    users: Arc<U>,
    sessions: Arc<S>,
    hasher: Arc<dyn PasswordHasher>,
    notifier: Arc<dyn Notifier>,
    decoy_hash: OnceCell<String>,
}

impl<U: UserRepository + ?Sized, S: SessionRepository + ?Sized> SessionManager<U, S> {
    /// Create a new session manager
    pub fn new(
        config: AuthConfig,
        users: Arc<U>,
        sessions: Arc<S>,
        hasher: Arc<dyn PasswordHasher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            codec: TokenCodec::new(&config),
            config,
            users,
            sessions,
            hasher,
            notifier,
            decoy_hash: OnceCell::new(),
        }
    }

    pub(crate) fn users(&self) -> &U {
        &self.users
    }

    /// Run a store call under the configured timeout
    pub(crate) async fn store<T>(
        &self,
        op: &'static str,
        call: impl Future<Output = DbResult<T>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(result) => result.map_err(|e| {
                tracing::warn!(op, "Store call failed");
                AuthError::from(e)
            }),
            Err(_) => {
                tracing::error!(op, timeout = ?self.config.store_timeout, "Store call timed out");
                Err(AuthError::StoreUnavailable(format!("{op} timed out")))
            }
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(&self, hash: String, password: String) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))
    }

    /// Hash of `DECOY_PASSWORD`, computed by the first caller
    async fn decoy_hash(&self) -> Result<String, AuthError> {
        self.decoy_hash
            .get_or_try_init(|| self.hash_password(DECOY_PASSWORD.to_string()))
            .await
            .cloned()
    }

    // =========================================================================
    // Credentials
    // =========================================================================

    /// Register a new user
    ///
    /// The email is matched exactly; a racing duplicate that slips past the
    /// lookup is caught by the unique index and still reported as `EmailInUse`.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, AuthError> {
        if self
            .store("find_user_by_email", self.users.find_by_email(email))
            .await?
            .is_some()
        {
            tracing::debug!("Registration rejected: email in use");
            return Err(AuthError::EmailInUse);
        }

        let password_hash = self.hash_password(password.to_string()).await?;
        let row = self
            .store(
                "create_user",
                self.users.create(CreateUser {
                    id: UserId::new().0,
                    name: name.to_string(),
                    email: email.to_string(),
                    password_hash,
                }),
            )
            .await?;

        tracing::info!(user_id = %row.id, "User registered");
        Ok(row.to_public())
    }

    /// Log in with email and password
    ///
    /// Deletes every existing session of the user before creating the new one.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some(user) = self
            .store("find_user_by_email", self.users.find_by_email(email))
            .await?
        else {
            // Same verification cost as a wrong password
            let decoy = self.decoy_hash().await?;
            self.verify_password(decoy, password.to_string()).await?;
            tracing::debug!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .verify_password(user.password_hash.clone(), password.to_string())
            .await?
        {
            tracing::debug!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let revoked = self
            .store(
                "delete_sessions_for_user",
                self.sessions.delete_all_for_user(user.id),
            )
            .await?;
        if revoked > 0 {
            tracing::debug!(user_id = %user.id, revoked, "Replaced previous sessions");
        }

        let pair = self.create_session(user.user_id()).await?;
        tracing::info!(user_id = %user.id, session_id = %pair.session_id, "User logged in");
        Ok(pair)
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Issue a token pair for `user_id` and persist it as a new session
    async fn create_session(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        let subject = user_id.to_string();
        let access = self.codec.issue(&subject, TokenPurpose::Access)?;
        let refresh = self.codec.issue(&subject, TokenPurpose::Refresh)?;
        let session_id = SessionId::new();

        self.store(
            "create_session",
            self.sessions.create(CreateSession {
                id: session_id.0,
                user_id: user_id.0,
                access_token_hash: hash_token(&access.token),
                access_token_valid_until: access.expires_at,
                refresh_token_hash: hash_token(&refresh.token),
                refresh_token_valid_until: refresh.expires_at,
            }),
        )
        .await?;

        Ok(TokenPair {
            session_id,
            access_token: access.token,
            access_token_valid_until: access.expires_at,
            refresh_token: refresh.token,
            refresh_token_valid_until: refresh.expires_at,
        })
    }

    /// Exchange a refresh token for a new token pair
    ///
    /// The presented session is deleted before the new one is created, so each
    /// refresh token works once. When two calls race on the same token only the
    /// one whose delete removed the row gets a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let subject = self
            .codec
            .verify(refresh_token, TokenPurpose::Refresh)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let digest = hash_token(refresh_token);
        let session: Session = self
            .store(
                "find_session_by_refresh_token",
                self.sessions.find_by_refresh_token_hash(&digest),
            )
            .await?
            .ok_or_else(|| {
                tracing::debug!("Refresh token has no session");
                AuthError::InvalidRefreshToken
            })?
            .into();

        if !constant_time_eq(session.refresh_token_hash.as_bytes(), digest.as_bytes())
            || UserId::parse(&subject).ok() != Some(session.user_id)
        {
            tracing::warn!(session_id = %session.id, "Refresh token does not match its session");
            return Err(AuthError::InvalidRefreshToken);
        }

        if !session.is_refresh_valid_at(Utc::now()) {
            tracing::debug!(session_id = %session.id, "Refresh window elapsed");
            return Err(AuthError::InvalidRefreshToken);
        }

        let removed = self
            .store("delete_session", self.sessions.delete(session.id.0))
            .await?;
        if !removed {
            tracing::debug!(session_id = %session.id, "Refresh lost race for session");
            return Err(AuthError::InvalidRefreshToken);
        }

        let pair = self.create_session(session.user_id).await?;
        tracing::info!(
            user_id = %session.user_id,
            old_session_id = %session.id,
            session_id = %pair.session_id,
            "Session refreshed"
        );
        Ok(pair)
    }

    /// Resolve an access token to its live session
    pub(crate) async fn validate_access(&self, access_token: &str) -> Result<Session, AuthError> {
        let subject = self
            .codec
            .verify(access_token, TokenPurpose::Access)
            .map_err(|_| AuthError::AccessTokenExpired)?;

        let digest = hash_token(access_token);
        let session: Session = self
            .store(
                "find_session_by_access_token",
                self.sessions.find_by_access_token_hash(&digest),
            )
            .await?
            .ok_or_else(|| {
                tracing::debug!("Access token has no session");
                AuthError::AccessTokenExpired
            })?
            .into();

        if !constant_time_eq(session.access_token_hash.as_bytes(), digest.as_bytes())
            || UserId::parse(&subject).ok() != Some(session.user_id)
        {
            tracing::warn!(session_id = %session.id, "Access token does not match its session");
            return Err(AuthError::AccessTokenExpired);
        }

        if !session.is_access_valid_at(Utc::now()) {
            tracing::debug!(session_id = %session.id, "Access window elapsed");
            return Err(AuthError::AccessTokenExpired);
        }

        Ok(session)
    }

    /// Delete a session; returns whether it still existed
    ///
    /// Logging out twice is not an error.
    pub async fn logout(&self, session_id: SessionId) -> Result<bool, AuthError> {
        let removed = self
            .store("delete_session", self.sessions.delete(session_id.0))
            .await?;
        if removed {
            tracing::info!(session_id = %session_id, "Session logged out");
        } else {
            tracing::debug!(session_id = %session_id, "Logout for absent session");
        }
        Ok(removed)
    }

    // =========================================================================
    // Password reset
    // =========================================================================

    /// Mail a password reset link to `email`
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let user = self
            .store("find_user_by_email", self.users.find_by_email(email))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let reset = self.codec.issue(&user.email, TokenPurpose::ResetPassword)?;
        let link = self.config.reset_link(&reset.token);
        let body = format!(
            "Hello {},\n\nFollow this link to reset your password:\n{}\n\n\
             The link expires in {} minutes. If you did not ask for a reset, ignore this message.\n",
            user.name,
            link,
            self.config.reset_token_ttl.as_secs() / 60,
        );

        self.notifier
            .send(&user.email, RESET_EMAIL_SUBJECT, &body)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, "Failed to send reset email: {}", e);
                AuthError::MailDelivery(e.to_string())
            })?;

        tracing::info!(user_id = %user.id, "Password reset email sent");
        Ok(())
    }

    /// Set a new password using a reset token; every session of the user is deleted
    pub async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email = self
            .codec
            .verify(reset_token, TokenPurpose::ResetPassword)
            .map_err(|_| AuthError::InvalidResetToken)?;

        let user = self
            .store("find_user_by_email", self.users.find_by_email(&email))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password_hash = self.hash_password(new_password.to_string()).await?;
        let updated = self
            .store(
                "update_password",
                self.users.update_password(user.id, &password_hash),
            )
            .await?;
        if !updated {
            return Err(AuthError::UserNotFound);
        }

        let revoked = self
            .store(
                "delete_sessions_for_user",
                self.sessions.delete_all_for_user(user.id),
            )
            .await?;

        tracing::info!(user_id = %user.id, revoked, "Password reset");
        Ok(())
    }
}
