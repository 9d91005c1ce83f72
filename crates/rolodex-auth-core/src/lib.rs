//! Rolodex Auth Core - Authentication business logic
//!
//! Token issuing and verification, password hashing, session lifecycle
//! (register, login, refresh rotation, logout, password reset) and
//! per-request authentication.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rolodex_auth_core::{Argon2Hasher, AuthConfig, LogNotifier, SessionManager};
//!
//! let config = AuthConfig::try_new(access_secret, refresh_secret, reset_secret, "https://app.example.com")?;
//! let manager = SessionManager::new(
//!     config,
//!     Arc::new(repos.users),
//!     Arc::new(repos.sessions),
//!     Arc::new(Argon2Hasher::new()),
//!     Arc::new(LogNotifier),
//! );
//!
//! let pair = manager.login("user@example.com", "hunter2").await?;
//! let auth = manager.authenticate(Some(&format!("Bearer {}", pair.access_token))).await?;
//! ```

pub mod authenticator;
pub mod config;
pub mod crypto;
pub mod error;
pub mod notify;
pub mod password;
pub mod session;
pub mod token;

pub use authenticator::{bearer_token, Authenticated};
pub use config::{AuthConfig, AuthConfigError};
pub use crypto::{constant_time_eq, hash_token, SecretError, SigningSecret};
pub use error::{AuthError, ErrorKind};
pub use notify::{LogNotifier, Notifier, NotifyError, SmtpNotifier, SmtpSettings};
pub use password::{Argon2Hasher, PasswordHasher};
pub use session::{SessionManager, RESET_EMAIL_SUBJECT};
pub use token::{InvalidToken, IssuedToken, TokenClaims, TokenCodec, TokenPurpose};
