//! Common test utilities for rolodex-auth-core integration tests

pub mod notifier;

use std::sync::Arc;

use rolodex_auth_core::{Argon2Hasher, AuthConfig, PasswordHasher, SessionManager};

#[allow(unused_imports)]
pub use rolodex_db::memory::{MemorySessionRepository, MemoryUserRepository};
#[allow(unused_imports)]
pub use notifier::{RecordingNotifier, SentMail};

pub const ACCESS_SECRET: &str = "test-access-secret-that-is-at-least-32-bytes";
pub const REFRESH_SECRET: &str = "test-refresh-secret-that-is-at-least-32-bytes";
pub const RESET_SECRET: &str = "test-reset-secret-that-is-at-least-32-bytes!";

#[allow(dead_code)]
pub type TestManager = SessionManager<MemoryUserRepository, MemorySessionRepository>;

/// A manager over in-memory stores, plus handles to those stores
#[allow(dead_code)]
pub struct Harness {
    pub manager: TestManager,
    pub users: MemoryUserRepository,
    pub sessions: MemorySessionRepository,
    pub notifier: RecordingNotifier,
}

#[allow(dead_code)]
pub fn test_config() -> AuthConfig {
    AuthConfig::try_new(
        ACCESS_SECRET,
        REFRESH_SECRET,
        RESET_SECRET,
        "https://rolodex.test",
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn harness() -> Harness {
    harness_with(test_config())
}

#[allow(dead_code)]
pub fn harness_with(config: AuthConfig) -> Harness {
    harness_with_hasher(config, Arc::new(fast_hasher()))
}

/// Minimum argon2 cost keeps the suite fast
#[allow(dead_code)]
pub fn fast_hasher() -> Argon2Hasher {
    Argon2Hasher::with_params(8, 1, 1).unwrap()
}

#[allow(dead_code)]
pub fn harness_with_hasher(config: AuthConfig, hasher: Arc<dyn PasswordHasher>) -> Harness {
    let users = MemoryUserRepository::new();
    let sessions = MemorySessionRepository::new();
    let notifier = RecordingNotifier::new();
    let manager = SessionManager::new(
        config,
        Arc::new(users.clone()),
        Arc::new(sessions.clone()),
        hasher,
        Arc::new(notifier.clone()),
    );
    Harness {
        manager,
        users,
        sessions,
        notifier,
    }
}

#[allow(dead_code)]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
