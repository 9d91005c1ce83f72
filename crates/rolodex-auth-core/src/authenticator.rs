//! Per-request authentication from a bearer access token

use rolodex_db::{SessionRepository, UserRepository};
use rolodex_types::{PublicUser, SessionId};

use crate::session::SessionManager;
use crate::AuthError;

/// Identity attached to an authenticated request
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: PublicUser,
    pub session_id: SessionId,
}

/// Extract the token from an `Authorization: Bearer <token>` header value
///
/// The scheme is matched case-sensitively, as issued by clients of this service.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingAuthHeader)?;
    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::MissingAuthHeader)?;
    let token = token.trim();

    if scheme != "Bearer" || token.is_empty() || token.contains(' ') {
        return Err(AuthError::MissingAuthHeader);
    }
    Ok(token)
}

impl<U: UserRepository + ?Sized, S: SessionRepository + ?Sized> SessionManager<U, S> {
    /// Authenticate a request from its raw `Authorization` header value
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Authenticated, AuthError> {
        let token = bearer_token(authorization)?;
        let session = self.validate_access(token).await?;

        let user = self
            .store("find_user_by_id", self.users().find_by_id(session.user_id.0))
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %session.user_id, "Session owner no longer exists");
                AuthError::UnknownUser
            })?;

        Ok(Authenticated {
            user: user.to_public(),
            session_id: session.id,
        })
    }
}
