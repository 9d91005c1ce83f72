//! Axum extractors for authentication

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;

use rolodex_types::{PublicUser, SessionId};

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user extracted from the bearer access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: PublicUser,
    pub session_id: SessionId,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let app_state = AppState::from_ref(state);

            // A header that is not valid UTF-8 counts as missing
            let authorization = parts
                .headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok());

            let authenticated = app_state.auth.authenticate(authorization).await?;

            Ok(AuthUser {
                user: authenticated.user,
                session_id: authenticated.session_id,
            })
        })
    }
}
