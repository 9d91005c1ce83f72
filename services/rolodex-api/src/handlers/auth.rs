//! Authentication handlers (register, login, refresh, logout, password reset, me)

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use rolodex_auth_core::AuthError;
use rolodex_types::{ApiResponse, PublicUser};
use serde::{Deserialize, Serialize};

use crate::cookies::{clear_refresh_cookie, read_cookie, refresh_cookie, REFRESH_COOKIE};
use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthUser;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SendResetEmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = body?;
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Name, email and password are required"));
    }

    let user = state
        .auth
        .register(&req.name, &req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED.as_u16(),
            "Successfully registered a user!",
            user,
        )),
    ))
}

/// POST /auth/login
///
/// Returns both tokens and also sets the refresh token cookie
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = body?;
    let pair = state.auth.login(&req.email, &req.password).await?;

    let cookie = refresh_cookie(
        &pair.refresh_token,
        state.config.auth.refresh_token_ttl,
        state.secure_cookies(),
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::new(
            StatusCode::OK.as_u16(),
            "Successfully logged in an user!",
            LoginResponse {
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
        )),
    ))
}

/// POST /auth/refresh
///
/// Reads the refresh token from the cookie, falling back to the JSON body.
/// The rotated refresh token is only returned in the cookie.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult<impl IntoResponse> {
    let token = read_cookie(&headers, REFRESH_COOKIE)
        .or_else(|| body.and_then(|Json(req)| req.refresh_token))
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Auth(AuthError::InvalidRefreshToken))?;

    let pair = state.auth.refresh(&token).await?;

    let cookie = refresh_cookie(
        &pair.refresh_token,
        state.config.auth.refresh_token_ttl,
        state.secure_cookies(),
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::new(
            StatusCode::OK.as_u16(),
            "Successfully refreshed a session!",
            RefreshResponse {
                access_token: pair.access_token,
            },
        )),
    ))
}

/// POST /auth/logout
///
/// Deletes the caller's session and clears the refresh cookie
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    state.auth.logout(auth_user.session_id).await?;

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_refresh_cookie(state.secure_cookies()))],
    ))
}

/// POST /auth/send-reset-email
pub async fn send_reset_email(
    State(state): State<AppState>,
    body: Result<Json<SendResetEmailRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let Json(req) = body?;
    state.auth.request_password_reset(&req.email).await?;

    Ok(Json(ApiResponse::message(
        StatusCode::OK.as_u16(),
        "Reset password email has been successfully sent.",
    )))
}

/// POST /auth/reset-pwd
pub async fn reset_password(
    State(state): State<AppState>,
    body: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let Json(req) = body?;
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required"));
    }

    state.auth.reset_password(&req.token, &req.password).await?;

    Ok(Json(ApiResponse::message(
        StatusCode::OK.as_u16(),
        "Password has been successfully reset.",
    )))
}

/// GET /auth/me
pub async fn me(auth_user: AuthUser) -> Json<ApiResponse<PublicUser>> {
    Json(ApiResponse::new(
        StatusCode::OK.as_u16(),
        "Successfully found the current user!",
        auth_user.user,
    ))
}
