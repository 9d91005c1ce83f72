//! Error types for the Rolodex API service.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rolodex_auth_core::{AuthError, ErrorKind};
use rolodex_types::ApiErrorBody;

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(&'static str),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err.kind() {
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::Auth(err) => err.error_code(),
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            Self::BadRequest(message) => message,
            Self::InvalidBody(_) => "Invalid request body",
            Self::Auth(err) => err.public_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log server-side faults with their cause; client errors are routine
        if status.is_server_error() {
            tracing::error!(error = %self, "API error");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ApiErrorBody::new(status.as_u16(), self.error_code(), self.public_message());
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_auth_errors_map_by_kind() {
        let cases = [
            (AuthError::EmailInUse, StatusCode::CONFLICT, "Email in use"),
            (
                AuthError::InvalidCredentials,
                StatusCode::UNAUTHORIZED,
                "Invalid credentials",
            ),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND, "User not found"),
            (
                AuthError::StoreUnavailable("pool timed out".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
            ),
        ];

        for (err, status, message) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
            let json = body_json(response).await;
            assert_eq!(json["status"], status.as_u16());
            assert_eq!(json["message"], message);
            assert!(json["error"]["code"].is_string());
        }
    }

    #[tokio::test]
    async fn test_internal_cause_not_rendered() {
        let response =
            ApiError::from(AuthError::Internal("secret detail".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(!json.to_string().contains("secret detail"));
    }
}
