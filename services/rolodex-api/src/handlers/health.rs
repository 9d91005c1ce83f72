//! Health check and index handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rolodex_types::ApiResponse;
use serde::Serialize;
use std::time::Instant;

use crate::state::AppState;

const SERVICE: &str = "rolodex-api";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub checks: ReadyChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadyChecks {
    pub database: CheckResult,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct Endpoint {
    pub method: &'static str,
    pub path: &'static str,
    pub auth: bool,
}

/// Routes served by this binary, as listed by `GET /`
pub const ENDPOINTS: &[Endpoint] = &[
    Endpoint { method: "POST", path: "/auth/register", auth: false },
    Endpoint { method: "POST", path: "/auth/login", auth: false },
    Endpoint { method: "POST", path: "/auth/refresh", auth: false },
    Endpoint { method: "POST", path: "/auth/logout", auth: true },
    Endpoint { method: "POST", path: "/auth/send-reset-email", auth: false },
    Endpoint { method: "POST", path: "/auth/reset-pwd", auth: false },
    Endpoint { method: "GET", path: "/auth/me", auth: true },
    Endpoint { method: "GET", path: "/health", auth: false },
    Endpoint { method: "GET", path: "/ready", auth: false },
];

/// GET / - Endpoint listing
pub async fn index() -> Json<ApiResponse<&'static [Endpoint]>> {
    Json(ApiResponse::new(
        StatusCode::OK.as_u16(),
        "Welcome to the Rolodex API",
        ENDPOINTS,
    ))
}

/// GET /health - Liveness probe (fast, no dependencies)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE,
    })
}

/// GET /ready - Readiness probe (checks DB connectivity)
pub async fn ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, StatusCode> {
    let start = Instant::now();

    let db_result = sqlx::query("SELECT 1").fetch_one(&*state.pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match db_result {
        Ok(_) => Ok(Json(ReadyResponse {
            status: "ready",
            service: SERVICE,
            checks: ReadyChecks {
                database: CheckResult {
                    status: "ok",
                    latency_ms,
                },
            },
        })),
        Err(e) => {
            tracing::warn!(latency_ms, "Readiness check failed: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
