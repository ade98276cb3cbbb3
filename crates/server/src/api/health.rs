//! Liveness endpoints.

use axum::Json;
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct RootResponse {
    pub message: &'static str,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Service is running", body = RootResponse))
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "AI Risk Radar API is running",
    })
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Process is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
