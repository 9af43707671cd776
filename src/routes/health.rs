use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Process is up")
    )
)]
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "status": "ok",
    });
    (StatusCode::OK, Json(body))
}

/// Aggregate check of PostgreSQL, Redis and Elasticsearch.
#[utoipa::path(
    get,
    path = "/users/health",
    responses(
        (status = 200, description = "All backing stores reachable"),
        (status = 503, description = "One or more backing stores down")
    )
)]
#[axum::debug_handler]
pub async fn services_health(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let status = state.health_service.check().await;
    if !status.is_healthy() {
        return Err(Error::ServiceUnavailable(
            "One or more backing services are down".to_string(),
        ));
    }
    Ok(Json(json!({ "status": "All services are up" })))
}

#[utoipa::path(
    get,
    path = "/users/health-details",
    responses(
        (status = 200, description = "Per-store status, all connected"),
        (status = 503, description = "Per-store status, at least one failed")
    )
)]
#[axum::debug_handler]
pub async fn services_health_details(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.health_service.check().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}
