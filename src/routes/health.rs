use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "service": "job-board-backend",
    });
    (StatusCode::OK, Json(body))
}
