use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::api::ErrorResponse;
use crate::error::DbError;
use crate::images::CONTENT_TYPE;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/image/{id}",
    tag = "images",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Raw image bytes", content_type = "image/jpeg"),
        (status = 404, description = "Image not found", body = ErrorResponse)
    )
)]
pub async fn get_image(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match state.db.get_image(id) {
        Ok(data) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE)],
            data,
        )
            .into_response(),
        Err(DbError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Image not found".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to load image {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to load image".to_string(),
                }),
            )
                .into_response()
        }
    }
}
