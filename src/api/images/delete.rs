use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::error::DbError;
use crate::AppState;

#[utoipa::path(
    delete,
    path = "/image/{id}",
    tag = "images",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 204, description = "Image deleted successfully"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_image(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.db.delete_image(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(DbError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Image not found".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to delete image {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to delete image".to_string(),
                }),
            )
                .into_response()
        }
    }
}
