use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::images::{process_image, MAX_FILE_SIZE};
use crate::AppState;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadImageResponse {
    pub id: i32,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadImageRequest {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/image/create",
    tag = "images",
    request_body(content_type = "multipart/form-data", content = UploadImageRequest),
    responses(
        (status = 201, description = "Image uploaded successfully", body = UploadImageResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_image(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    // Get the file from multipart
    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "No file provided".to_string(),
                }),
            )
                .into_response()
        }
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Failed to read multipart data".to_string(),
                }),
            )
                .into_response()
        }
    };

    let data = match field.bytes().await {
        Ok(bytes) => bytes,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Failed to read file data".to_string(),
                }),
            )
                .into_response()
        }
    };

    if data.len() > MAX_FILE_SIZE {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("File too large. Maximum size is {} bytes", MAX_FILE_SIZE),
            }),
        )
            .into_response();
    }

    let processed = match process_image(&data) {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { error: e }),
            )
                .into_response()
        }
    };

    match state.db.create_image(&processed) {
        Ok(id) => (StatusCode::CREATED, Json(UploadImageResponse { id })).into_response(),
        Err(e) => {
            tracing::error!("Failed to save image: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to save image".to_string(),
                }),
            )
                .into_response()
        }
    }
}
