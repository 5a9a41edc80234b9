use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::ErrorResponse;
use crate::auth::{hash_password, AuthUser};
use crate::error::DbError;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
}

#[utoipa::path(
    post,
    path = "/user/create",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = CreateUserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Username already exists", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_user(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    // Only admins may provision accounts.
    if !caller.is_admin {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Admin privileges required".to_string(),
            }),
        )
            .into_response();
    }

    let password_hash = match hash_password(&req.password) {
        Ok(h) => h,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to hash password".to_string(),
                }),
            )
                .into_response()
        }
    };

    match state.db.create_user(&req.username, &password_hash, req.is_admin) {
        Ok(user) => (
            StatusCode::CREATED,
            Json(CreateUserResponse {
                id: user.id,
                username: user.username,
                is_admin: user.is_admin,
            }),
        )
            .into_response(),
        Err(DbError::DuplicateUser(_)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "Username already exists".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to create user: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create user".to_string(),
                }),
            )
                .into_response()
        }
    }
}
