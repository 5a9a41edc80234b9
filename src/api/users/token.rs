use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::ErrorResponse;
use crate::auth::{create_access_token, verify_password};
use crate::AppState;

/// OAuth2-style password grant form.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Authorization {
    pub access_token: String,
    pub token_type: String,
    pub user_id: i32,
    pub is_admin: bool,
    pub disabled: bool,
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(ErrorResponse {
            error: "Incorrect username or password".to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/token",
    tag = "users",
    request_body(content_type = "application/x-www-form-urlencoded", content = TokenRequest),
    responses(
        (status = 200, description = "Login successful", body = Authorization),
        (status = 400, description = "Inactive user", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(req): Form<TokenRequest>,
) -> impl IntoResponse {
    let user = match state.db.get_user_by_username(&req.username) {
        Ok(user) => user,
        Err(_) => return invalid_credentials(),
    };

    if !verify_password(&req.password, &user.password_hash) {
        return invalid_credentials();
    }

    if user.disabled {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Inactive user".to_string(),
            }),
        )
            .into_response();
    }

    let access_token = match create_access_token(user.id, &state.config.jwt_secret) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to sign access token: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create access token".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(Authorization {
            access_token,
            token_type: "bearer".to_string(),
            user_id: user.id,
            is_admin: user.is_admin,
            disabled: user.disabled,
        }),
    )
        .into_response()
}
