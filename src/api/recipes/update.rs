use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::background::spawn_image_sweep;
use crate::types::Recipe;
use crate::AppState;

#[utoipa::path(
    put,
    path = "/recipe/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = Recipe,
    responses(
        (status = 200, description = "Recipe updated successfully", body = Recipe),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Failed to update recipe", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut recipe): Json<Recipe>,
) -> impl IntoResponse {
    // The path wins over whatever id the body carries.
    recipe.id = id;

    match state.db.is_authorized(user.id, id) {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Not authorized to modify this recipe".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Authorization check failed for user {}: {}", user.id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Authorization check failed".to_string(),
                }),
            )
                .into_response();
        }
    }

    if let Err(e) = state.db.update_recipe(&recipe) {
        tracing::error!("Failed to update recipe {}: {}", id, e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to update recipe".to_string(),
            }),
        )
            .into_response();
    }

    // Detached images age out through the sweep.
    spawn_image_sweep(&state);

    match state.db.get_recipe(id) {
        Ok(recipe) => (StatusCode::OK, Json(recipe)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load updated recipe {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to load updated recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
