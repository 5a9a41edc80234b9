use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::background::spawn_image_sweep;
use crate::types::{Recipe, RecipeDraft};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/recipe/create",
    tag = "recipes",
    request_body = RecipeDraft,
    responses(
        (status = 201, description = "Recipe created successfully", body = Recipe),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Failed to create recipe", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(draft): Json<RecipeDraft>,
) -> impl IntoResponse {
    let recipe_id = match state.db.create_recipe(&draft, Some(user.id)) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    // Images the draft stopped referencing become sweepable.
    spawn_image_sweep(&state);

    match state.db.get_recipe(recipe_id) {
        Ok(recipe) => (StatusCode::CREATED, Json(recipe)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load created recipe {}: {}", recipe_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to load created recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
