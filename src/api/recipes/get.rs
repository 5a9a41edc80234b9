use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::api::ErrorResponse;
use crate::background::spawn_click_increment;
use crate::error::DbError;
use crate::types::Recipe;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/recipe/specific/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = Recipe),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Failed to load recipe", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let recipe = match state.db.get_recipe(id) {
        Ok(r) => r,
        Err(DbError::NotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to load recipe {}: {}", id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to load recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    // The popularity counter must never delay or fail the read.
    spawn_click_increment(&state, id);

    (StatusCode::OK, Json(recipe)).into_response()
}
