use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::api::ErrorResponse;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/recipe/category/{category}",
    tag = "recipes",
    params(
        ("category" = String, Path, description = "Category name")
    ),
    responses(
        (status = 200, description = "Ids of recipes in this category", body = Vec<i32>),
        (status = 500, description = "Failed to query category", body = ErrorResponse)
    )
)]
pub async fn recipes_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> impl IntoResponse {
    match state.db.recipes_by_category(&category) {
        Ok(ids) => (StatusCode::OK, Json(ids)).into_response(),
        Err(e) => {
            tracing::error!("Failed to query category {}: {}", category, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to query category".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/category/all",
    tag = "recipes",
    responses(
        (status = 200, description = "All known categories", body = Vec<String>),
        (status = 500, description = "Failed to list categories", body = ErrorResponse)
    )
)]
pub async fn all_categories(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.all_categories() {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(e) => {
            tracing::error!("Failed to list categories: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list categories".to_string(),
                }),
            )
                .into_response()
        }
    }
}
