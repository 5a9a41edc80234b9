use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::Query;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::ErrorResponse;
use crate::types::{ListQuery, RecipeListing, SortBy, SortOrder};
use crate::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListParams {
    pub limit: Option<i64>,
    /// 1-indexed page, applied only together with limit.
    pub page: Option<i64>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FilterParams {
    pub limit: Option<i64>,
    pub page: Option<i64>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Repeated parameter; a recipe must carry every listed category.
    #[serde(default)]
    pub categories: Vec<String>,
    pub search: Option<String>,
}

fn list_response(state: &AppState, query: ListQuery) -> axum::response::Response {
    match state.db.list_recipes(&query) {
        Ok(listings) => (StatusCode::OK, Json(listings)).into_response(),
        Err(e) => {
            tracing::error!("Failed to list recipes: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list recipes".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/recipe/all",
    tag = "recipes",
    params(ListParams),
    responses(
        (status = 200, description = "Recipe listings", body = Vec<RecipeListing>),
        (status = 500, description = "Failed to list recipes", body = ErrorResponse)
    )
)]
pub async fn all_recipes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    list_response(
        &state,
        ListQuery {
            limit: params.limit,
            page: params.page,
            search: None,
            categories: Vec::new(),
            sort_by: params.sort_by,
            sort_order: params.sort_order,
        },
    )
}

#[utoipa::path(
    get,
    path = "/recipe/filtered",
    tag = "recipes",
    params(FilterParams),
    responses(
        (status = 200, description = "Filtered recipe listings", body = Vec<RecipeListing>),
        (status = 500, description = "Failed to list recipes", body = ErrorResponse)
    )
)]
pub async fn filtered_recipes(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> impl IntoResponse {
    list_response(
        &state,
        ListQuery {
            limit: params.limit,
            page: params.page,
            search: params.search,
            categories: params.categories,
            sort_by: params.sort_by,
            sort_order: params.sort_order,
        },
    )
}
