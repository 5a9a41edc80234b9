pub mod categories;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use axum::routing::{get, post, put};
use axum::Router;
use utoipa::OpenApi;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipe/create", post(create::create_recipe))
        .route("/recipe/specific/{id}", get(get::get_recipe))
        .route("/recipe/all", get(list::all_recipes))
        .route("/recipe/filtered", get(list::filtered_recipes))
        .route(
            "/recipe/{id}",
            put(update::update_recipe).delete(delete::delete_recipe),
        )
        .route(
            "/recipe/category/{category}",
            get(categories::recipes_by_category),
        )
        .route("/category/all", get(categories::all_categories))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        get::get_recipe,
        list::all_recipes,
        list::filtered_recipes,
        update::update_recipe,
        delete::delete_recipe,
        categories::recipes_by_category,
        categories::all_categories,
    ),
    components(schemas(
        crate::types::RecipeDraft,
        crate::types::RecipeListing,
        crate::types::SortBy,
        crate::types::SortOrder,
    ))
)]
pub struct ApiDoc;
