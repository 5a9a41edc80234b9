pub mod parse;

use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/parse-external-recipe", post(parse::parse_external_recipe))
}

#[derive(OpenApi)]
#[openapi(paths(parse::parse_external_recipe))]
pub struct ApiDoc;
