pub mod create;
pub mod delete;
pub mod get;

use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/image/create", post(create::upload_image))
        .route(
            "/image/{id}",
            get(get::get_image).delete(delete::delete_image),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(create::upload_image, get::get_image, delete::delete_image),
    components(schemas(create::UploadImageRequest, create::UploadImageResponse))
)]
pub struct ApiDoc;
