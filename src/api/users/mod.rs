pub mod create;
pub mod token;

use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/token", post(token::login))
        .route("/user/create", post(create::create_user))
}

#[derive(OpenApi)]
#[openapi(
    paths(token::login, create::create_user),
    components(schemas(
        token::TokenRequest,
        token::Authorization,
        create::CreateUserRequest,
        create::CreateUserResponse,
    ))
)]
pub struct ApiDoc;
