use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::background::spawn_image_sweep;
use crate::extract::{clean_html, fetch_page, find_cover_image_url, looks_like_html, ExtractError};
use crate::images::process_image;
use crate::types::{Ingredient, Recipe, RecipeDraft, RecipeStep, Unit};
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ParseParams {
    /// Address of the recipe page to import.
    pub url: String,
}

#[utoipa::path(
    post,
    path = "/parse-external-recipe",
    tag = "parser",
    params(ParseParams),
    responses(
        (status = 201, description = "Recipe imported successfully", body = Recipe),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Page is not a recipe", body = ErrorResponse),
        (status = 503, description = "Recipe import not configured", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn parse_external_recipe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ParseParams>,
) -> impl IntoResponse {
    let extractor = match &state.extractor {
        Some(extractor) => extractor.clone(),
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Recipe import is not configured".to_string(),
                }),
            )
                .into_response()
        }
    };

    let body = match fetch_page(&state.http, &params.url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", params.url, e);
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: "Could not fetch a recipe from this URL".to_string(),
                }),
            )
                .into_response();
        }
    };

    let (page_text, cover_url) = if looks_like_html(&body) {
        (clean_html(&body), find_cover_image_url(&body))
    } else {
        (body, None)
    };

    let extracted = match extractor.extract(&page_text).await {
        Ok(extracted) => extracted,
        Err(e) => {
            tracing::error!("Extraction failed for {}: {}", params.url, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Recipe extraction failed".to_string(),
                }),
            )
                .into_response();
        }
    };

    if !extracted.is_a_recipe {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: ExtractError::NotARecipe.to_string(),
            }),
        )
            .into_response();
    }

    // The page's own cover candidate goes first so it ends up as cover.
    let mut image_urls: Vec<String> = cover_url.into_iter().collect();
    image_urls.extend(extracted.image_urls.iter().cloned());

    let mut image_ids = Vec::new();
    for url in &image_urls {
        match download_image(&state, url).await {
            Ok(id) => image_ids.push(id),
            Err(reason) => {
                tracing::debug!("Skipping image {}: {}", url, reason);
            }
        }
    }

    let cover_image = image_ids.first().copied();
    let gallery_images: Vec<i32> = image_ids.into_iter().skip(1).collect();

    let description = format!("{}\n\nOriginal: {}", extracted.description, params.url);

    let ingredients = extracted
        .ingredients
        .into_iter()
        .map(|i| Ingredient {
            name: i.name,
            // Anything the model invents beyond the known units counts as pieces.
            unit: i.unit.parse().unwrap_or(Unit::Pcs),
            amount: i.amount,
            group: i.group,
        })
        .collect();

    let steps = extracted
        .steps
        .into_iter()
        .enumerate()
        .map(|(i, step)| RecipeStep {
            order_id: i as i32 + 1,
            step,
            images: Vec::new(),
        })
        .collect();

    let draft = RecipeDraft {
        title: extracted.title,
        description: Some(description),
        portions: extracted.portions,
        cooking_time: extracted.cooking_time,
        ingredients,
        steps,
        categories: extracted.categories,
        gallery_images,
        cover_image,
    };

    let recipe_id = match state.db.create_recipe(&draft, Some(user.id)) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to store imported recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to store imported recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    spawn_image_sweep(&state);

    match state.db.get_recipe(recipe_id) {
        Ok(recipe) => (StatusCode::CREATED, Json(recipe)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load imported recipe {}: {}", recipe_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to load imported recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Download, normalize and store one gallery image.
async fn download_image(state: &AppState, url: &str) -> Result<i32, String> {
    let response = state
        .http
        .get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }
    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    let processed = process_image(&bytes)?;
    state.db.create_image(&processed).map_err(|e| e.to_string())
}
