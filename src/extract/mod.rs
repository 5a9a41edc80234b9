//! Recipe extraction from external web pages: fetch the page, strip it
//! down to readable text, and have an LLM turn that into a structured
//! recipe draft.

mod clean;
mod fetch;
mod llm;

pub use clean::{clean_html, find_cover_image_url, looks_like_html};
pub use fetch::fetch_page;
pub use llm::{LlmIngredient, LlmRecipe, OpenAiExtractor, RecipeExtractor};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Page does not contain a recipe")]
    NotARecipe,

    #[error("LLM extraction failed: {0}")]
    Llm(String),
}
