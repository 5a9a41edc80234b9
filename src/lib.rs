pub mod api;
pub mod auth;
pub mod background;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod images;
pub mod models;
pub mod repo;
pub mod schema;
pub mod types;

use std::sync::Arc;

use config::Config;
use extract::RecipeExtractor;
use repo::Database;

/// Application state shared across all handlers.
pub struct AppContext {
    pub db: Arc<dyn Database>,
    pub config: Config,
    /// Absent when no LLM API key is configured; recipe import then
    /// answers 503.
    pub extractor: Option<Arc<dyn RecipeExtractor>>,
    /// Shared client for page fetches and image downloads.
    pub http: reqwest::Client,
}

pub type AppState = Arc<AppContext>;
