use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

/// Process-wide configuration, loaded once in `main` and passed to
/// constructors explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    /// API key for the extraction LLM; recipe import is disabled when unset.
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_base_url: String,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Ok(Config {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            llm_api_key: env::var("OPENAI_API_KEY").ok(),
            llm_model: env::var("EXTRACTION_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            llm_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
        })
    }
}
