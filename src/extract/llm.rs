//! OpenAI-compatible chat completion client that turns page text into a
//! structured recipe.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ExtractError;

const EXTRACTION_PROMPT: &str = "You are a recipe extraction assistant. Given the text of a web \
page, extract the recipe it describes and answer with a single JSON object with these fields: \
title (string), description (string), portions (integer), cooking_time (integer, minutes), \
ingredients (array of {name, unit, amount, group} where unit is one of g, kg, ml, l, pcs, tbsp, \
tsp; amount is a number; group is a string or null), steps (array of strings, one per \
instruction, in order), categories (array of short lowercase strings), image_urls (array of \
absolute URLs of photos of the finished dish, may be empty) and is_a_recipe (boolean). \
If the page does not describe a recipe, set is_a_recipe to false and leave the other fields \
empty.";

#[derive(Debug, Clone, Deserialize)]
pub struct LlmIngredient {
    pub name: String,
    pub unit: String,
    pub amount: f64,
    #[serde(default)]
    pub group: Option<String>,
}

/// Shape the model is asked to produce.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmRecipe {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub portions: i32,
    #[serde(default)]
    pub cooking_time: i32,
    #[serde(default)]
    pub ingredients: Vec<LlmIngredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub is_a_recipe: bool,
}

#[async_trait]
pub trait RecipeExtractor: Send + Sync {
    async fn extract(&self, page_text: &str) -> Result<LlmRecipe, ExtractError>;
}

/// Client for any OpenAI-compatible chat completions endpoint.
#[derive(Debug)]
pub struct OpenAiExtractor {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiExtractor {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: ChatApiError,
}

#[derive(Debug, Deserialize)]
struct ChatApiError {
    message: String,
}

#[async_trait]
impl RecipeExtractor for OpenAiExtractor {
    async fn extract(&self, page_text: &str) -> Result<LlmRecipe, ExtractError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: EXTRACTION_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: page_text.to_string(),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractError::Llm(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExtractError::Llm(e.to_string()))?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<ChatErrorResponse>(&body) {
                return Err(ExtractError::Llm(format!(
                    "{}: {}",
                    status, error_response.error.message
                )));
            }
            return Err(ExtractError::Llm(format!("{}: {}", status, body)));
        }

        let response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| ExtractError::Llm(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ExtractError::Llm("No choices in response".to_string()))?;

        serde_json::from_str(&content)
            .map_err(|e| ExtractError::Llm(format!("Malformed extraction payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_payload_deserializes() {
        let payload = r#"{
            "title": "Carbonara",
            "description": "Roman pasta",
            "portions": 4,
            "cooking_time": 30,
            "ingredients": [
                {"name": "spaghetti", "unit": "g", "amount": 400, "group": null},
                {"name": "eggs", "unit": "pcs", "amount": 4}
            ],
            "steps": ["Boil the pasta.", "Mix with eggs."],
            "categories": ["pasta", "italian"],
            "is_a_recipe": true
        }"#;
        let recipe: LlmRecipe = serde_json::from_str(payload).unwrap();
        assert!(recipe.is_a_recipe);
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[1].group, None);
        assert_eq!(recipe.steps.len(), 2);
    }

    #[test]
    fn non_recipe_payload_needs_only_flag() {
        let recipe: LlmRecipe = serde_json::from_str(r#"{"is_a_recipe": false}"#).unwrap();
        assert!(!recipe.is_a_recipe);
        assert!(recipe.steps.is_empty());
    }
}
