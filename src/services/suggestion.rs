use crate::{
    config::gemini::GeminiConfig,
    error::{AppError, AppResult},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

pub const NO_SUGGESTION: &str = "No suggestion returned by the model.";

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SuggestionContext {
    /// Report category.
    pub tag: String,
    pub location: String,
    pub description: String,
}

#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    async fn suggest(&self, context: &SuggestionContext) -> AppResult<String>;
}

pub fn build_prompt(context: &SuggestionContext) -> String {
    format!(
        "You are an expert city maintenance assistant helping municipal admins solve public infrastructure issues efficiently.\n\n\
         Based on the following citizen report, provide a practical step-by-step solution plan to resolve the issue. Include:\n\
         1. Recommended actions.\n\
         2. Which department or authority should be contacted.\n\
         3. Estimated time for resolution.\n\
         4. Any preventive measures for the future.\n\n\
         Report Details:\n\
         Category (Tag): {}\n\
         Location: {}\n\
         Description: {}\n\n\
         Please give a short, concise and actionable suggestion in 200 words",
        context.tag, context.location, context.description
    )
}

fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": { "temperature": 0.7 }
    })
}

/// Pull the first candidate's text out of a successful response.
pub fn parse_response(body: &Value) -> String {
    match body["candidates"].as_array().and_then(|c| c.first()) {
        Some(candidate) => candidate["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        None => NO_SUGGESTION.to_string(),
    }
}

pub struct GeminiSuggestionProvider {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiSuggestionProvider {
    pub fn new(http: reqwest::Client, config: GeminiConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl SuggestionProvider for GeminiSuggestionProvider {
    async fn suggest(&self, context: &SuggestionContext) -> AppResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Upstream("suggestion service is not configured".into()))?;

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.config.model
        );

        let response = self
            .http
            .post(url)
            .query(&[("key", api_key)])
            .json(&request_body(&build_prompt(context)))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("suggestion request failed: {e}");
                AppError::Upstream(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "suggestion model returned an error");
            return Ok(format!("Error {}: {}", status.as_u16(), text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("unreadable model response: {e}")))?;
        Ok(parse_response(&body))
    }
}
