use super::non_empty_env;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-001";

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
}

impl GeminiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty_env("GOOGLE_GEMINI_API_KEY"),
            model: non_empty_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}
