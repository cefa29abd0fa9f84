pub mod auth;
pub mod cloudinary;
pub mod database;
pub mod email;
pub mod gemini;
pub mod google;
pub mod jwt;
pub mod rate_limit;

use std::env;

/// Parse a boolean-ish environment variable, falling back to `default`.
pub(crate) fn parse_bool_env(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Some(true),
            "0" | "false" | "no" | "n" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Read a non-empty environment variable.
pub(crate) fn non_empty_env(var_name: &str) -> Option<String> {
    env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
