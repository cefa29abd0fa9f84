use crate::error::{AppError, AppResult, ErrorResponse};
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::suggestion::{SuggestionContext, SuggestionProvider};
use axum::{response::IntoResponse, Extension, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestionResponse {
    pub suggestion: String,
}

/// Ask the language model for a resolution plan for a report.
#[utoipa::path(
    post,
    path = "/suggestion",
    security(("jwt_token" = [])),
    request_body = SuggestionContext,
    responses(
        (status = 200, description = "Model output, or the provider's error text", body = SuggestionResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 502, description = "Provider unreachable", body = ErrorResponse),
    ),
    tag = "reports"
)]
pub async fn suggestion(
    Extension(provider): Extension<Arc<dyn SuggestionProvider>>,
    _auth_user: AuthUser,
    Json(payload): Json<SuggestionContext>,
) -> AppResult<impl IntoResponse> {
    if payload.tag.trim().is_empty() || payload.description.trim().is_empty() {
        return Err(AppError::Validation(
            "tag and description are required".to_string(),
        ));
    }

    let suggestion = provider.suggest(&payload).await?;
    Ok(ApiResponse::ok(SuggestionResponse { suggestion }))
}
