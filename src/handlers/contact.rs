use crate::error::{AppError, AppResult, ErrorResponse};
use crate::response::ApiResponse;
use crate::services::email::{ContactMessage, EmailService};
use axum::{response::IntoResponse, Extension, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message received"),
        (status = 400, description = "Validation error", body = ErrorResponse),
    ),
    tag = "contact"
)]
pub async fn contact(
    Extension(email_service): Extension<EmailService>,
    Json(payload): Json<ContactRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let message = ContactMessage {
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        message: payload.message,
    };

    // Best effort: the sender always gets an acknowledgement.
    if let Err(e) = email_service.forward_contact(&message).await {
        tracing::warn!("Failed to forward contact message: {e}");
    }

    Ok(ApiResponse::message("Your message has been received."))
}
