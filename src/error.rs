use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not found")]
    NotFound,

    /// Deliberately indistinguishable from a missing report.
    #[error("Report not found or not owned by you")]
    NotFoundOrUnauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Your department is not responsible for this category")]
    DepartmentMismatch,

    #[error("No department handles category '{0}'")]
    CategoryUnmapped(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Image upload failed: {0}")]
    UploadFailed(String),

    #[error("Upstream service failed: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Payload too large")]
    PayloadTooLarge,
}

impl AppError {
    /// Stable machine-readable code returned next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) | AppError::Upstream(_) => "upstream_failure",
            AppError::Unauthorized => "unauthenticated",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::NotFound => "not_found",
            AppError::NotFoundOrUnauthorized => "not_found_or_unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::DepartmentMismatch => "department_mismatch",
            AppError::CategoryUnmapped(_) => "category_unmapped",
            AppError::Validation(_) => "validation_error",
            AppError::Conflict(_) => "conflict",
            AppError::UploadFailed(_) => "upload_failed",
            AppError::Internal(_) => "internal_error",
            AppError::PayloadTooLarge => "payload_too_large",
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl utoipa::ToSchema for AppError {
    fn name() -> std::borrow::Cow<'static, str> {
        "ErrorResponse".into()
    }
}

impl utoipa::PartialSchema for AppError {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        ErrorResponse::schema()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_message) = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Data store unavailable".to_string(),
                )
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Invalid authentication credentials".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            e @ AppError::NotFoundOrUnauthorized => (StatusCode::NOT_FOUND, e.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            e @ AppError::DepartmentMismatch => (StatusCode::FORBIDDEN, e.to_string()),
            e @ AppError::CategoryUnmapped(_) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            e @ AppError::UploadFailed(_) => {
                tracing::warn!("{}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            e @ AppError::Upstream(_) => {
                tracing::warn!("{}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "File too large".to_string(),
            ),
        };

        let body = json!({
            "error": error_message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_for_report_outcomes() {
        assert_eq!(AppError::DepartmentMismatch.code(), "department_mismatch");
        assert_eq!(
            AppError::CategoryUnmapped("Other".into()).code(),
            "category_unmapped"
        );
        assert_eq!(
            AppError::NotFoundOrUnauthorized.code(),
            "not_found_or_unauthorized"
        );
        assert_eq!(AppError::NotFound.code(), "not_found");
    }

    #[test]
    fn store_errors_surface_as_upstream_failures() {
        let err = AppError::Database(sea_orm::DbErr::Custom("down".into()));
        assert_eq!(err.code(), "upstream_failure");
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn department_mismatch_is_forbidden() {
        let resp = AppError::DepartmentMismatch.into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
