use crate::error::{AppError, AppResult, ErrorResponse};
use crate::handlers::auth::UserResponse;
use crate::handlers::form::read_form;
use crate::middleware::AuthUser;
use crate::models::{Role, RoleProfile};
use crate::response::ApiResponse;
use crate::services::identity::{IdentityService, ProfileUpdate};
use crate::services::upload::{prepare_image, ImageStorage, PROFILES_FOLDER};
use axum::{extract::Multipart, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use utoipa::ToSchema;

/// Multipart body of `PUT /complete-profile`.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct CompleteProfileForm {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    /// `user` or `admin` (case-insensitive)
    pub role: String,
    /// Admin only
    pub department: Option<String>,
    /// Admin only
    pub location: Option<String>,
    /// Admin only
    pub admin_code: Option<String>,
    #[schema(format = Binary, value_type = Option<String>)]
    pub profile_pic: Option<Vec<u8>>,
}

#[utoipa::path(
    put,
    path = "/complete-profile",
    security(("jwt_token" = [])),
    request_body(content = CompleteProfileForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 502, description = "Profile picture upload failed", body = ErrorResponse),
    ),
    tag = "users"
)]
pub async fn complete_profile(
    Extension(db): Extension<DatabaseConnection>,
    Extension(storage): Extension<Arc<dyn ImageStorage>>,
    auth_user: AuthUser,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = read_form(multipart, "profile_pic").await?;

    let role_raw = form.required("role")?;
    let role = Role::parse(&role_raw)
        .ok_or_else(|| AppError::Validation(format!("Unknown role '{role_raw}'")))?;

    let role_profile = match role {
        Role::User => RoleProfile::User,
        Role::Admin => RoleProfile::Admin {
            department: form.text("department"),
            location: form.text("location"),
            admin_code: form.text("admin_code"),
        },
    };

    let profile_picture_url = match form.file.take() {
        Some(file) => {
            let jpeg = prepare_image(file.data, &file.content_type).await?;
            Some(storage.upload(jpeg, PROFILES_FOLDER).await?)
        }
        None => None,
    };

    let user = IdentityService::new(db)
        .complete_profile(
            &auth_user.email,
            ProfileUpdate {
                full_name: form.text("full_name"),
                phone: form.text("phone"),
                role_profile,
                profile_picture_url,
            },
        )
        .await?;

    Ok(ApiResponse::with_message(
        UserResponse::from(user),
        "Profile updated successfully",
    ))
}
