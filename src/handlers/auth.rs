use crate::error::{AppError, AppResult, ErrorResponse};
use crate::middleware::auth::load_current_user;
use crate::middleware::AuthUser;
use crate::models::UserModel;
use crate::response::ApiResponse;
use crate::services::credentials::FederatedStrategy;
use crate::services::identity::IdentityService;
use crate::utils::TokenIssuer;
use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email)]
    pub email: String,
    /// Password
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: i32,
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GoogleLoginRequest {
    /// ID token returned by Google Sign-In
    pub id_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Session token to send as `Authorization: Bearer`
    pub access_token: String,
    /// Always `bearer`
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    /// False until the user has picked a role
    pub profile_complete: bool,
}

impl TokenResponse {
    fn new(access_token: String, issuer: &TokenIssuer, user: &UserModel) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: issuer.default_ttl().num_seconds(),
            profile_complete: user.profile_complete(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    /// `local` or `federated`
    pub auth_provider: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    /// `user` or `admin`; absent until the profile is completed
    pub role: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub profile_picture_url: Option<String>,
    pub profile_complete: bool,
    pub created_at: String,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        let profile_complete = user.profile_complete();
        Self {
            id: user.id,
            email: user.email,
            auth_provider: user.auth_provider,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            department: user.department,
            location: user.location,
            profile_picture_url: user.profile_picture_url,
            profile_complete,
            created_at: user.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn register(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = payload.email.trim();
    let user_id = IdentityService::new(db)
        .register(email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            RegisterResponse {
                user_id,
                email: email.to_string(),
            },
            "User registered successfully",
        ),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Extension(issuer): Extension<Arc<TokenIssuer>>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = IdentityService::new(db)
        .authenticate_local(payload.email.trim(), &payload.password)
        .await?;

    let token = issuer.issue_session(&user.email)?;
    Ok(ApiResponse::ok(TokenResponse::new(token, &issuer, &user)))
}

/// Exchange a Google ID token for a local session token, creating the
/// account on first sign-in.
#[utoipa::path(
    post,
    path = "/google-login",
    request_body = GoogleLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "ID token rejected", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn google_login(
    Extension(db): Extension<DatabaseConnection>,
    Extension(issuer): Extension<Arc<TokenIssuer>>,
    Extension(federated): Extension<Arc<FederatedStrategy>>,
    Json(payload): Json<GoogleLoginRequest>,
) -> AppResult<impl IntoResponse> {
    let identity = federated.verify_identity(payload.id_token.trim()).await?;

    let user = IdentityService::new(db)
        .find_or_create_federated(&identity.email)
        .await?;

    let token = issuer.issue_session(&user.email)?;
    Ok(ApiResponse::ok(TokenResponse::new(token, &issuer, &user)))
}

/// Sessions are stateless; the client discards its token.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Logout acknowledged"),
    ),
    tag = "auth"
)]
pub async fn logout() -> impl IntoResponse {
    ApiResponse::message("User logged out successfully")
}

#[utoipa::path(
    get,
    path = "/me",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Current user retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No account for this identity", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user = load_current_user(&db, &auth_user).await?;
    Ok(ApiResponse::ok(UserResponse::from(user)))
}
