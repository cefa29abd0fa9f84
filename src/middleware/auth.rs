use crate::{
    error::{AppError, AppResult},
    models::UserModel,
    services::{credentials::CredentialVerifier, identity::IdentityService},
};
use axum::{
    extract::{FromRequestParts, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Subject resolved from the bearer credential.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

/// Bearer authentication middleware.
///
/// Runs the credential through the verifier chain (session token, then
/// federated ID token) and adds the resolved subject to request extensions.
pub async fn auth_middleware(
    Extension(verifier): Extension<Arc<CredentialVerifier>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let email = verifier.resolve_identity(&token).await?;

    request.extensions_mut().insert(AuthUser { email });
    Ok(next.run(request).await)
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Load the account behind the authenticated subject.
///
/// A valid federated token for an email that never completed a login has no
/// row yet; that is reported as `NotFound`.
pub async fn load_current_user(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
) -> AppResult<UserModel> {
    IdentityService::new(db.clone())
        .get_by_email(&auth_user.email)
        .await
}

/// Verify the current user has the admin role.
pub async fn require_admin(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
) -> AppResult<UserModel> {
    let user = load_current_user(db, auth_user).await?;
    if !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

pub fn parse_report_id(raw: &str) -> AppResult<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Validation(format!("Invalid report id '{raw}'")))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, HeaderValue};

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(
            extract_bearer_token(&headers("Bearer abc.def")),
            Some("abc.def".to_string())
        );
        assert_eq!(
            extract_bearer_token(&headers("bearer abc")),
            Some("abc".to_string())
        );
    }

    #[test]
    fn missing_or_empty_bearer_is_none() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
        assert_eq!(extract_bearer_token(&headers("Bearer ")), None);
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcjpwdw==")), None);
    }

    #[test]
    fn report_ids_must_be_positive_integers() {
        assert_eq!(parse_report_id("42").unwrap(), 42);
        assert!(matches!(parse_report_id("abc"), Err(AppError::Validation(_))));
        assert!(matches!(parse_report_id("0"), Err(AppError::Validation(_))));
        assert!(matches!(parse_report_id("-3"), Err(AppError::Validation(_))));
    }
}
