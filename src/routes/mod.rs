use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::{auth::auth_middleware, security::security_headers_middleware};
use crate::openapi::ApiDoc;
use crate::services::{
    credentials::{CredentialVerifier, FederatedStrategy},
    email::EmailService,
    suggestion::SuggestionProvider,
    upload::{ImageStorage, MAX_FILE_SIZE},
};
use crate::utils::TokenIssuer;
use axum::{
    extract::{DefaultBodyLimit, Extension},
    middleware,
    response::IntoResponse,
    routing, Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::{env, sync::Arc};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Multipart bodies carry one image plus a handful of text fields.
const MULTIPART_BODY_LIMIT: usize = MAX_FILE_SIZE + 1024 * 1024;

/// Long-lived collaborators shared by every request.
#[derive(Clone)]
pub struct AppServices {
    pub db: DatabaseConnection,
    pub tokens: Arc<TokenIssuer>,
    pub federated: Arc<FederatedStrategy>,
    pub images: Arc<dyn ImageStorage>,
    pub suggestions: Arc<dyn SuggestionProvider>,
    pub email: EmailService,
}

impl AppServices {
    pub fn verifier(&self) -> Arc<CredentialVerifier> {
        Arc::new(CredentialVerifier::local_first(
            self.tokens.clone(),
            self.federated.clone(),
        ))
    }
}

/// The full application: routes, docs, static uploads and shared layers.
pub fn create_app(services: AppServices, upload_dir: &str) -> Router {
    let verifier = services.verifier();

    Router::new()
        .route("/", routing::get(health_check))
        .merge(create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
        .layer(Extension(services.db))
        .layer(Extension(services.tokens))
        .layer(Extension(services.federated))
        .layer(Extension(verifier))
        .layer(Extension(services.images))
        .layer(Extension(services.suggestions))
        .layer(Extension(services.email))
}

pub fn create_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let public = public_routes(&rate_limit_config);
    let citizen =
        citizen_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));
    let admin = admin_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    public.merge(citizen).merge(admin)
}

/// Unauthenticated routes: sign-up, sign-in, categories, contact.
fn public_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/register", routing::post(handlers::register))
        .route("/login", routing::post(handlers::login))
        .route("/google-login", routing::post(handlers::google_login))
        .route("/logout", routing::post(handlers::logout))
        .route("/categories", routing::get(handlers::report::categories))
        .route("/contact", routing::post(handlers::contact::contact));

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Any authenticated user.
fn citizen_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/me", routing::get(handlers::get_current_user))
        .route(
            "/complete-profile",
            routing::put(handlers::profile::complete_profile),
        )
        .route(
            "/report-issue",
            routing::post(handlers::report::report_issue),
        )
        .route("/my-reports", routing::get(handlers::report::my_reports))
        .route(
            "/reports/{id}",
            routing::delete(handlers::report::delete_report),
        )
        .route(
            "/suggestion",
            routing::post(handlers::suggestion::suggestion),
        )
        .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT));

    with_optional_rate_limit(router, config.enabled, config.citizen)
}

/// Admin routes; role and department are checked in the handlers.
fn admin_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route(
            "/admin/reports",
            routing::get(handlers::admin::list_reports),
        )
        .route(
            "/admin/reports/{id}/status",
            routing::put(handlers::admin::update_report_status),
        )
        .route("/admin/users", routing::get(handlers::admin::list_users));

    with_optional_rate_limit(router, config.enabled, config.admin)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    match GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
    {
        Some(governor_conf) => router.layer(GovernorLayer::new(governor_conf)),
        None => {
            tracing::warn!(?rule, "Invalid rate limit rule, group left unlimited");
            router
        }
    }
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    ),
    tag = "health"
)]
pub async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db.ping().await.is_ok();
    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "StreetVoice API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}
