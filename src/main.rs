use sea_orm_migration::MigratorTrait;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use streetvoice::{
    config::{
        cloudinary::CloudinaryConfig, gemini::GeminiConfig, google::GoogleConfig, jwt::JwtConfig,
    },
    create_app, migration,
    services::{
        cloudinary::CloudinaryStorage,
        credentials::FederatedStrategy,
        email::EmailService,
        federated::GoogleIdentityProvider,
        suggestion::{GeminiSuggestionProvider, SuggestionProvider},
        upload::{ImageStorage, LocalImageStorage},
    },
    utils::TokenIssuer,
    AppServices,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streetvoice=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let jwt_config = validate_config()?;

    tracing::info!("Starting StreetVoice API v{}...", env!("CARGO_PKG_VERSION"));

    let db = streetvoice::config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let google = GoogleConfig::from_env();
    let federated = Arc::new(FederatedStrategy::new(
        Arc::new(GoogleIdentityProvider::new(http.clone())),
        google.client_id,
        google.verify_timeout,
    ));

    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
    let images: Arc<dyn ImageStorage> = match CloudinaryConfig::from_env() {
        Some(cfg) => {
            tracing::info!("Storing images on Cloudinary (cloud '{}')", cfg.cloud_name);
            Arc::new(CloudinaryStorage::new(http.clone(), cfg))
        }
        None => {
            tracing::warn!("Cloudinary not configured, storing images under {upload_dir}");
            Arc::new(LocalImageStorage::new(&upload_dir))
        }
    };

    let gemini = GeminiConfig::from_env();
    if gemini.api_key.is_none() {
        tracing::warn!("GOOGLE_GEMINI_API_KEY not set, suggestions are unavailable");
    }
    let suggestions: Arc<dyn SuggestionProvider> =
        Arc::new(GeminiSuggestionProvider::new(http, gemini));

    let email = EmailService::from_env();
    if email.is_configured() {
        tracing::info!("SMTP email service configured");
    } else {
        tracing::warn!("SMTP not configured, contact messages will only be logged");
    }

    let services = AppServices {
        db,
        tokens: Arc::new(TokenIssuer::from_config(&jwt_config)),
        federated,
        images,
        suggestions,
        email,
    };
    let app = create_app(services, &upload_dir);

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<JwtConfig> {
    let jwt_config = JwtConfig::from_env()?;

    // DATABASE_URL — checked here for early error; actual connection happens later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
    std::fs::create_dir_all(&upload_dir).map_err(|e| {
        anyhow::anyhow!("Failed to create upload directory '{}': {}", upload_dir, e)
    })?;

    Ok(jwt_config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
