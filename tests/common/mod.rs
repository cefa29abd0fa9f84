#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Once,
};
use std::time::Duration;
use streetvoice::{
    error::{AppError, AppResult},
    models::report,
    services::{
        credentials::FederatedStrategy,
        email::EmailService,
        federated::{FederatedIdentity, IdentityProvider},
        suggestion::{SuggestionContext, SuggestionProvider},
        upload::ImageStorage,
    },
    utils::TokenIssuer,
    AppServices,
};

pub const TEST_SECRET: &str = "integration_test_secret_that_is_at_least_32_characters_long";
pub const GOOGLE_AUDIENCE: &str = "test-client-id";
pub const PASSWORD: &str = "pw123456";
pub const POTHOLES: &str = "Road Damage / Potholes";
pub const PUBLIC_WORKS: &str = "Public Works Department (PWD)";
pub const SANITATION: &str = "Sanitation Department";

static INIT: Once = Once::new();
static EMAIL_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn init_env() {
    INIT.call_once(|| {
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        std::env::set_var("BCRYPT_COST", "4");
    });
}

/// Accepts `google:<email>` for [`GOOGLE_AUDIENCE`].
pub struct FakeGoogle;

#[async_trait]
impl IdentityProvider for FakeGoogle {
    async fn verify_id_token(&self, token: &str, audience: &str) -> AppResult<FederatedIdentity> {
        if audience != GOOGLE_AUDIENCE {
            return Err(AppError::Unauthorized);
        }
        let email = token.strip_prefix("google:").ok_or(AppError::Unauthorized)?;
        Ok(FederatedIdentity {
            email: email.to_string(),
            subject_id: format!("sub-{email}"),
        })
    }
}

/// Remembers uploads and hands out fake CDN URLs.
#[derive(Default)]
pub struct FakeStorage {
    pub uploads: AtomicUsize,
    pub fail: bool,
}

#[async_trait]
impl ImageStorage for FakeStorage {
    async fn upload(&self, jpeg: Vec<u8>, folder: &str) -> AppResult<String> {
        if self.fail {
            return Err(AppError::UploadFailed("storage offline".into()));
        }
        assert_eq!(&jpeg[..3], &[0xFF, 0xD8, 0xFF], "storage must receive JPEG");
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://images.test/{folder}/{n}.jpg"))
    }
}

pub struct FakeSuggestions;

#[async_trait]
impl SuggestionProvider for FakeSuggestions {
    async fn suggest(&self, context: &SuggestionContext) -> AppResult<String> {
        Ok(format!("Send a crew to {} for {}", context.location, context.tag))
    }
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
    pub tokens: Arc<TokenIssuer>,
    pub storage: Arc<FakeStorage>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_storage(FakeStorage::default()).await
}

pub async fn spawn_app_with_storage(storage: FakeStorage) -> TestApp {
    init_env();

    // One connection: every pooled connection would otherwise get its own
    // empty in-memory database.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt)
        .await
        .expect("Failed to open in-memory database");

    streetvoice::migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let tokens = Arc::new(TokenIssuer::new(TEST_SECRET, chrono::Duration::minutes(30)));
    let storage = Arc::new(storage);
    let services = AppServices {
        db: db.clone(),
        tokens: tokens.clone(),
        federated: Arc::new(FederatedStrategy::new(
            Arc::new(FakeGoogle),
            Some(GOOGLE_AUDIENCE.to_string()),
            Duration::from_secs(2),
        )),
        images: storage.clone(),
        suggestions: Arc::new(FakeSuggestions),
        email: EmailService::disabled(),
    };

    let upload_dir = std::env::temp_dir().join("streetvoice-test-uploads");
    let app = streetvoice::create_app(services, &upload_dir.to_string_lossy());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
        tokens,
        storage,
    }
}

pub fn unique_email(prefix: &str) -> String {
    let n = EMAIL_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}{n}@example.com")
}

pub async fn register(app: &TestApp, email: &str, password: &str) -> Response {
    app.client
        .post(app.url("/register"))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("register request failed")
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> Response {
    app.client
        .post(app.url("/login"))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request failed")
}

/// Register a fresh local account and return (email, token).
pub async fn create_user(app: &TestApp, prefix: &str) -> (String, String) {
    let email = unique_email(prefix);
    let resp = register(app, &email, PASSWORD).await;
    assert_eq!(resp.status(), 201, "register failed for {email}");

    let resp = login(app, &email, PASSWORD).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    let token = body["data"]["access_token"].as_str().unwrap().to_string();
    (email, token)
}

pub async fn complete_profile(app: &TestApp, token: &str, fields: &[(&str, &str)]) -> Response {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name.to_string(), value.to_string());
    }
    app.client
        .put(app.url("/complete-profile"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .expect("complete-profile request failed")
}

/// A citizen whose profile is complete.
pub async fn create_citizen(app: &TestApp) -> (String, String) {
    let (email, token) = create_user(app, "citizen").await;
    let resp = complete_profile(app, &token, &[("full_name", "Citizen"), ("role", "User")]).await;
    assert_eq!(resp.status(), 200);
    (email, token)
}

pub async fn create_admin(app: &TestApp, department: &str) -> (String, String) {
    let (email, token) = create_user(app, "admin").await;
    let resp = complete_profile(
        app,
        &token,
        &[
            ("full_name", "Admin"),
            ("role", "Admin"),
            ("department", department),
            ("location", "Ward 7"),
            ("admin_code", "ADM-1"),
        ],
    )
    .await;
    assert_eq!(resp.status(), 200);
    (email, token)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([90, 90, 90]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

pub fn report_form(tags: &str, location: &str, description: &str) -> Form {
    let image = Part::bytes(png_bytes(1200, 600))
        .file_name("photo.png")
        .mime_str("image/png")
        .unwrap();
    Form::new()
        .part("image", image)
        .text("location", location.to_string())
        .text("description", description.to_string())
        .text("tags", tags.to_string())
}

pub async fn submit_report(app: &TestApp, token: &str, tags: &str, location: &str) -> Response {
    app.client
        .post(app.url("/report-issue"))
        .bearer_auth(token)
        .multipart(report_form(tags, location, "Needs attention"))
        .send()
        .await
        .expect("report-issue request failed")
}

/// Submit a report and return its id.
pub async fn create_report(app: &TestApp, token: &str, tags: &str) -> i64 {
    let resp = submit_report(app, token, tags, "MG Road").await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = resp.json().await.unwrap();
    body["data"]["id"].as_i64().unwrap()
}

/// Insert a report directly, bypassing upload, with a chosen timestamp.
pub async fn insert_report(
    app: &TestApp,
    owner: &str,
    tags: &str,
    location: &str,
    status: &str,
    reported_at: &str,
) -> i32 {
    let reported_at = chrono::NaiveDateTime::parse_from_str(reported_at, "%Y-%m-%d %H:%M:%S")
        .expect("bad timestamp");
    let model = report::ActiveModel {
        image_url: sea_orm::ActiveValue::Set("https://images.test/seed.jpg".into()),
        location: sea_orm::ActiveValue::Set(location.into()),
        description: sea_orm::ActiveValue::Set("seeded".into()),
        tags: sea_orm::ActiveValue::Set(tags.into()),
        status: sea_orm::ActiveValue::Set(status.into()),
        reported_at: sea_orm::ActiveValue::Set(reported_at),
        user_id: sea_orm::ActiveValue::Set(owner.into()),
        ..Default::default()
    };
    model.insert(&app.db).await.expect("seed insert failed").id
}

pub async fn set_status(app: &TestApp, token: &str, report_id: i64, status: &str) -> Response {
    app.client
        .put(app.url(&format!("/admin/reports/{report_id}/status")))
        .bearer_auth(token)
        .json(&serde_json::json!({ "status": status }))
        .send()
        .await
        .expect("status request failed")
}

pub async fn error_code(resp: Response) -> String {
    let body: serde_json::Value = resp.json().await.unwrap();
    body["code"].as_str().unwrap_or_default().to_string()
}
