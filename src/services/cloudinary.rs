use crate::{
    config::cloudinary::CloudinaryConfig,
    error::{AppError, AppResult},
    services::upload::ImageStorage,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Signed uploads to the Cloudinary image API.
pub struct CloudinaryStorage {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadError>,
}

#[derive(Deserialize)]
struct UploadError {
    message: String,
}

/// Hex SHA-256 over the alphabetically sorted parameters followed by the secret.
fn sign(folder: &str, timestamp: i64, api_secret: &str) -> String {
    let to_sign = format!("folder={folder}&timestamp={timestamp}{api_secret}");
    format!("{:x}", Sha256::digest(to_sign.as_bytes()))
}

impl CloudinaryStorage {
    pub fn new(http: reqwest::Client, config: CloudinaryConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        )
    }
}

#[async_trait]
impl ImageStorage for CloudinaryStorage {
    async fn upload(&self, jpeg: Vec<u8>, folder: &str) -> AppResult<String> {
        let folder = format!("{}/{}", self.config.folder, folder);
        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign(&folder, timestamp, &self.config.api_secret);

        let file = Part::bytes(jpeg)
            .file_name("upload.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| AppError::UploadFailed(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", folder)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .http
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Cloudinary request failed: {e}");
                AppError::UploadFailed(e.to_string())
            })?;

        let status = response.status();
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::UploadFailed(format!("unreadable response ({status}): {e}")))?;

        match (body.secure_url, body.error) {
            (Some(url), _) if status.is_success() => Ok(url),
            (_, Some(err)) => {
                tracing::warn!(%status, "Cloudinary rejected upload: {}", err.message);
                Err(AppError::UploadFailed(err.message))
            }
            _ => Err(AppError::UploadFailed(format!(
                "upload returned {status} without a URL"
            ))),
        }
    }
}
