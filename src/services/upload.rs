use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10 MB
pub const MAX_WIDTH: u32 = 800;
pub const JPEG_QUALITY: u8 = 70;

pub const REPORTS_FOLDER: &str = "reports";
pub const PROFILES_FOLDER: &str = "profiles";

const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Durable home for compressed report photos and profile pictures.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store a JPEG and return the URL clients should use to fetch it.
    async fn upload(&self, jpeg: Vec<u8>, folder: &str) -> AppResult<String>;
}

/// Validate file magic bytes match the declared content type.
fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    match content_type {
        "image/jpeg" => data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF],
        "image/png" => data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47],
        "image/gif" => data.len() >= 4 && data[..4] == [0x47, 0x49, 0x46, 0x38],
        "image/webp" => {
            data.len() >= 12
                && data[..4] == [0x52, 0x49, 0x46, 0x46]
                && data[8..12] == [0x57, 0x45, 0x42, 0x50]
        }
        _ => false,
    }
}

pub fn validate_image(data: &[u8], content_type: &str) -> AppResult<()> {
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::PayloadTooLarge);
    }

    if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
        return Err(AppError::Validation(format!(
            "Unsupported file type: {}. Allowed: jpeg, png, gif, webp",
            content_type
        )));
    }

    if !validate_magic_bytes(data, content_type) {
        return Err(AppError::Validation(
            "File content does not match declared content type".to_string(),
        ));
    }

    Ok(())
}

/// Decode, shrink to at most [`MAX_WIDTH`] pixels wide and re-encode as JPEG.
pub fn compress_image(data: &[u8]) -> AppResult<Vec<u8>> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::Validation(format!("Could not decode image: {e}")))?;

    let img = if img.width() > MAX_WIDTH {
        img.resize(MAX_WIDTH, img.height(), FilterType::Triangle)
    } else {
        img
    };

    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JPEG encoding failed: {e}")))?;
    Ok(out)
}

/// Validate then compress off the async runtime.
pub async fn prepare_image(data: Vec<u8>, content_type: &str) -> AppResult<Vec<u8>> {
    validate_image(&data, content_type)?;
    tokio::task::spawn_blocking(move || compress_image(&data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("compression task failed: {e}")))?
}

/// Writes images under a local directory served at `/uploads`.
#[derive(Clone)]
pub struct LocalImageStorage {
    upload_dir: PathBuf,
}

impl LocalImageStorage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()))
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn upload(&self, jpeg: Vec<u8>, folder: &str) -> AppResult<String> {
        let filename = format!("{}.jpg", Uuid::new_v4());
        let dir = self.upload_dir.join(folder);

        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::UploadFailed(format!("Failed to create upload directory: {}", e))
        })?;

        fs::write(dir.join(&filename), jpeg)
            .await
            .map_err(|e| AppError::UploadFailed(format!("Failed to write file: {}", e)))?;

        Ok(format!("/uploads/{}/{}", folder, filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([200, 40, 40, 128]),
        ));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn jpeg_magic_bytes_valid() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert!(validate_magic_bytes(&data, "image/jpeg"));
    }

    #[test]
    fn webp_magic_bytes_valid() {
        let data = [
            0x52, 0x49, 0x46, 0x46, // RIFF
            0x00, 0x00, 0x00, 0x00, // size
            0x57, 0x45, 0x42, 0x50, // WEBP
        ];
        assert!(validate_magic_bytes(&data, "image/webp"));
    }

    #[test]
    fn wrong_magic_bytes_rejected() {
        let png_data = [0x89, 0x50, 0x4E, 0x47];
        assert!(!validate_magic_bytes(&png_data, "image/jpeg"));
        assert!(!validate_magic_bytes(&[], "image/png"));
    }

    #[test]
    fn validate_rejects_unsupported_type() {
        let data = [0xFF, 0xD8, 0xFF];
        assert!(matches!(
            validate_image(&data, "application/pdf"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_oversized_upload() {
        let mut data = vec![0u8; MAX_FILE_SIZE + 1];
        data[..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
        assert!(matches!(
            validate_image(&data, "image/jpeg"),
            Err(AppError::PayloadTooLarge)
        ));
    }

    #[test]
    fn wide_images_are_downscaled_to_jpeg() {
        let jpeg = compress_image(&png(1600, 400)).unwrap();
        assert_eq!(&jpeg[..3], &[0xFF, 0xD8, 0xFF]);

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), MAX_WIDTH);
        assert_eq!(decoded.height(), 200);
    }

    #[test]
    fn narrow_images_keep_their_size() {
        let jpeg = compress_image(&png(120, 90)).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 90));
    }

    #[test]
    fn undecodable_bytes_are_rejected() {
        let bogus = [0x89, 0x50, 0x4E, 0x47, 0x00, 0x00];
        assert!(matches!(
            compress_image(&bogus),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn local_storage_writes_under_folder() {
        let dir = std::env::temp_dir().join(format!("streetvoice-test-{}", Uuid::new_v4()));
        let storage = LocalImageStorage::new(&dir);

        let url = storage
            .upload(vec![0xFF, 0xD8, 0xFF, 0xD9], REPORTS_FOLDER)
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/reports/"));
        assert!(url.ends_with(".jpg"));

        let name = url.rsplit('/').next().unwrap();
        let written = std::fs::read(dir.join(REPORTS_FOLDER).join(name)).unwrap();
        assert_eq!(written, vec![0xFF, 0xD8, 0xFF, 0xD9]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
