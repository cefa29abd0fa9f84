use super::non_empty_env;

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

impl CloudinaryConfig {
    /// Returns None unless all three credentials are present.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            cloud_name: non_empty_env("CLOUDINARY_CLOUD_NAME")?,
            api_key: non_empty_env("CLOUDINARY_API_KEY")?,
            api_secret: non_empty_env("CLOUDINARY_API_SECRET")?,
            folder: non_empty_env("CLOUDINARY_FOLDER").unwrap_or_else(|| "streetvoice".to_string()),
        })
    }
}
