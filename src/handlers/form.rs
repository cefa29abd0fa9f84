use crate::error::{AppError, AppResult};
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use std::collections::HashMap;

pub struct UploadedFile {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A parsed multipart form: text fields by name plus at most one file.
#[derive(Default)]
pub struct FormFields {
    texts: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("Failed to read form: {}", e))
    }
}

impl FormFields {
    /// Trimmed value of a text field; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.texts
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, name: &str) -> AppResult<String> {
        self.text(name)
            .ok_or_else(|| AppError::Validation(format!("{name} is required")))
    }
}

/// Read every field of `multipart`. The part named `file_field` is kept as
/// bytes; an empty file part (browser with nothing selected) is ignored.
pub async fn read_form(mut multipart: Multipart, file_field: &str) -> AppResult<FormFields> {
    let mut form = FormFields::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            if !data.is_empty() {
                form.file = Some(UploadedFile {
                    content_type,
                    data: data.to_vec(),
                });
            }
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.texts.insert(name, value);
        }
    }

    Ok(form)
}
