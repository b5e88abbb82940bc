//! Inline image uploads: data-URL decoding and storage under the uploads directory

use std::path::{Component, Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::{
    config::UploadsConfig,
    error::{AppError, AppResult},
};

static DATA_URL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/\w+;base64,").expect("valid data URL pattern")
});

/// Decode a `data:image/<type>;base64,<payload>` URL into raw bytes
pub fn decode_image_data_url(data_url: &str) -> AppResult<Vec<u8>> {
    let prefix = DATA_URL_PREFIX
        .find(data_url)
        .ok_or_else(|| AppError::BadRequest("Invalid image data format".to_string()))?;

    STANDARD
        .decode(&data_url[prefix.end()..])
        .map_err(|_| AppError::BadRequest("Invalid image data".to_string()))
}

#[derive(Clone)]
pub struct UploadsService {
    config: UploadsConfig,
}

impl UploadsService {
    pub fn new(config: UploadsConfig) -> Self {
        Self { config }
    }

    /// Store an image under `<dir>/<category>/<uuid>.png` and return its public URL
    pub async fn store_image(&self, category: &str, data_url: &str) -> AppResult<String> {
        let bytes = decode_image_data_url(data_url)?;

        let dir = PathBuf::from(&self.config.dir).join(category);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Internal(format!("Failed to create upload directory: {}", e))
        })?;

        let file_name = format!("{}.png", Uuid::new_v4());
        tokio::fs::write(dir.join(&file_name), &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to save image: {}", e)))?;

        tracing::debug!(bytes = bytes.len(), "Stored {}/{}", category, file_name);

        Ok(format!("{}{}/{}", self.public_prefix(), category, file_name))
    }

    /// Remove a previously stored image. URLs outside the uploads prefix and
    /// files that are already gone are ignored.
    pub async fn remove(&self, url: &str) {
        let Some(path) = self.local_path(url) else {
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("Removed upload {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, "Failed to remove upload {}", path.display()),
        }
    }

    /// Map a public upload URL back to its file under the uploads directory
    pub fn local_path(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.strip_prefix(&self.public_prefix())?);
        let mut components = relative.components();
        if !components.all(|c| matches!(c, Component::Normal(_))) || relative.as_os_str().is_empty() {
            return None;
        }
        Some(PathBuf::from(&self.config.dir).join(relative))
    }

    fn public_prefix(&self) -> String {
        format!("{}/uploads/", self.config.base_url.trim_end_matches('/'))
    }
}
