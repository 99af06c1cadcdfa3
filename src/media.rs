use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use uuid::Uuid;

use crate::{
    config::Settings,
    constants::{IMAGE_EXTENSIONS, RECIPE_IMAGE_DIR},
    database::error::TypeError,
    error::ApiError,
};

/// A decoded `data:image/<ext>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

pub fn decode_data_url(data_url: &str) -> Result<DecodedImage, TypeError> {
    let invalid = |message: &str| TypeError::new("image", message);

    let (header, payload) = data_url
        .trim()
        .split_once(',')
        .ok_or_else(|| invalid("Expected a base64 data URL."))?;

    let extension = header
        .strip_prefix("data:image/")
        .and_then(|rest| rest.strip_suffix(";base64"))
        .ok_or_else(|| invalid("Expected a base64 data URL."))?
        .to_ascii_lowercase();

    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(invalid("Unsupported image type."));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| invalid("Image payload is not valid base64."))?;

    if bytes.is_empty() {
        return Err(invalid("The submitted file is empty."));
    }

    Ok(DecodedImage { extension, bytes })
}

/// Decodes and writes the image under `root`. Returns the reference stored with the recipe.
pub async fn save_image(root: &Path, data_url: &str) -> Result<String, ApiError> {
    let image = decode_data_url(data_url)?;
    let file_name = format!("{}.{}", Uuid::new_v4(), image.extension);
    let dir = root.join(RECIPE_IMAGE_DIR);

    tokio::fs::create_dir_all(&dir).await.map_err(|e| {
        log::error!("Could not create media directory {}: {e}", dir.display());
        ApiError::Internal(e.to_string())
    })?;
    tokio::fs::write(dir.join(&file_name), &image.bytes)
        .await
        .map_err(|e| {
            log::error!("Could not store image {file_name}: {e}");
            ApiError::Internal(e.to_string())
        })?;

    Ok(format!("{RECIPE_IMAGE_DIR}/{file_name}"))
}

/// Best effort; a missing file is not an error.
pub async fn remove_image(root: &Path, reference: &str) {
    if let Err(e) = tokio::fs::remove_file(root.join(reference)).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Could not remove image {reference}: {e}");
        }
    }
}

pub fn image_url(settings: &Settings, reference: &str) -> String {
    format!(
        "{}/{}",
        settings.media_url.trim_end_matches('/'),
        reference.trim_start_matches('/')
    )
}
