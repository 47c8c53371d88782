//! Image input resolution for `image_caption` requests.
//!
//! The caller's input is either an `http(s)://` URL or a base64 payload. Either
//! way the bytes are decoded as an image, re-encoded as JPEG and written to the
//! images directory under a timestamp-derived name. The returned path is what
//! gets substituted into the caption prompt.
//!
//! # Layout
//!
//! ```text
//! {images_dir}/
//! ├── 2026-10-18T09-15-02.123456.jpg
//! └── 2026-10-18T09-16-40.004211.jpg
//! ```

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::Engine;
use image::ImageFormat;
use reqwest::Client;
use tokio::fs;
use tracing::debug;

use crate::error::{MultitoolError, Result};
use crate::logs::now_timestamp;

/// Resolves image references to local JPEG files.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    images_dir: PathBuf,
    client: Client,
}

impl ImageResolver {
    /// Create a resolver writing into `images_dir`.
    ///
    /// The directory is created lazily on first write.
    pub fn new(images_dir: PathBuf, client: Client) -> Self {
        Self { images_dir, client }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Fetch or decode `input_ref`, store it as JPEG and return the local path.
    ///
    /// # Errors
    ///
    /// Returns [`MultitoolError::InputResolution`] when the fetch fails, the
    /// payload is not valid base64, or the bytes are not a decodable image.
    pub async fn resolve(&self, input_ref: &str) -> Result<PathBuf> {
        let bytes = if is_url(input_ref) {
            self.fetch(input_ref).await?
        } else {
            decode_base64(input_ref)?
        };

        let jpeg = tokio::task::spawn_blocking(move || to_jpeg(&bytes))
            .await
            .map_err(|e| MultitoolError::InputResolution(format!("Image worker failed: {e}")))??;

        fs::create_dir_all(&self.images_dir).await?;
        let path = self.images_dir.join(image_filename(&now_timestamp()));
        fs::write(&path, jpeg)
            .await
            .map_err(|e| MultitoolError::InputResolution(format!("Failed to write image: {e}")))?;
        debug!(path = %path.display(), "Stored image input");
        Ok(path)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "Fetching image input");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MultitoolError::InputResolution(format!("Image fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MultitoolError::InputResolution(format!(
                "Image fetch returned HTTP {}",
                status.as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MultitoolError::InputResolution(format!("Image fetch failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// True when `input` carries an `http://` or `https://` scheme.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Decode a standard-alphabet base64 payload.
///
/// Bytes outside the alphabet (line breaks from MIME-wrapped output, stray
/// spaces) are discarded before decoding.
pub fn decode_base64(input: &str) -> Result<Vec<u8>> {
    let cleaned: Vec<u8> = input
        .bytes()
        .filter(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
        .collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| MultitoolError::InputResolution(format!("Invalid base64 image: {e}")))
}

/// Decode any supported image format and re-encode it as JPEG.
pub fn to_jpeg(bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| MultitoolError::InputResolution(format!("Cannot decode image: {e}")))?;
    // JPEG has no alpha channel.
    let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, ImageFormat::Jpeg)
        .map_err(|e| MultitoolError::InputResolution(format!("Cannot encode JPEG: {e}")))?;
    Ok(out.into_inner())
}

/// Filesystem-safe file name for a timestamp (`:` is replaced by `-`).
pub fn image_filename(timestamp: &str) -> String {
    format!("{}.jpg", timestamp.replace(':', "-"))
}
