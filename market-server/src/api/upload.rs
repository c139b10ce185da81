//! Product image storage
//!
//! Uploaded bytes are validated with the `image` crate, re-encoded as
//! JPEG and written to local disk under a SHA256 content-addressed name,
//! so re-uploading the same image is idempotent. Products store the
//! returned `/images/products/{hash}.jpg` path strings.

use image::codecs::jpeg::JpegEncoder;
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::Path;

use shared::error::{AppError, ErrorCode};

/// Maximum file size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// JPEG quality for re-encoded uploads
const JPEG_QUALITY: u8 = 85;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Validate, re-encode and store one uploaded image.
/// Returns the public path to store on the product.
pub async fn save_image(
    image_dir: &Path,
    filename: &str,
    data: &[u8],
) -> Result<String, AppError> {
    if data.is_empty() {
        return Err(AppError::new(ErrorCode::NoFileProvided));
    }

    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large: {} bytes (max {MAX_FILE_SIZE})", data.len()),
        ));
    }

    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!("Unsupported format: {ext}. Supported: png, jpg, jpeg, webp"),
        ));
    }

    // Validate content, not just the extension
    let img = image::load_from_memory(data).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidImageFile, format!("Invalid image: {e}"))
    })?;

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img.write_with_encoder(encoder).map_err(|e| {
            tracing::error!("Image re-encoding failed: {e}");
            AppError::new(ErrorCode::FileStorageFailed)
        })?;
    }

    let mut hasher = Sha256::new();
    hasher.update(&buffer);
    let hash = hex::encode(hasher.finalize());

    let target = image_dir.join(format!("{hash}.jpg"));
    tokio::fs::write(&target, &buffer).await.map_err(|e| {
        tracing::error!(path = %target.display(), "Image write failed: {e}");
        AppError::new(ErrorCode::FileStorageFailed)
    })?;

    tracing::info!(hash = %hash, "Product image stored");
    Ok(format!("/images/products/{hash}.jpg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30]));
        let mut buffer = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[tokio::test]
    async fn test_save_image_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let data = png_bytes();

        let path_a = save_image(dir.path(), "photo.png", &data).await.unwrap();
        let path_b = save_image(dir.path(), "copy.png", &data).await.unwrap();

        assert_eq!(path_a, path_b);
        assert!(path_a.starts_with("/images/products/"));
        assert!(path_a.ends_with(".jpg"));

        let stored = dir.path().join(path_a.rsplit('/').next().unwrap());
        assert!(stored.exists());
    }

    #[tokio::test]
    async fn test_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(dir.path(), "photo.png", &[]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoFileProvided);
    }

    #[tokio::test]
    async fn test_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = vec![0u8; MAX_FILE_SIZE + 1];
        let err = save_image(dir.path(), "photo.png", &data).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::FileTooLarge);
    }

    #[tokio::test]
    async fn test_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(dir.path(), "photo.gif", &png_bytes())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);
    }

    #[tokio::test]
    async fn test_rejects_non_image_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(dir.path(), "photo.png", b"definitely not a png")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidImageFile);
    }
}
