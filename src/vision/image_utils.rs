// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image loading and upload validation for leaf classification

use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// Maximum image size (16MB)
pub const MAX_IMAGE_SIZE: usize = 16 * 1024 * 1024;

/// File extensions accepted for leaf uploads
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Custom error types for image processing
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// An uploaded image as received from the caller
///
/// Owned by the caller for the duration of one request. The bytes are
/// never retained after the pipeline returns.
#[derive(Debug, Clone)]
pub struct RawImage {
    /// Raw encoded bytes (PNG, JPEG, ...)
    pub bytes: Vec<u8>,
    /// Declared filename, used as the source reference in results
    pub filename: String,
}

impl RawImage {
    pub fn new(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Size in bytes
    pub size_bytes: usize,
}

/// Check whether an upload filename carries an accepted extension
///
/// The name must contain a `.` and the lowercase text after the last `.`
/// must be one of [`ALLOWED_EXTENSIONS`].
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Decode raw image bytes (for multipart uploads)
///
/// # Arguments
/// * `bytes` - Raw image bytes
///
/// # Returns
/// * `Ok((DynamicImage, ImageInfo))` - The decoded image and metadata
/// * `Err(ImageError)` - If decoding fails
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    // Detect format from magic bytes
    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img, info))
}

/// Detect image format from magic bytes
///
/// # Returns
/// * `Ok(ImageFormat)` - Detected format
/// * `Err(ImageError::UnsupportedFormat)` - If format cannot be detected
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}

/// MIME type for a stored upload, based on its extension
pub fn content_type_for(filename: &str) -> &'static str {
    match filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
