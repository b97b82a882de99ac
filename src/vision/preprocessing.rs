// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the leaf classifier
//!
//! The classifier was trained on 224x224 RGB inputs scaled to [0, 1] in
//! NHWC layout, so preprocessing is a plain stretch-resize and rescale.
//! No mean/std normalization is applied.

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::{Array4, ArrayView4};

use super::image_utils::{decode_image_bytes, ImageError, RawImage};

/// Classifier input edge length in pixels
pub const INPUT_SIZE: u32 = 224;

/// Number of color channels (RGB)
pub const CHANNELS: usize = 3;

/// Full tensor shape: [batch, height, width, channels]
pub const TENSOR_SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, CHANNELS];

/// Resampling filter used for the stretch-resize (bicubic, deterministic)
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// A preprocessed classifier input of shape `[1, 224, 224, 3]`
///
/// Values are f32 in `[0.0, 1.0]`, channel order RGB. The inner array is
/// not exposed mutably; a tensor is created once per request and consumed
/// by a single classification call.
#[derive(Debug, Clone)]
pub struct ImageTensor {
    data: Array4<f32>,
}

impl ImageTensor {
    /// Tensor shape, always [`TENSOR_SHAPE`]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.data.view()
    }
}

/// Decode and preprocess an uploaded image
///
/// Steps:
/// 1. Decode the bytes (PNG, JPEG, ...)
/// 2. Convert to 3-channel RGB (grayscale is expanded, alpha is dropped)
/// 3. Stretch-resize to 224x224, ignoring aspect ratio
/// 4. Scale 0-255 intensities to [0, 1]
/// 5. Add the leading batch dimension: [1, 224, 224, 3]
///
/// # Errors
/// Returns [`ImageError`] when the bytes cannot be decoded as a raster image.
pub fn normalize(image: &RawImage) -> Result<ImageTensor, ImageError> {
    let (decoded, info) = decode_image_bytes(&image.bytes)?;

    tracing::debug!(
        "Decoded {}: {}x{} {:?}, {} bytes",
        image.filename,
        info.width,
        info.height,
        info.format,
        info.size_bytes
    );

    Ok(image_to_tensor(&decoded))
}

/// Convert an already-decoded image into a classifier tensor
pub fn image_to_tensor(image: &DynamicImage) -> ImageTensor {
    let rgb = image.to_rgb8();
    let resized = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, RESIZE_FILTER);

    let data = Array4::from_shape_fn(TENSOR_SHAPE, |(_, y, x, c)| {
        resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    });

    ImageTensor { data }
}
