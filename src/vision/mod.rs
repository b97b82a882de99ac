// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for leaf images
//!
//! This module provides:
//! - Upload decoding and extension validation
//! - Conversion of a decoded image into the classifier's input tensor

pub mod image_utils;
pub mod preprocessing;

pub use image_utils::{
    allowed_file, decode_image_bytes, detect_format, ImageError, ImageInfo, RawImage,
    ALLOWED_EXTENSIONS,
};
pub use preprocessing::{image_to_tensor, normalize, ImageTensor, INPUT_SIZE, TENSOR_SHAPE};
