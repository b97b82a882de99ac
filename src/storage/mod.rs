// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod uploads;

// Re-export main types for convenience
pub use uploads::{secure_filename, StoredUpload, UploadError, UploadStore};
