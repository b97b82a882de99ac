// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Runtime configuration loaded from environment variables

use std::env;
use std::path::PathBuf;

use crate::vision::image_utils::MAX_IMAGE_SIZE;

/// Default ordered list of generative models tried for enrichment
///
/// Newest / highest-quota first, most stable last.
pub const DEFAULT_ENRICHMENT_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-2.0-flash-exp",
    "gemini-1.5-flash",
    "gemini-flash-latest",
];

/// Default Gemini REST base URL
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Top-level configuration for the leaf classification service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the ONNX leaf classifier (None disables classification)
    pub model_path: Option<PathBuf>,
    /// Enrichment (generative description) configuration
    pub enrichment: EnrichmentConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
}

/// Configuration for the enrichment fallback chain
#[derive(Clone)]
pub struct EnrichmentConfig {
    /// Gemini API key; absence puts enrichment in degraded mode
    pub api_key: Option<String>,
    /// Gemini REST base URL
    pub api_base: String,
    /// Candidate model names in priority order
    pub models: Vec<String>,
    /// Per-candidate request timeout in milliseconds
    pub timeout_ms: u64,
    /// Natural language the descriptions are written in
    pub language: String,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Directory uploads are stored in
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
}

// Manual Debug keeps the API key out of logs
impl std::fmt::Debug for EnrichmentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("models", &self.models)
            .field("timeout_ms", &self.timeout_ms)
            .field("language", &self.language)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            model_path: match env::var("MODEL_PATH") {
                Ok(path) if path.trim().is_empty() => None,
                Ok(path) => Some(PathBuf::from(path)),
                Err(_) => Some(PathBuf::from("./models/mobilenetv2_daun_v2.onnx")),
            },
            enrichment: EnrichmentConfig::from_env(),
            server: ServerConfig::from_env(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.enrichment.validate()?;
        self.server.validate()
    }
}

impl EnrichmentConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env::var("GEMINI_API_KEY")
                .ok()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            api_base: env::var("GEMINI_API_BASE")
                .ok()
                .map(|base| base.trim().trim_end_matches('/').to_string())
                .filter(|base| !base.is_empty())
                .unwrap_or(defaults.api_base),
            models: env::var("ENRICHMENT_MODELS")
                .ok()
                .map(|v| parse_model_list(&v))
                .filter(|models| !models.is_empty())
                .unwrap_or(defaults.models),
            timeout_ms: env::var("ENRICHMENT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_ms),
            language: env::var("ENRICHMENT_LANGUAGE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.language),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.models.is_empty() {
            return Err("At least one enrichment model must be configured".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("Enrichment timeout must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Whether a credential is present
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            models: DEFAULT_ENRICHMENT_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            timeout_ms: 30_000,
            language: "Bahasa Indonesia".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("API_HOST").unwrap_or(defaults.host),
            port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_upload_bytes == 0 {
            return Err("Maximum upload size must be greater than 0".to_string());
        }
        // Anything accepted here must also be accepted by the decoder
        if self.max_upload_bytes > MAX_IMAGE_SIZE {
            return Err(format!(
                "Maximum upload size {} exceeds the image decode limit of {} bytes",
                self.max_upload_bytes, MAX_IMAGE_SIZE
            ));
        }
        Ok(())
    }

    /// Socket address string, e.g. "0.0.0.0:5000"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Parse a comma-separated model list, dropping blanks
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
