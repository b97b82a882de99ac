// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use herbal_leaf_node::{
    api::{start_server, AppState},
    classifier::ClassificationEngine,
    config::AppConfig,
    enrichment::EnrichmentChain,
    pipeline::InferencePipeline,
    storage::UploadStore,
    version,
};
use std::{env, path::PathBuf, sync::Arc};
use tracing::{info, warn};

/// Herbal leaf classification server
#[derive(Parser, Debug)]
#[command(name = "herbal-leaf-node", version = version::VERSION_NUMBER)]
struct ServerCli {
    /// Bind host
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(long)]
    port: Option<u16>,

    /// ONNX leaf classifier path
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Directory for uploaded images
    #[arg(long)]
    upload_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = ServerCli::parse();

    println!("🌿 Starting Herbal Leaf Node...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let mut config = AppConfig::from_env();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(path) = cli.model_path {
        config.model_path = Some(path);
    }
    if let Some(dir) = cli.upload_dir {
        config.server.upload_dir = dir;
    }
    config.validate().map_err(anyhow::Error::msg)?;

    println!("🧠 Loading leaf classifier...");
    let engine = ClassificationEngine::load(config.model_path.as_deref());
    if engine.is_available() {
        println!("✅ Leaf classifier loaded");
    } else {
        println!("⚠️  Leaf classifier unavailable, /predict will return 503");
    }

    match config.enrichment.api_key.as_deref() {
        Some(key) => info!(
            "Gemini API key configured ({}...)",
            key.chars().take(4).collect::<String>()
        ),
        None => warn!("Gemini API key missing, descriptions run in degraded mode"),
    }
    let enrichment = EnrichmentChain::from_config(&config.enrichment)?;

    let pipeline = Arc::new(InferencePipeline::new(
        Arc::new(engine),
        Arc::new(enrichment),
    ));

    let state = AppState::new(
        pipeline,
        UploadStore::new(config.server.upload_dir.clone()),
        config.server.max_upload_bytes,
    );

    info!(
        "Uploads stored in {}, limit {} bytes",
        config.server.upload_dir.display(),
        config.server.max_upload_bytes
    );

    let bind_address = config.server.bind_address();
    let server = start_server(state, &bind_address);

    tokio::select! {
        result = server => result?,
        _ = tokio::signal::ctrl_c() => {
            println!("\n🛑 Shutting down Herbal Leaf Node...");
        }
    }

    Ok(())
}
