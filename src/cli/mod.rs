// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::classifier::{ClassificationEngine, HerbalSpecies};
use crate::config::{parse_model_list, AppConfig};
use crate::enrichment::EnrichmentChain;
use crate::pipeline::{ErrorRecord, InferencePipeline};
use crate::version;
use crate::vision::{allowed_file, RawImage};

/// Herbal Leaf Node CLI
#[derive(Parser, Debug)]
#[command(name = "herbal-cli")]
#[command(version = version::VERSION_NUMBER)]
#[command(about = "Classify herbal leaf images from the command line", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a local image and print the result as JSON
    Classify(ClassifyArgs),

    /// List the herbal classes in classifier output order
    Classes,

    /// Check whether the model loads and enrichment is configured
    Health,
}

/// Overrides for values otherwise read from the environment
#[derive(Args, Debug, Clone, Default)]
pub struct RuntimeArgs {
    /// ONNX leaf classifier path
    #[arg(long, global = true)]
    pub model_path: Option<PathBuf>,

    /// Comma-separated enrichment model candidates, in priority order
    #[arg(long, global = true)]
    pub enrichment_models: Option<String>,

    /// Per-candidate enrichment timeout in milliseconds
    #[arg(long, global = true)]
    pub enrichment_timeout_ms: Option<u64>,

    /// Language for herbal descriptions
    #[arg(long, global = true)]
    pub language: Option<String>,
}

impl RuntimeArgs {
    /// Apply the overrides on top of an environment-derived config
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.model_path {
            config.model_path = Some(path.clone());
        }
        if let Some(models) = &self.enrichment_models {
            config.enrichment.models = parse_model_list(models);
        }
        if let Some(timeout_ms) = self.enrichment_timeout_ms {
            config.enrichment.timeout_ms = timeout_ms;
        }
        if let Some(language) = &self.language {
            config.enrichment.language = language.clone();
        }
    }
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Image file (png, jpg or jpeg)
    pub image: PathBuf,

    /// Skip the enrichment step
    #[arg(long)]
    pub no_enrichment: bool,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env();
    cli.runtime.apply(&mut config);
    config.validate().map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Classify(args) => classify(&config, args).await,
        Commands::Classes => {
            list_classes();
            Ok(())
        }
        Commands::Health => health(&config),
    }
}

async fn classify(config: &AppConfig, args: ClassifyArgs) -> Result<()> {
    let filename = args
        .image
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    if !allowed_file(&filename) {
        anyhow::bail!("Invalid file type '{}'. Allowed types: png, jpg, jpeg", filename);
    }

    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;

    let engine = ClassificationEngine::load(config.model_path.as_deref());
    let enrichment = if args.no_enrichment {
        EnrichmentChain::not_configured()
    } else {
        EnrichmentChain::from_config(&config.enrichment)?
    };

    let pipeline = InferencePipeline::new(Arc::new(engine), Arc::new(enrichment));

    match pipeline.process(RawImage::new(bytes, filename)).await {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&ErrorRecord::from(&e))?);
            Err(e.into())
        }
    }
}

fn list_classes() {
    for (index, species) in HerbalSpecies::ALL.iter().enumerate() {
        println!("{:>2}  {:<15} {}", index, species.id(), species.display_name());
    }
}

fn health(config: &AppConfig) -> Result<()> {
    let engine = ClassificationEngine::load(config.model_path.as_deref());

    println!("{}", version::get_version_string());
    println!("Features: {}", version::FEATURES.join(", "));
    match engine.unavailable_reason() {
        None => println!("✅ Classifier: loaded"),
        Some(reason) => println!("❌ Classifier: unavailable ({})", reason),
    }

    if config.enrichment.is_configured() {
        println!(
            "✅ Enrichment: configured ({})",
            config.enrichment.models.join(", ")
        );
    } else {
        println!("⚠️  Enrichment: GEMINI_API_KEY not set");
    }

    if engine.is_available() {
        Ok(())
    } else {
        anyhow::bail!("classifier unavailable")
    }
}
