//! vismatch - command-line driver for building and querying the index.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use vismatch::config::Settings;
use vismatch::embedding::PixelHashProvider;
use vismatch::MatchService;

#[derive(Parser)]
#[command(name = "vismatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build and query a visual similarity index over catalog images")]
struct Cli {
    /// Settings file; defaults are used when absent.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Inventory directory, overriding the settings file.
    #[arg(long, value_name = "DIR", global = true)]
    inventory: Option<PathBuf>,

    /// Matrix artifact path, overriding the settings file.
    #[arg(long, value_name = "FILE", global = true)]
    matrix: Option<PathBuf>,

    /// Metadata artifact path, overriding the settings file.
    #[arg(long, value_name = "FILE", global = true)]
    metadata: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract embeddings for every inventory image and persist the index
    Build {
        /// Images per provider call
        #[arg(long, value_name = "N")]
        batch_size: Option<usize>,

        /// Recompute embeddings even when a cached index exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Find inventory items visually similar to a query image
    Query {
        /// Query image path
        #[arg(short, long, value_name = "FILE")]
        image: PathBuf,

        /// Number of results to return
        #[arg(long, value_name = "N")]
        top_k: Option<usize>,

        /// Emit results as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => match Settings::default_path() {
            Some(path) => Settings::load_or_default(&path)?,
            None => Settings::default(),
        },
    };

    if let Some(inventory) = &cli.inventory {
        settings.inventory_dir = inventory.clone();
    }
    if let Some(matrix) = &cli.matrix {
        settings.matrix_path = matrix.clone();
    }
    if let Some(metadata) = &cli.metadata {
        settings.metadata_path = metadata.clone();
    }
    Ok(settings)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(&cli)?;

    let provider = Box::new(PixelHashProvider::default());
    let mut service = MatchService::new(provider, &settings)
        .context("failed to initialize matching service")?;

    match cli.command {
        Commands::Build {
            batch_size,
            overwrite,
        } => {
            let batch_size = batch_size.unwrap_or(settings.batch_size);
            let count = service.build(batch_size, overwrite)?;
            println!("Embeddings available for {count} images");
        }
        Commands::Query { image, top_k, json } => {
            // A query needs a resident index; reuse the cache when present,
            // build otherwise.
            let count = service.build(settings.batch_size, false)?;
            tracing::debug!(items = count, "index ready for query");

            let results = service.find_similar(&image, top_k.unwrap_or(settings.top_k))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for result in &results {
                    println!("{result}");
                }
            }
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}
