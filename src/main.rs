//! cyclestyle CLI - Apply Monet-style cyclic GAN transfer to photos.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cyclestyle::{Config, Pipeline};

/// Apply cycle-consistent Monet style transfer to a photo.
#[derive(Parser, Debug)]
#[command(name = "cyclestyle")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input image path.
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output image path.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Output JPEG quality (1-100).
    #[arg(short, long, default_value = "95", value_name = "INT")]
    quality: u8,

    /// Directory holding the generator models (skips the download cache).
    #[arg(long, value_name = "DIR")]
    models_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("cyclestyle={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    // Validate input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    // Build configuration
    let config = Config {
        output_quality: args.quality,
        models_dir: args.models_dir.clone(),
    };

    // Create and run pipeline
    let mut pipeline = Pipeline::new(config).context("Failed to initialize pipeline")?;

    let result = pipeline
        .process(&args.input, &args.output)
        .context("Failed to process image");

    pipeline.close().context("Failed to close pipeline")?;
    result?;

    println!(
        "Successfully stylized {} -> {}",
        args.input.display(),
        args.output.display()
    );

    Ok(())
}
