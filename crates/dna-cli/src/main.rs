//! driver-dna - Lap Telemetry Feature Extraction

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dna_cli::{extract_file, init_logging, validate_file};
use feature_engine::{ExtractorConfig, Feature, FeatureExtractor};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "driver-dna")]
#[command(about = "Extract driving-style feature vectors from lap telemetry")]
#[command(version)]
struct Cli {
    /// Verbose logging (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the feature vector of each lap file
    Extract {
        /// Lap trace files (JSON columns or an array of samples)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Driver id for every file (defaults to each file's stem)
        #[arg(short, long)]
        driver: Option<String>,

        /// Extractor configuration file (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Include per-stage diagnostics in the output
        #[arg(long)]
        diagnostics: bool,
    },

    /// Check lap files for structural problems
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the feature vocabulary
    Features,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    info!("=== driver-dna v{} ===", env!("CARGO_PKG_VERSION"));

    let success = match cli.command {
        Commands::Extract {
            files,
            driver,
            config,
            pretty,
            diagnostics,
        } => run_extract(&files, driver.as_deref(), config, pretty, diagnostics)?,
        Commands::Validate { files } => run_validate(&files),
        Commands::Features => {
            for feature in Feature::ALL {
                println!("{:<28} {:<28} {}", feature.as_str(), feature.label(), feature.description());
            }
            true
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn run_extract(
    files: &[PathBuf],
    driver: Option<&str>,
    config: Option<PathBuf>,
    pretty: bool,
    diagnostics: bool,
) -> Result<bool> {
    let config = ExtractorConfig::load(config.as_deref()).context("Failed to load extractor configuration")?;
    let extractor = FeatureExtractor::new(config)?;
    let mut success = true;

    for path in files {
        match extract_file(&extractor, path, driver, diagnostics) {
            Ok(output) => {
                let json = if pretty {
                    serde_json::to_string_pretty(&output)?
                } else {
                    serde_json::to_string(&output)?
                };
                println!("{}", json);
            }
            Err(e) => {
                error!("{:#}", e);
                success = false;
            }
        }
    }

    Ok(success)
}

fn run_validate(files: &[PathBuf]) -> bool {
    let mut success = true;

    for path in files {
        match validate_file(path) {
            Ok(problems) if problems.is_empty() => println!("{}: ok", path.display()),
            Ok(problems) => {
                success = false;
                for problem in problems {
                    println!("{}: {}", path.display(), problem);
                }
            }
            Err(e) => {
                success = false;
                println!("{}: {:#}", path.display(), e);
            }
        }
    }

    success
}
