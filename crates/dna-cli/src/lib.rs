//! Driver DNA Command Line
//!
//! Loads lap traces from JSON files and runs the feature extractor over them.

use anyhow::{Context, Result};
use feature_engine::{FeatureExtractor, FeatureVector, StageDiagnostic};
use lap_trace::{LapTrace, TraceError};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Extraction result for one input file
#[derive(Debug, Serialize)]
pub struct LapOutput {
    pub file: String,
    pub driver: String,
    pub features: FeatureVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Vec<StageDiagnostic>>,
}

/// Initialize logging to stderr.
///
/// `RUST_LOG` takes precedence over the verbosity count.
pub fn init_logging(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if let Err(e) = installed {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Read and decode a lap trace from a JSON file
pub fn load_trace(path: &Path) -> Result<LapTrace> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let trace = LapTrace::from_json_str(&text)
        .with_context(|| format!("Failed to decode lap trace from {}", path.display()))?;

    debug!("Loaded {} samples from {}", trace.len(), path.display());
    Ok(trace)
}

/// Driver id for a file: the explicit override, else the file stem
pub fn driver_id_for(path: &Path, driver: Option<&str>) -> String {
    match driver {
        Some(id) => id.to_string(),
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

/// Extract the feature vector for one lap file
pub fn extract_file(
    extractor: &FeatureExtractor,
    path: &Path,
    driver: Option<&str>,
    include_diagnostics: bool,
) -> Result<LapOutput> {
    let trace = load_trace(path)?;
    let driver = driver_id_for(path, driver);
    let report = extractor.extract(&driver, &trace);

    info!(
        "Extracted {} features for {} ({} stage failures)",
        report.features.len(),
        driver,
        report.diagnostics.len()
    );

    Ok(LapOutput {
        file: path.display().to_string(),
        driver,
        features: report.features,
        diagnostics: include_diagnostics.then_some(report.diagnostics),
    })
}

/// Structural problems in one lap file
pub fn validate_file(path: &Path) -> Result<Vec<TraceError>> {
    Ok(load_trace(path)?.validate())
}
