//! Feature Engine Error Types

use lap_trace::TraceError;
use thiserror::Error;

/// Why an analysis stage could not produce its features
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    /// Trace is missing or misaligned on a channel the stage reads
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// Input is well-formed but unusable for this stage
    #[error("Degenerate input: {0}")]
    Degenerate(String),
}

/// Errors loading or validating the extractor configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
