//! Trace Error Types

use crate::Channel;
use thiserror::Error;

/// Structural problems found in a lap trace
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraceError {
    /// A channel needed by the caller is not present
    #[error("Missing telemetry channel: {0}")]
    MissingChannel(Channel),

    /// A channel does not line up with the rest of the trace
    #[error("{channel} has {actual} samples, expected {expected}")]
    LengthMismatch {
        channel: Channel,
        expected: usize,
        actual: usize,
    },

    /// Trace has no samples at all
    #[error("Trace contains no samples")]
    Empty,

    /// A numeric sample is NaN or infinite
    #[error("{channel} sample {index} is not a finite number")]
    NonFinite { channel: Channel, index: usize },
}
