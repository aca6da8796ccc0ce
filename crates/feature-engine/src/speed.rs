//! Speed variability stage

use crate::error::StageError;
use crate::statistics::{Dispersion, SeriesStats};
use lap_trace::LapTrace;
use serde::{Deserialize, Serialize};

/// Speed distribution over one lap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedSummary {
    pub mean: f64,
    /// Sample standard deviation, NaN with fewer than two finite samples
    pub std_dev: f64,
    /// Coefficient of variation, NaN when undefined
    pub variability: f64,
}

/// Coefficient of variation of speed across the lap.
///
/// Non-finite samples are ignored.
pub fn analyze(trace: &LapTrace) -> Result<SpeedSummary, StageError> {
    let stats = SeriesStats::compute(trace.speed()?);

    Ok(SpeedSummary {
        mean: stats.mean,
        std_dev: stats.std_dev(Dispersion::Sample).unwrap_or(f64::NAN),
        variability: stats
            .coefficient_of_variation(Dispersion::Sample)
            .unwrap_or(f64::NAN),
    })
}
