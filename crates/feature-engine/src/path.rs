//! Path smoothness stage

use crate::error::StageError;
use crate::statistics::{Dispersion, SeriesStats};
use crate::settings::ExtractorConfig;
use lap_trace::LapTrace;
use serde::{Deserialize, Serialize};

/// Regularity of the driven line over one lap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSummary {
    /// Number of position steps
    pub steps: usize,
    pub mean_step: f64,
    /// Step length coefficient of variation, NaN with too few steps
    pub smoothness: f64,
}

/// Coefficient of variation of the distance between consecutive positions.
///
/// Returns `Ok(None)` when the trace has no planar position data.
pub fn analyze(trace: &LapTrace, config: &ExtractorConfig) -> Result<Option<PathSummary>, StageError> {
    let Some((x, y)) = trace.position()? else {
        return Ok(None);
    };

    let steps: Vec<f64> = x
        .windows(2)
        .zip(y.windows(2))
        .map(|(dx, dy)| (dx[1] - dx[0]).hypot(dy[1] - dy[0]))
        .collect();

    if let Some(index) = steps.iter().position(|s| !s.is_finite()) {
        return Err(StageError::Degenerate(format!(
            "non-finite position around sample {}",
            index + 1
        )));
    }

    let stats = SeriesStats::compute(&steps);
    let smoothness = if steps.len() > config.min_path_steps {
        stats
            .coefficient_of_variation(Dispersion::Population)
            .unwrap_or(f64::NAN)
    } else {
        f64::NAN
    };

    Ok(Some(PathSummary {
        steps: steps.len(),
        mean_step: stats.mean,
        smoothness,
    }))
}
