//! Throttle application stage

use crate::error::StageError;
use crate::onset::scored_onsets;
use crate::statistics::mean_or_missing;
use crate::settings::ExtractorConfig;
use lap_trace::LapTrace;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Throttle pick-up behavior over one lap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleSummary {
    /// Throttle onsets with a full scoring window
    pub onsets: Vec<usize>,
    /// Throttle gain per sample after each onset
    pub intensities: Vec<f64>,
    /// Mean gain, NaN when there were no onsets
    pub avg_intensity: f64,
}

/// Measure how quickly the throttle is opened after it crosses the onset threshold.
pub fn analyze(trace: &LapTrace, config: &ExtractorConfig) -> Result<ThrottleSummary, StageError> {
    let throttle = trace.throttle()?;
    let window = config.onset_window_samples;
    let threshold = config.throttle_onset_threshold_pct;

    // Both comparisons are explicit so a NaN predecessor never registers an onset
    let onsets = scored_onsets(throttle.len(), window, |i| {
        throttle[i] > threshold && throttle[i - 1] <= threshold
    });

    let intensities: Vec<f64> = onsets
        .iter()
        .map(|&i| (throttle[i + window] - throttle[i]) / window as f64)
        .collect();

    debug!("Throttle: {} scored onsets above {}%", onsets.len(), threshold);

    Ok(ThrottleSummary {
        avg_intensity: mean_or_missing(&intensities),
        onsets,
        intensities,
    })
}
