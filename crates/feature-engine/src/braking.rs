//! Braking intensity stage

use crate::error::StageError;
use crate::onset::scored_onsets;
use crate::statistics::mean_or_missing;
use crate::settings::ExtractorConfig;
use lap_trace::LapTrace;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Brake application behavior over one lap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrakingSummary {
    /// Brake onsets with a full scoring window
    pub onsets: Vec<usize>,
    /// Intensity of each scored onset
    pub intensities: Vec<f64>,
    /// Mean intensity, NaN when there were no onsets
    pub avg_intensity: f64,
}

/// Score how firmly the brake stays applied right after each brake onset.
///
/// Intensity is the number of active samples in the window following the
/// onset divided by the window length, so it reflects pedal persistence even
/// when pressure data is unavailable.
pub fn analyze(trace: &LapTrace, config: &ExtractorConfig) -> Result<BrakingSummary, StageError> {
    let brake = trace.brake()?;
    let window = config.onset_window_samples;

    let onsets = scored_onsets(brake.len(), window, |i| brake[i] && !brake[i - 1]);
    let first = if config.brake_window_includes_onset { 0 } else { 1 };

    let intensities: Vec<f64> = onsets
        .iter()
        .map(|&i| {
            let active = brake[i + first..=i + window].iter().filter(|&&on| on).count();
            active as f64 / window as f64
        })
        .collect();

    debug!("Braking: {} scored onsets", onsets.len());

    Ok(BrakingSummary {
        avg_intensity: mean_or_missing(&intensities),
        onsets,
        intensities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lap_trace::{Channel, TraceError};

    fn trace_with_brake(brake: Vec<bool>) -> LapTrace {
        let n = brake.len();
        LapTrace::new(brake, vec![0.0; n], vec![100.0; n], vec![3; n])
    }

    fn pattern(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '#').collect()
    }

    #[test]
    fn test_no_brake_is_missing() {
        let trace = trace_with_brake(vec![false; 30]);
        let summary = analyze(&trace, &ExtractorConfig::default()).unwrap();
        assert!(summary.onsets.is_empty());
        assert!(summary.avg_intensity.is_nan());
    }

    #[test]
    fn test_sustained_application() {
        // Onset at 2 followed by four more active samples: 5 of 6 in the window
        let trace = trace_with_brake(pattern("..#####....."));
        let summary = analyze(&trace, &ExtractorConfig::default()).unwrap();
        assert_eq!(summary.onsets, vec![2]);
        assert!((summary.avg_intensity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_counts_onset_sample() {
        let trace = trace_with_brake(pattern("..#.........."));
        let summary = analyze(&trace, &ExtractorConfig::default()).unwrap();
        assert!((summary.avg_intensity - 0.2).abs() < 1e-12);

        let trace = trace_with_brake(pattern("..########..."));
        let summary = analyze(&trace, &ExtractorConfig::default()).unwrap();
        assert!((summary.avg_intensity - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_window_after_onset() {
        let config = ExtractorConfig {
            brake_window_includes_onset: false,
            ..Default::default()
        };

        let sustained = trace_with_brake(pattern("..########..."));
        let summary = analyze(&sustained, &config).unwrap();
        assert!((summary.avg_intensity - 1.0).abs() < 1e-12);

        let tap = trace_with_brake(pattern("..#.........."));
        let summary = analyze(&tap, &config).unwrap();
        assert_eq!(summary.avg_intensity, 0.0);
    }

    #[test]
    fn test_mean_over_onsets() {
        // Two onsets: 6/5 and 2/5
        let trace = trace_with_brake(pattern(".######...##......"));
        let summary = analyze(&trace, &ExtractorConfig::default()).unwrap();
        assert_eq!(summary.onsets, vec![1, 10]);
        assert!((summary.avg_intensity - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_braking_from_first_sample_is_not_an_onset() {
        let trace = trace_with_brake(pattern("######........"));
        let summary = analyze(&trace, &ExtractorConfig::default()).unwrap();
        assert!(summary.avg_intensity.is_nan());
    }

    #[test]
    fn test_onset_without_full_window_is_ignored() {
        let trace = trace_with_brake(pattern("........##"));
        let summary = analyze(&trace, &ExtractorConfig::default()).unwrap();
        assert!(summary.onsets.is_empty());
    }

    #[test]
    fn test_missing_brake_channel() {
        let trace = LapTrace::default().with_speed(vec![100.0; 10]);
        let err = analyze(&trace, &ExtractorConfig::default()).unwrap_err();
        assert_eq!(err, StageError::Trace(TraceError::MissingChannel(Channel::Brake)));
    }
}
