//! Per-lap feature extraction
//!
//! Runs every analysis stage over one lap trace. Stages are isolated from each
//! other: a stage that fails leaves its features missing and records a
//! [`StageDiagnostic`], while the remaining stages still contribute.

use crate::error::{ConfigError, StageError};
use crate::features::{Feature, FeatureVector};
use crate::settings::ExtractorConfig;
use crate::{braking, corners, gears, path, speed, throttle};
use lap_trace::LapTrace;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Analysis stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Braking,
    Throttle,
    SpeedVariability,
    Gears,
    Corners,
    PathSmoothness,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Braking,
        Stage::Throttle,
        Stage::SpeedVariability,
        Stage::Gears,
        Stage::Corners,
        Stage::PathSmoothness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Braking => "braking",
            Stage::Throttle => "throttle",
            Stage::SpeedVariability => "speed_variability",
            Stage::Gears => "gears",
            Stage::Corners => "corners",
            Stage::PathSmoothness => "path_smoothness",
        }
    }

    /// Features produced by this stage
    pub fn features(&self) -> &'static [Feature] {
        match self {
            Stage::Braking => &[Feature::AvgBrakeIntensity],
            Stage::Throttle => &[Feature::AvgThrottleIntensity],
            Stage::SpeedVariability => &[Feature::SpeedVariability],
            Stage::Gears => &[Feature::GearChanges, Feature::ShortShiftRatio],
            Stage::Corners => &[Feature::EntryExitBias, Feature::AvgCornerSpeedReduction],
            Stage::PathSmoothness => &[Feature::PathSmoothness],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage that could not run, and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageDiagnostic {
    pub stage: Stage,
    #[serde(serialize_with = "serialize_display")]
    pub error: StageError,
}

impl fmt::Display for StageDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.error)
    }
}

fn serialize_display<S: serde::Serializer>(error: &StageError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Features of one lap plus a record of every stage that failed
#[derive(Debug, Clone, Serialize)]
pub struct FeatureReport {
    pub driver_id: String,
    pub features: FeatureVector,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<StageDiagnostic>,
}

impl FeatureReport {
    /// Whether every stage ran
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostic for a stage, if it failed
    pub fn diagnostic(&self, stage: Stage) -> Option<&StageDiagnostic> {
        self.diagnostics.iter().find(|d| d.stage == stage)
    }
}

/// Feature extractor for single-lap telemetry traces.
///
/// Holds only configuration, so one extractor can be shared across threads
/// and laps. The default brake window counts the onset sample, so brake
/// intensity can reach 1.2; use [`ExtractorConfig::bounded_brake_window`]
/// to keep it within [0, 1].
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: ExtractorConfig,
}

impl FeatureExtractor {
    /// Create an extractor, rejecting unusable configuration
    pub fn new(config: ExtractorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract all features from one lap.
    ///
    /// Never fails: stage failures leave their features missing and are
    /// listed in the report's diagnostics. `driver_id` is only used to
    /// label diagnostics.
    pub fn extract(&self, driver_id: &str, trace: &LapTrace) -> FeatureReport {
        debug!(
            "Extracting features for {}: {} samples, channels {:?}",
            driver_id,
            trace.len(),
            trace.channels()
        );

        let mut report = FeatureReport {
            driver_id: driver_id.to_string(),
            features: FeatureVector::new(),
            diagnostics: Vec::new(),
        };
        let config = &self.config;

        let outcome = braking::analyze(trace, config)
            .map(|s| vec![(Feature::AvgBrakeIntensity, s.avg_intensity)]);
        self.record(&mut report, Stage::Braking, outcome);

        let outcome = throttle::analyze(trace, config)
            .map(|s| vec![(Feature::AvgThrottleIntensity, s.avg_intensity)]);
        self.record(&mut report, Stage::Throttle, outcome);

        let outcome = speed::analyze(trace).map(|s| vec![(Feature::SpeedVariability, s.variability)]);
        self.record(&mut report, Stage::SpeedVariability, outcome);

        let outcome = gears::analyze(trace, config).map(|s| {
            vec![
                (Feature::GearChanges, s.changes_normalized),
                (Feature::ShortShiftRatio, s.short_shift_ratio),
            ]
        });
        self.record(&mut report, Stage::Gears, outcome);

        let outcome = corners::analyze(trace, config).map(|s| {
            vec![
                (Feature::EntryExitBias, s.entry_exit_bias),
                (Feature::AvgCornerSpeedReduction, s.avg_speed_reduction),
            ]
        });
        self.record(&mut report, Stage::Corners, outcome);

        // No position data means the feature is left out, not missing
        let outcome = path::analyze(trace, config).map(|s| {
            s.map(|s| vec![(Feature::PathSmoothness, s.smoothness)])
                .unwrap_or_default()
        });
        self.record(&mut report, Stage::PathSmoothness, outcome);

        report
    }

    fn record(
        &self,
        report: &mut FeatureReport,
        stage: Stage,
        outcome: Result<Vec<(Feature, f64)>, StageError>,
    ) {
        match outcome {
            Ok(values) => {
                for (feature, value) in values {
                    report.features.insert(feature, value);
                }
            }
            Err(error) => {
                warn!(
                    "Feature stage {} failed for driver {}: {}",
                    stage, report.driver_id, error
                );
                for &feature in stage.features() {
                    report.features.insert_missing(feature);
                }
                report.diagnostics.push(StageDiagnostic { stage, error });
            }
        }
    }
}

/// Extract the feature vector of one lap with the default configuration.
///
/// See [`FeatureExtractor`] for the brake window this implies.
pub fn extract_features(driver_id: &str, trace: &LapTrace) -> FeatureVector {
    FeatureExtractor::default().extract(driver_id, trace).features
}
