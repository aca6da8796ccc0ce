//! Feature Vector Assembly

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Number of features in the vocabulary
pub const FEATURE_DIMENSION: usize = 8;

/// Named driving style features, in vocabulary order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    AvgBrakeIntensity,
    AvgThrottleIntensity,
    SpeedVariability,
    GearChanges,
    ShortShiftRatio,
    EntryExitBias,
    AvgCornerSpeedReduction,
    PathSmoothness,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_DIMENSION] = [
        Feature::AvgBrakeIntensity,
        Feature::AvgThrottleIntensity,
        Feature::SpeedVariability,
        Feature::GearChanges,
        Feature::ShortShiftRatio,
        Feature::EntryExitBias,
        Feature::AvgCornerSpeedReduction,
        Feature::PathSmoothness,
    ];

    /// Snake-case key used in serialized vectors
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::AvgBrakeIntensity => "avg_brake_intensity",
            Feature::AvgThrottleIntensity => "avg_throttle_intensity",
            Feature::SpeedVariability => "speed_variability",
            Feature::GearChanges => "gear_changes",
            Feature::ShortShiftRatio => "short_shift_ratio",
            Feature::EntryExitBias => "entry_exit_bias",
            Feature::AvgCornerSpeedReduction => "avg_corner_speed_reduction",
            Feature::PathSmoothness => "path_smoothness",
        }
    }

    /// Human-readable title for display
    pub fn label(&self) -> &'static str {
        match self {
            Feature::AvgBrakeIntensity => "Avg Brake Intensity",
            Feature::AvgThrottleIntensity => "Avg Throttle Intensity",
            Feature::SpeedVariability => "Speed Variability",
            Feature::GearChanges => "Gear Changes",
            Feature::ShortShiftRatio => "Short Shift Ratio",
            Feature::EntryExitBias => "Entry Exit Bias",
            Feature::AvgCornerSpeedReduction => "Avg Corner Speed Reduction",
            Feature::PathSmoothness => "Path Smoothness",
        }
    }

    /// One-line meaning of the feature
    pub fn description(&self) -> &'static str {
        match self {
            Feature::AvgBrakeIntensity => "share of braking samples right after each brake onset",
            Feature::AvgThrottleIntensity => "throttle gain per sample after each throttle pick-up",
            Feature::SpeedVariability => "coefficient of variation of speed over the lap",
            Feature::GearChanges => "gear changes per km (approximate without distance data)",
            Feature::ShortShiftRatio => "upshifts made below peak RPM, relative to all gear changes",
            Feature::EntryExitBias => "corner entry speed over exit speed; above 1 is entry-biased",
            Feature::AvgCornerSpeedReduction => "apex speed over the faster of entry and exit",
            Feature::PathSmoothness => "coefficient of variation of position step length",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Features extracted from one lap.
///
/// A feature can be absent (never computed, e.g. path smoothness without
/// position data) or missing (computed but undefined, stored as NaN).
/// Serialized form maps missing values to `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Feature, Option<f64>>",
    into = "BTreeMap<Feature, Option<f64>>"
)]
pub struct FeatureVector {
    values: BTreeMap<Feature, f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a feature; NaN marks it missing
    pub fn insert(&mut self, feature: Feature, value: f64) {
        self.values.insert(feature, value);
    }

    /// Record a feature as missing
    pub fn insert_missing(&mut self, feature: Feature) {
        self.values.insert(feature, f64::NAN);
    }

    /// Value of a feature, `None` when absent or missing
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values.get(&feature).copied().filter(|v| !v.is_nan())
    }

    /// Raw stored value, NaN when missing
    pub fn raw(&self, feature: Feature) -> Option<f64> {
        self.values.get(&feature).copied()
    }

    /// Whether the feature key is present, even if missing-valued
    pub fn contains(&self, feature: Feature) -> bool {
        self.values.contains_key(&feature)
    }

    /// Whether the feature key is present with a missing value
    pub fn is_missing(&self, feature: Feature) -> bool {
        self.values.get(&feature).map_or(false, |v| v.is_nan())
    }

    /// Present features in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.values.iter().map(|(&f, &v)| (f, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values laid out in vocabulary order, NaN for absent or missing features
    pub fn to_dense(&self) -> [f64; FEATURE_DIMENSION] {
        Feature::ALL.map(|f| self.raw(f).unwrap_or(f64::NAN))
    }
}

impl From<BTreeMap<Feature, Option<f64>>> for FeatureVector {
    fn from(map: BTreeMap<Feature, Option<f64>>) -> Self {
        Self {
            values: map
                .into_iter()
                .map(|(f, v)| (f, v.unwrap_or(f64::NAN)))
                .collect(),
        }
    }
}

impl From<FeatureVector> for BTreeMap<Feature, Option<f64>> {
    fn from(vector: FeatureVector) -> Self {
        vector
            .values
            .into_iter()
            .map(|(f, v)| (f, Some(v).filter(|v| !v.is_nan())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_versus_missing() {
        let mut vector = FeatureVector::new();
        vector.insert(Feature::GearChanges, 12.0);
        vector.insert_missing(Feature::EntryExitBias);

        assert_eq!(vector.get(Feature::GearChanges), Some(12.0));
        assert!(vector.contains(Feature::EntryExitBias));
        assert!(vector.is_missing(Feature::EntryExitBias));
        assert_eq!(vector.get(Feature::EntryExitBias), None);

        assert!(!vector.contains(Feature::PathSmoothness));
        assert!(!vector.is_missing(Feature::PathSmoothness));
    }

    #[test]
    fn test_iter_in_vocabulary_order() {
        let mut vector = FeatureVector::new();
        vector.insert(Feature::PathSmoothness, 0.1);
        vector.insert(Feature::AvgBrakeIntensity, 0.8);
        vector.insert(Feature::GearChanges, 3.0);

        let order: Vec<Feature> = vector.iter().map(|(f, _)| f).collect();
        assert_eq!(
            order,
            vec![Feature::AvgBrakeIntensity, Feature::GearChanges, Feature::PathSmoothness]
        );
    }

    #[test]
    fn test_serializes_missing_as_null() {
        let mut vector = FeatureVector::new();
        vector.insert(Feature::SpeedVariability, 0.25);
        vector.insert_missing(Feature::AvgThrottleIntensity);

        let json = serde_json::to_string(&vector).unwrap();
        assert_eq!(
            json,
            r#"{"avg_throttle_intensity":null,"speed_variability":0.25}"#
        );

        let decoded: FeatureVector = serde_json::from_str(&json).unwrap();
        assert!(decoded.is_missing(Feature::AvgThrottleIntensity));
        assert_eq!(decoded.get(Feature::SpeedVariability), Some(0.25));
    }

    #[test]
    fn test_dense_layout() {
        let mut vector = FeatureVector::new();
        vector.insert(Feature::ShortShiftRatio, 0.5);
        let dense = vector.to_dense();

        assert_eq!(dense.len(), FEATURE_DIMENSION);
        assert_eq!(dense[4], 0.5);
        assert!(dense[0].is_nan());
    }

    #[test]
    fn test_labels_and_keys() {
        for feature in Feature::ALL {
            let key = serde_json::to_string(&feature).unwrap();
            assert_eq!(key.trim_matches('"'), feature.as_str());
            assert!(!feature.label().is_empty());
        }
        assert_eq!(Feature::AvgCornerSpeedReduction.label(), "Avg Corner Speed Reduction");
    }
}
