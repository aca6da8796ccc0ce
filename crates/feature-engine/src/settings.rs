//! Extractor settings

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "DRIVER_DNA";

/// Window sizes and thresholds used by the analysis stages.
///
/// Windows are counted in samples, not seconds. Traces recorded at a different
/// sampling rate than the one the defaults were tuned on will bias the
/// onset intensities and corner search; scale the sample windows to compensate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Samples after a brake or throttle onset used to score it
    pub onset_window_samples: usize,

    /// Count the onset sample itself in the brake window
    pub brake_window_includes_onset: bool,

    /// Throttle level (%) that must be crossed to register an onset
    pub throttle_onset_threshold_pct: f64,

    /// Upshifts below this fraction of lap peak RPM count as short shifts
    pub short_shift_rpm_fraction: f64,

    /// Gear change divisor when the trace has no distance channel (placeholder unit)
    pub gear_change_fallback_divisor: f64,

    /// Apex speed must be under this fraction of lap peak speed
    pub apex_peak_fraction: f64,

    /// Samples searched either side of an apex for entry and exit
    pub corner_search_radius_samples: usize,

    /// Samples at either end of the lap never considered as apexes
    pub corner_edge_margin: usize,

    /// Entry or exit speed must exceed apex speed by this factor
    pub corner_significance_ratio: f64,

    /// Path smoothness needs more position steps than this
    pub min_path_steps: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            onset_window_samples: 5,
            brake_window_includes_onset: true,
            throttle_onset_threshold_pct: 20.0,
            short_shift_rpm_fraction: 0.95,
            gear_change_fallback_divisor: 5.0,
            apex_peak_fraction: 0.7,
            corner_search_radius_samples: 20,
            corner_edge_margin: 2,
            corner_significance_ratio: 1.2,
            min_path_steps: 5,
        }
    }
}

impl ExtractorConfig {
    /// Brake window starting after the onset sample, keeping brake intensity in [0, 1]
    pub fn bounded_brake_window() -> Self {
        Self {
            brake_window_includes_onset: false,
            ..Default::default()
        }
    }

    /// Load configuration: defaults, then an optional file, then `DRIVER_DNA_*` env vars
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("Loading extractor config from {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make a stage meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.onset_window_samples == 0 {
            return Err(invalid("onset_window_samples", "must be at least 1"));
        }
        if self.corner_search_radius_samples == 0 {
            return Err(invalid("corner_search_radius_samples", "must be at least 1"));
        }
        if self.corner_edge_margin == 0 {
            return Err(invalid("corner_edge_margin", "must be at least 1"));
        }
        for (field, value) in [
            ("short_shift_rpm_fraction", self.short_shift_rpm_fraction),
            ("apex_peak_fraction", self.apex_peak_fraction),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(invalid(field, format!("{} is outside (0, 1]", value)));
            }
        }
        if !(self.corner_significance_ratio >= 1.0) {
            return Err(invalid(
                "corner_significance_ratio",
                format!("{} is below 1.0", self.corner_significance_ratio),
            ));
        }
        if !(self.gear_change_fallback_divisor > 0.0) {
            return Err(invalid("gear_change_fallback_divisor", "must be positive"));
        }
        if !self.throttle_onset_threshold_pct.is_finite() {
            return Err(invalid("throttle_onset_threshold_pct", "must be finite"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.onset_window_samples, 5);
        assert_eq!(config.corner_search_radius_samples, 20);
    }

    #[test]
    fn test_bounded_brake_window_preset() {
        let config = ExtractorConfig::bounded_brake_window();
        assert!(config.validate().is_ok());
        assert!(!config.brake_window_includes_onset);
        assert_eq!(config.onset_window_samples, 5);
    }

    #[test]
    fn test_rejects_zero_window() {
        let config = ExtractorConfig {
            onset_window_samples: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "onset_window_samples", .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_fraction() {
        let config = ExtractorConfig {
            apex_peak_fraction: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ExtractorConfig {
            short_shift_rpm_fraction: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let path = std::env::temp_dir().join(format!(
            "driver-dna-config-{}.toml",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "onset_window_samples = 8").unwrap();
        writeln!(file, "corner_search_radius_samples = 40").unwrap();
        drop(file);

        let config = ExtractorConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.onset_window_samples, 8);
        assert_eq!(config.corner_search_radius_samples, 40);
        assert_eq!(config.apex_peak_fraction, 0.7);
    }

    #[test]
    fn test_env_overrides_file_and_defaults() {
        let path = std::env::temp_dir().join(format!(
            "driver-dna-config-env-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "min_path_steps = 9\nonset_window_samples = 7\n").unwrap();

        std::env::set_var("DRIVER_DNA_MIN_PATH_STEPS", "12");
        let from_file = ExtractorConfig::load(Some(&path));
        let without_file = ExtractorConfig::load(None);
        std::env::remove_var("DRIVER_DNA_MIN_PATH_STEPS");
        std::fs::remove_file(&path).ok();

        let from_file = from_file.unwrap();
        assert_eq!(from_file.min_path_steps, 12);
        assert_eq!(from_file.onset_window_samples, 7);
        assert_eq!(without_file.unwrap().min_path_steps, 12);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let path = std::env::temp_dir().join(format!(
            "driver-dna-config-invalid-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "corner_significance_ratio = 0.5\n").unwrap();

        let result = ExtractorConfig::load(Some(&path));
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
