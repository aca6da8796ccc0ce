//! Column-Oriented Lap Trace

use crate::error::TraceError;
use crate::serde_columns;
use crate::TelemetrySample;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Telemetry channels a lap trace can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Brake,
    Throttle,
    Speed,
    Gear,
    EngineSpeed,
    Distance,
    X,
    Y,
}

impl Channel {
    /// All channels, required ones first
    pub const ALL: [Channel; 8] = [
        Channel::Brake,
        Channel::Throttle,
        Channel::Speed,
        Channel::Gear,
        Channel::EngineSpeed,
        Channel::Distance,
        Channel::X,
        Channel::Y,
    ];

    /// Column name used in decoded traces
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Brake => "brake",
            Channel::Throttle => "throttle",
            Channel::Speed => "speed",
            Channel::Gear => "gear",
            Channel::EngineSpeed => "engine_speed",
            Channel::Distance => "distance",
            Channel::X => "x",
            Channel::Y => "y",
        }
    }

    /// Whether every well-formed trace must carry this channel
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Channel::Brake | Channel::Throttle | Channel::Speed | Channel::Gear
        )
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Telemetry of a single lap, one column per channel.
///
/// Columns are read-only once built. Required channels (brake, throttle, speed,
/// gear) may still be absent in malformed input; accessors report that as a
/// [`TraceError`] instead of panicking, so each consumer can degrade on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LapTrace {
    #[serde(
        default,
        alias = "Brake",
        deserialize_with = "serde_columns::brake_column",
        skip_serializing_if = "Option::is_none"
    )]
    brake: Option<Vec<bool>>,
    #[serde(
        default,
        alias = "Throttle",
        deserialize_with = "serde_columns::float_column",
        skip_serializing_if = "Option::is_none"
    )]
    throttle: Option<Vec<f64>>,
    #[serde(
        default,
        alias = "Speed",
        deserialize_with = "serde_columns::float_column",
        skip_serializing_if = "Option::is_none"
    )]
    speed: Option<Vec<f64>>,
    #[serde(default, alias = "nGear", skip_serializing_if = "Option::is_none")]
    gear: Option<Vec<i32>>,
    #[serde(
        default,
        alias = "RPM",
        deserialize_with = "serde_columns::float_column",
        skip_serializing_if = "Option::is_none"
    )]
    engine_speed: Option<Vec<f64>>,
    #[serde(
        default,
        alias = "Distance",
        deserialize_with = "serde_columns::float_column",
        skip_serializing_if = "Option::is_none"
    )]
    distance: Option<Vec<f64>>,
    #[serde(
        default,
        alias = "X",
        deserialize_with = "serde_columns::float_column",
        skip_serializing_if = "Option::is_none"
    )]
    x: Option<Vec<f64>>,
    #[serde(
        default,
        alias = "Y",
        deserialize_with = "serde_columns::float_column",
        skip_serializing_if = "Option::is_none"
    )]
    y: Option<Vec<f64>>,
}

impl LapTrace {
    /// Create a trace from the four required channels
    pub fn new(brake: Vec<bool>, throttle: Vec<f64>, speed: Vec<f64>, gear: Vec<i32>) -> Self {
        Self {
            brake: Some(brake),
            throttle: Some(throttle),
            speed: Some(speed),
            gear: Some(gear),
            ..Default::default()
        }
    }

    pub fn with_brake(mut self, brake: Vec<bool>) -> Self {
        self.brake = Some(brake);
        self
    }

    pub fn with_throttle(mut self, throttle: Vec<f64>) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn with_speed(mut self, speed: Vec<f64>) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_gear(mut self, gear: Vec<i32>) -> Self {
        self.gear = Some(gear);
        self
    }

    /// Attach an engine speed (RPM) channel
    pub fn with_engine_speed(mut self, engine_speed: Vec<f64>) -> Self {
        self.engine_speed = Some(engine_speed);
        self
    }

    /// Attach a cumulative lap distance channel (metres)
    pub fn with_distance(mut self, distance: Vec<f64>) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Attach planar position channels
    pub fn with_position(mut self, x: Vec<f64>, y: Vec<f64>) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Build a trace from row samples.
    ///
    /// An optional channel is kept only when every sample carries it.
    pub fn from_samples(samples: &[TelemetrySample]) -> Self {
        let optional = |channel: Channel, pick: fn(&TelemetrySample) -> Option<f64>| {
            let column: Option<Vec<f64>> = samples.iter().map(pick).collect();
            if column.is_none() && samples.iter().any(|s| pick(s).is_some()) {
                warn!(
                    "Dropping {} channel: only present on some of {} samples",
                    channel,
                    samples.len()
                );
            }
            column.filter(|_| !samples.is_empty())
        };

        Self {
            brake: Some(samples.iter().map(|s| s.brake).collect()),
            throttle: Some(samples.iter().map(|s| s.throttle).collect()),
            speed: Some(samples.iter().map(|s| s.speed).collect()),
            gear: Some(samples.iter().map(|s| s.gear).collect()),
            engine_speed: optional(Channel::EngineSpeed, |s| s.engine_speed),
            distance: optional(Channel::Distance, |s| s.distance),
            x: optional(Channel::X, |s| s.x),
            y: optional(Channel::Y, |s| s.y),
        }
    }

    /// Decode a trace from JSON: either an object of columns or an array of samples
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.is_array() {
            let samples: Vec<TelemetrySample> = serde_json::from_value(value)?;
            debug!("Decoded {} row samples", samples.len());
            Ok(Self::from_samples(&samples))
        } else {
            serde_json::from_value(value)
        }
    }

    /// Number of samples in the lap.
    ///
    /// Speed defines the length; otherwise the first channel present does.
    pub fn len(&self) -> usize {
        self.channel_len(Channel::Speed)
            .or_else(|| Channel::ALL.iter().find_map(|&c| self.channel_len(c)))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the channel is present
    pub fn has(&self, channel: Channel) -> bool {
        self.channel_len(channel).is_some()
    }

    /// Channels present in this trace
    pub fn channels(&self) -> Vec<Channel> {
        Channel::ALL.into_iter().filter(|&c| self.has(c)).collect()
    }

    /// Brake activity per sample
    pub fn brake(&self) -> Result<&[bool], TraceError> {
        self.required(Channel::Brake, self.brake.as_deref())
    }

    /// Throttle position per sample (%)
    pub fn throttle(&self) -> Result<&[f64], TraceError> {
        self.required(Channel::Throttle, self.throttle.as_deref())
    }

    /// Speed per sample
    pub fn speed(&self) -> Result<&[f64], TraceError> {
        self.required(Channel::Speed, self.speed.as_deref())
    }

    /// Gear index per sample
    pub fn gear(&self) -> Result<&[i32], TraceError> {
        self.required(Channel::Gear, self.gear.as_deref())
    }

    /// Engine speed per sample, `None` when not recorded
    pub fn engine_speed(&self) -> Result<Option<&[f64]>, TraceError> {
        self.optional(Channel::EngineSpeed, self.engine_speed.as_deref())
    }

    /// Cumulative distance per sample, `None` when not recorded
    pub fn distance(&self) -> Result<Option<&[f64]>, TraceError> {
        self.optional(Channel::Distance, self.distance.as_deref())
    }

    /// Planar position, `None` unless both coordinates are recorded
    pub fn position(&self) -> Result<Option<(&[f64], &[f64])>, TraceError> {
        let x = self.optional(Channel::X, self.x.as_deref())?;
        let y = self.optional(Channel::Y, self.y.as_deref())?;
        Ok(x.zip(y))
    }

    /// Collect every structural problem in the trace.
    ///
    /// Advisory only: extraction copes with malformed traces on its own.
    pub fn validate(&self) -> Vec<TraceError> {
        let mut errors = Vec::new();
        let expected = self.len();

        if expected == 0 {
            errors.push(TraceError::Empty);
        }

        for channel in Channel::ALL {
            match self.channel_len(channel) {
                None if channel.is_required() => errors.push(TraceError::MissingChannel(channel)),
                None => {}
                Some(actual) if actual != expected => errors.push(TraceError::LengthMismatch {
                    channel,
                    expected,
                    actual,
                }),
                Some(_) => {
                    if let Some(index) = self.first_non_finite(channel) {
                        errors.push(TraceError::NonFinite { channel, index });
                    }
                }
            }
        }

        errors
    }

    fn float_column(&self, channel: Channel) -> Option<&[f64]> {
        match channel {
            Channel::Throttle => self.throttle.as_deref(),
            Channel::Speed => self.speed.as_deref(),
            Channel::EngineSpeed => self.engine_speed.as_deref(),
            Channel::Distance => self.distance.as_deref(),
            Channel::X => self.x.as_deref(),
            Channel::Y => self.y.as_deref(),
            Channel::Brake | Channel::Gear => None,
        }
    }

    fn first_non_finite(&self, channel: Channel) -> Option<usize> {
        self.float_column(channel)?
            .iter()
            .position(|v| !v.is_finite())
    }

    fn channel_len(&self, channel: Channel) -> Option<usize> {
        match channel {
            Channel::Brake => self.brake.as_ref().map(Vec::len),
            Channel::Gear => self.gear.as_ref().map(Vec::len),
            other => self.float_column(other).map(<[f64]>::len),
        }
    }

    fn required<'a, T>(&self, channel: Channel, column: Option<&'a [T]>) -> Result<&'a [T], TraceError> {
        self.optional(channel, column)?
            .ok_or(TraceError::MissingChannel(channel))
    }

    fn optional<'a, T>(
        &self,
        channel: Channel,
        column: Option<&'a [T]>,
    ) -> Result<Option<&'a [T]>, TraceError> {
        match column {
            Some(values) if values.len() != self.len() => Err(TraceError::LengthMismatch {
                channel,
                expected: self.len(),
                actual: values.len(),
            }),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(speed: f64, gear: i32) -> TelemetrySample {
        TelemetrySample {
            brake: false,
            throttle: 80.0,
            speed,
            gear,
            ..Default::default()
        }
    }

    #[test]
    fn test_from_samples_required_channels() {
        let samples = vec![sample(100.0, 3), sample(110.0, 3), sample(120.0, 4)];
        let trace = LapTrace::from_samples(&samples);

        assert_eq!(trace.len(), 3);
        assert_eq!(trace.speed().unwrap(), &[100.0, 110.0, 120.0]);
        assert_eq!(trace.gear().unwrap(), &[3, 3, 4]);
        assert!(trace.engine_speed().unwrap().is_none());
        assert!(trace.position().unwrap().is_none());
    }

    #[test]
    fn test_from_samples_drops_partial_optional_channel() {
        let mut samples = vec![sample(100.0, 3), sample(110.0, 3)];
        samples[0].engine_speed = Some(9000.0);
        samples[0].distance = Some(0.0);
        samples[1].distance = Some(12.5);

        let trace = LapTrace::from_samples(&samples);
        assert!(!trace.has(Channel::EngineSpeed));
        assert_eq!(trace.distance().unwrap(), Some(&[0.0, 12.5][..]));
    }

    #[test]
    fn test_missing_required_channel() {
        let trace = LapTrace::default().with_speed(vec![100.0, 90.0]);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.brake(), Err(TraceError::MissingChannel(Channel::Brake)));
    }

    #[test]
    fn test_length_mismatch() {
        let trace = LapTrace::new(vec![false; 3], vec![0.0; 3], vec![0.0; 3], vec![1; 2]);
        assert_eq!(
            trace.gear(),
            Err(TraceError::LengthMismatch {
                channel: Channel::Gear,
                expected: 3,
                actual: 2,
            })
        );
        assert!(trace.speed().is_ok());
    }

    #[test]
    fn test_position_requires_both_axes() {
        let trace = LapTrace::new(vec![false; 2], vec![0.0; 2], vec![0.0; 2], vec![1; 2])
            .with_position(vec![0.0, 1.0], vec![0.0, 1.0]);
        assert!(trace.position().unwrap().is_some());

        let mut x_only = trace.clone();
        x_only.y = None;
        assert!(x_only.position().unwrap().is_none());
    }

    #[test]
    fn test_validate_reports_all_problems() {
        let trace = LapTrace::default()
            .with_speed(vec![100.0, f64::NAN, 80.0])
            .with_throttle(vec![0.0, 10.0]);
        let errors = trace.validate();

        assert!(errors.contains(&TraceError::MissingChannel(Channel::Brake)));
        assert!(errors.contains(&TraceError::MissingChannel(Channel::Gear)));
        assert!(errors.contains(&TraceError::LengthMismatch {
            channel: Channel::Throttle,
            expected: 3,
            actual: 2,
        }));
        assert!(errors.contains(&TraceError::NonFinite {
            channel: Channel::Speed,
            index: 1,
        }));
    }

    #[test]
    fn test_validate_clean_trace() {
        let trace = LapTrace::new(vec![true, false], vec![0.0, 50.0], vec![80.0, 90.0], vec![2, 3]);
        assert!(trace.validate().is_empty());
        assert_eq!(LapTrace::default().validate()[0], TraceError::Empty);
    }

    #[test]
    fn test_decode_columns_with_mixed_brake() {
        let json = r#"{
            "Brake": [true, false, 1.0, 0.0, null],
            "Throttle": [0, 10, 20, null, 100],
            "Speed": [100, 110, 120, 130, 140],
            "nGear": [3, 3, 4, 4, 5],
            "Time": [0, 1, 2, 3, 4]
        }"#;
        let trace = LapTrace::from_json_str(json).unwrap();

        assert_eq!(trace.brake().unwrap(), &[true, false, true, false, false]);
        assert!(trace.throttle().unwrap()[3].is_nan());
        assert_eq!(trace.gear().unwrap(), &[3, 3, 4, 4, 5]);
        assert!(!trace.has(Channel::EngineSpeed));
    }

    #[test]
    fn test_decode_sample_array() {
        let json = r#"[
            {"brake": false, "throttle": 100, "speed": 250, "gear": 7, "x": 0, "y": 0},
            {"brake": 0.6, "throttle": 0, "speed": 240, "gear": 7, "x": 3, "y": 4}
        ]"#;
        let trace = LapTrace::from_json_str(json).unwrap();

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.brake().unwrap(), &[false, true]);
        let (x, y) = trace.position().unwrap().unwrap();
        assert_eq!((x[1], y[1]), (3.0, 4.0));
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(LapTrace::from_json_str("{\"speed\": [1, \"fast\"]}").is_err());
        assert!(LapTrace::from_json_str("[{\"speed\": 1}]").is_err());
    }

    mod properties {
        use crate::{Channel, LapTrace, TelemetrySample};
        use proptest::prelude::*;

        fn arb_sample() -> impl Strategy<Value = TelemetrySample> {
            (any::<bool>(), 0.0..100.0f64, 0.0..350.0f64, 1..9i32, proptest::option::of(4000.0..13000.0f64))
                .prop_map(|(brake, throttle, speed, gear, engine_speed)| TelemetrySample {
                    brake,
                    throttle,
                    speed,
                    gear,
                    engine_speed,
                    ..Default::default()
                })
        }

        proptest! {
            /// Finite row samples always produce a structurally valid trace
            #[test]
            fn prop_finite_samples_validate(samples in proptest::collection::vec(arb_sample(), 1..200)) {
                let trace = LapTrace::from_samples(&samples);
                prop_assert_eq!(trace.len(), samples.len());
                prop_assert!(trace.validate().is_empty());

                let all_rpm = samples.iter().all(|s| s.engine_speed.is_some());
                prop_assert_eq!(trace.has(Channel::EngineSpeed), all_rpm);
            }
        }
    }
}
