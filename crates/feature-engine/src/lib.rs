//! Driving Style Feature Engine
//!
//! Turns one lap of racing telemetry into a fixed vocabulary of driving style
//! features covering braking, throttle, speed, gear shifts, cornering, and
//! racing line regularity.
//!
//! Each stage module exposes an `analyze` function with a typed summary;
//! [`FeatureExtractor`] runs them all and assembles a [`FeatureVector`].

pub mod braking;
pub mod corners;
mod error;
mod extractor;
mod features;
pub mod gears;
mod onset;
pub mod path;
pub mod settings;
pub mod speed;
pub mod statistics;
pub mod throttle;

pub use error::{ConfigError, StageError};
pub use extractor::{extract_features, FeatureExtractor, FeatureReport, Stage, StageDiagnostic};
pub use features::{Feature, FeatureVector, FEATURE_DIMENSION};
pub use settings::ExtractorConfig;
pub use lap_trace::{Channel, LapTrace, TelemetrySample, TraceError};
