//! Lap Telemetry Trace
//!
//! Column-oriented model of one lap's telemetry, with decoding from JSON and
//! structural validation of the channels it carries.

mod error;
mod serde_columns;
mod trace;

pub use error::TraceError;
pub use trace::{Channel, LapTrace};

use serde::{Deserialize, Serialize};

/// One telemetry sample along the lap (row form of a [`LapTrace`])
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Brake actuation, either a flag or a pedal magnitude
    #[serde(deserialize_with = "serde_columns::brake_flag")]
    pub brake: bool,
    /// Throttle position (%)
    pub throttle: f64,
    /// Vehicle speed
    pub speed: f64,
    /// Selected gear index
    pub gear: i32,
    /// Engine speed (RPM)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_speed: Option<f64>,
    /// Cumulative distance along the lap (m)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}
