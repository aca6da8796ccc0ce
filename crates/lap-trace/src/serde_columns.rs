//! Lenient decoding for telemetry columns
//!
//! Exported telemetry uses `null` for gaps and mixes boolean and numeric brake
//! channels, so columns are decoded through these helpers.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum BrakeValue {
    Flag(bool),
    Level(f64),
}

impl BrakeValue {
    fn is_active(&self) -> bool {
        match *self {
            BrakeValue::Flag(on) => on,
            BrakeValue::Level(level) => level > 0.0,
        }
    }
}

pub(crate) fn brake_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<BrakeValue> = Option::deserialize(deserializer)?;
    Ok(value.map_or(false, |v| v.is_active()))
}

pub(crate) fn brake_column<'de, D>(deserializer: D) -> Result<Option<Vec<bool>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<BrakeValue>>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|column| {
        column
            .iter()
            .map(|v| v.as_ref().map_or(false, BrakeValue::is_active))
            .collect()
    }))
}

pub(crate) fn float_column<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<f64>>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|column| {
        column
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect()
    }))
}
