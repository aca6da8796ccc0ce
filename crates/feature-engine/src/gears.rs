//! Gear and shift behavior stage

use crate::error::StageError;
use crate::statistics::peak;
use crate::settings::ExtractorConfig;
use lap_trace::LapTrace;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gear usage over one lap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GearSummary {
    /// Raw number of gear index changes
    pub changes: usize,
    /// Changes to a higher gear
    pub upshifts: usize,
    /// Upshifts made below the short-shift RPM fraction
    pub short_shifts: usize,
    /// Lap length in km when the trace carries distance data
    pub lap_distance_km: Option<f64>,
    /// Changes per km, or per fallback divisor without distance data
    pub changes_normalized: f64,
    /// Short shifts over max(1, changes)
    pub short_shift_ratio: f64,
}

impl GearSummary {
    /// Whether `changes_normalized` uses the placeholder divisor instead of distance
    pub fn is_approximate(&self) -> bool {
        self.lap_distance_km.is_none()
    }
}

/// Count gear changes and classify upshifts made before peak engine speed.
///
/// Without an engine speed channel no upshift is classified as short.
pub fn analyze(trace: &LapTrace, config: &ExtractorConfig) -> Result<GearSummary, StageError> {
    let gear = trace.gear()?;
    let engine_speed = trace.engine_speed()?;
    let distance = trace.distance()?;

    let short_shift_limit = engine_speed
        .and_then(peak)
        .map(|max_rpm| config.short_shift_rpm_fraction * max_rpm);

    let mut changes = 0;
    let mut upshifts = 0;
    let mut short_shifts = 0;

    for i in 1..gear.len() {
        if gear[i] == gear[i - 1] {
            continue;
        }
        changes += 1;

        if gear[i] > gear[i - 1] {
            upshifts += 1;
            if let (Some(rpm), Some(limit)) = (engine_speed, short_shift_limit) {
                if rpm[i - 1] < limit {
                    short_shifts += 1;
                }
            }
        }
    }

    let lap_distance_km = distance
        .and_then(|d| d.last().copied())
        .filter(|&last| last > 0.0)
        .map(|last| last / 1000.0);

    let changes_normalized = match lap_distance_km {
        Some(km) => changes as f64 / km,
        None => changes as f64 / config.gear_change_fallback_divisor,
    };

    debug!(
        "Gears: {} changes, {} upshifts, {} short shifts",
        changes, upshifts, short_shifts
    );

    Ok(GearSummary {
        changes,
        upshifts,
        short_shifts,
        lap_distance_km,
        changes_normalized,
        short_shift_ratio: short_shifts as f64 / changes.max(1) as f64,
    })
}
