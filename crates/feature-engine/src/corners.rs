//! Corner geometry stage
//!
//! Corners are found from the speed trace alone: an apex is a local speed
//! minimum well below the lap's peak, and the entry and exit are the speed
//! crests on either side of it within a bounded search radius.

use crate::error::StageError;
use crate::statistics::{mean_or_missing, peak};
use crate::settings::ExtractorConfig;
use lap_trace::LapTrace;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A corner accepted for the geometry features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    pub entry: usize,
    pub apex: usize,
    pub exit: usize,
    pub entry_speed: f64,
    pub apex_speed: f64,
    pub exit_speed: f64,
    /// Entry speed over exit speed; above 1 means entry-biased
    pub entry_exit_ratio: f64,
    /// Apex speed over the faster of entry and exit
    pub speed_reduction: f64,
}

/// Cornering behavior over one lap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CornerSummary {
    /// Apex candidates before the significance filter
    pub candidates: usize,
    pub corners: Vec<Corner>,
    /// Mean entry/exit ratio, NaN without corners
    pub entry_exit_bias: f64,
    /// Mean speed reduction, NaN without corners
    pub avg_speed_reduction: f64,
}

/// Detect corners and summarize entry/exit balance and speed shed.
pub fn analyze(trace: &LapTrace, config: &ExtractorConfig) -> Result<CornerSummary, StageError> {
    let speeds = trace.speed()?;
    let apexes = find_apexes(speeds, config);

    let corners: Vec<Corner> = apexes
        .iter()
        .filter_map(|&apex| measure_corner(speeds, apex, config))
        .collect();

    debug!(
        "Corners: {} accepted of {} apex candidates",
        corners.len(),
        apexes.len()
    );

    let ratios: Vec<f64> = corners.iter().map(|c| c.entry_exit_ratio).collect();
    let reductions: Vec<f64> = corners.iter().map(|c| c.speed_reduction).collect();

    Ok(CornerSummary {
        candidates: apexes.len(),
        entry_exit_bias: mean_or_missing(&ratios),
        avg_speed_reduction: mean_or_missing(&reductions),
        corners,
    })
}

/// Local speed minima below `apex_peak_fraction` of the lap's peak speed
pub fn find_apexes(speeds: &[f64], config: &ExtractorConfig) -> Vec<usize> {
    let margin = config.corner_edge_margin.max(1);
    let Some(peak_speed) = peak(speeds) else {
        return Vec::new();
    };
    let ceiling = config.apex_peak_fraction * peak_speed;

    (margin..speeds.len().saturating_sub(margin))
        .filter(|&i| {
            speeds[i] < speeds[i - 1] && speeds[i] < speeds[i + 1] && speeds[i] < ceiling
        })
        .collect()
}

/// Nearest crest before the apex: first index, walking back, whose speed
/// exceeds the sample before it.
fn find_entry(speeds: &[f64], apex: usize, radius: usize) -> usize {
    let floor = apex.saturating_sub(radius);
    (floor + 1..=apex)
        .rev()
        .find(|&j| speeds[j] > speeds[j - 1])
        .unwrap_or(apex)
}

/// Nearest crest after the apex: first index, walking forward, whose speed
/// exceeds the sample after it.
fn find_exit(speeds: &[f64], apex: usize, radius: usize) -> usize {
    let ceiling = (speeds.len() - 1).min(apex.saturating_add(radius));
    (apex..ceiling)
        .find(|&j| speeds[j] > speeds[j + 1])
        .unwrap_or(apex)
}

fn measure_corner(speeds: &[f64], apex: usize, config: &ExtractorConfig) -> Option<Corner> {
    let radius = config.corner_search_radius_samples;
    let entry = find_entry(speeds, apex, radius);
    let exit = find_exit(speeds, apex, radius);
    if entry >= exit {
        return None;
    }

    let entry_speed = speeds[entry];
    let apex_speed = speeds[apex];
    let exit_speed = speeds[exit];

    let significant = config.corner_significance_ratio * apex_speed;
    if !(entry_speed > significant || exit_speed > significant) {
        return None;
    }

    let entry_exit_ratio = if exit_speed > 0.0 {
        entry_speed / exit_speed
    } else {
        f64::NAN
    };
    let fastest = entry_speed.max(exit_speed);
    let speed_reduction = if fastest > 0.0 {
        apex_speed / fastest
    } else {
        f64::NAN
    };

    if entry_exit_ratio.is_nan() || speed_reduction.is_nan() {
        return None;
    }

    Some(Corner {
        entry,
        apex,
        exit,
        entry_speed,
        apex_speed,
        exit_speed,
        entry_exit_ratio,
        speed_reduction,
    })
}
