//! Serializable summary records.
//!
//! These are the wire shapes hosts (CLI, UIs, the analytical validator)
//! consume. An empty statistic summarizes as zeros rather than an error.

use serde::{Deserialize, Serialize};

/// A two-sided confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub half_width: f64,
}

/// Snapshot of a tally statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TallySummary {
    pub count: u64,
    pub mean: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub std_error: f64,
    pub min: f64,
    pub max: f64,
    pub ci95_lower: f64,
    pub ci95_upper: f64,
    pub ci95_half_width: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Snapshot of a time-persistent statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TimePersistentSummary {
    pub time_average: f64,
    pub current_value: f64,
    pub min: f64,
    pub max: f64,
    pub observation_count: u64,
}
