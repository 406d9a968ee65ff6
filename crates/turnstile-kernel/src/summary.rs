//! The statistics summary record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use turnstile_stats::{TallySummary, TimePersistentSummary};

use crate::error::Diagnostic;

/// Kernel-level counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimulationSummary {
    /// Current clock, in minutes.
    pub current_time: f64,
    pub event_count: u64,
    pub entities_created: u64,
    pub entities_departed: u64,
    pub entities_in_system: u64,
}

/// Per-resource snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceSummary {
    pub name: String,
    pub capacity: u32,
    pub current_load: u32,
    pub queue_length: u64,
    pub utilization_percent: f64,
    pub total_busy_time: f64,
}

/// The full output of one simulation run.
///
/// Maps are keyed by statistic/resource name in sorted order, so two
/// deterministic runs serialize byte-for-byte identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StatisticsSummary {
    pub simulation: SimulationSummary,
    pub tally: BTreeMap<String, TallySummary>,
    pub time_persistent: BTreeMap<String, TimePersistentSummary>,
    pub resources: BTreeMap<String, ResourceSummary>,
    /// Recoverable conditions recorded during the run.
    pub diagnostics: Vec<Diagnostic>,
}
