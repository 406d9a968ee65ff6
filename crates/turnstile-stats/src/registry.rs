//! Named statistics owned by one kernel.

use std::collections::BTreeMap;

use crate::summary::{TallySummary, TimePersistentSummary};
use crate::tally::Tally;
use crate::time_persistent::TimePersistent;

/// The full set of named statistics for a simulation run.
///
/// Maps are `BTreeMap` so summary output iterates in a stable order;
/// bitwise-identical summaries are part of the determinism contract.
#[derive(Debug, Default)]
pub struct StatisticsRegistry {
    tallies: BTreeMap<String, Tally>,
    time_persistent: BTreeMap<String, TimePersistent>,
}

impl StatisticsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty tally under `name` (idempotent).
    pub fn register_tally(&mut self, name: &str) {
        self.tallies.entry(name.to_string()).or_default();
    }

    /// Registers an empty time-persistent statistic under `name`.
    pub fn register_time_persistent(&mut self, name: &str) {
        self.time_persistent.entry(name.to_string()).or_default();
    }

    /// Records an observation, creating the tally on first use.
    pub fn record(&mut self, name: &str, x: f64) {
        self.tallies.entry(name.to_string()).or_default().record(x);
    }

    /// Updates a time-persistent signal, creating it on first use.
    pub fn update(&mut self, name: &str, t: f64, v: f64) {
        self.time_persistent
            .entry(name.to_string())
            .or_default()
            .update(t, v);
    }

    pub fn tally(&self, name: &str) -> Option<&Tally> {
        self.tallies.get(name)
    }

    pub fn time_persistent(&self, name: &str) -> Option<&TimePersistent> {
        self.time_persistent.get(name)
    }

    /// Replaces `name` with a single-point series.
    ///
    /// Used for derived quantities published at finalization (per-resource
    /// utilization): repeated finalizations overwrite rather than mix.
    pub fn publish_time_persistent(&mut self, name: &str, t: f64, v: f64) {
        let stat = self.time_persistent.entry(name.to_string()).or_default();
        stat.clear();
        stat.update(t, v);
    }

    /// Restarts every time-persistent statistic at `t` (warm-up boundary).
    pub fn restart_time_persistent_at(&mut self, t: f64) {
        for stat in self.time_persistent.values_mut() {
            stat.restart_at(t);
        }
    }

    /// Closes the open segment of every time-persistent statistic at `t`.
    pub fn finalize_at(&mut self, t: f64) {
        for stat in self.time_persistent.values_mut() {
            stat.finalize_at(t);
        }
    }

    /// Tally summaries in name order.
    pub fn tally_summaries(&self) -> BTreeMap<String, TallySummary> {
        self.tallies
            .iter()
            .map(|(name, tally)| (name.clone(), tally.summary()))
            .collect()
    }

    /// Time-persistent summaries in name order.
    pub fn time_persistent_summaries(&self) -> BTreeMap<String, TimePersistentSummary> {
        self.time_persistent
            .iter()
            .map(|(name, stat)| (name.clone(), stat.summary()))
            .collect()
    }

    /// Drops all recorded data but keeps the registered names.
    pub fn clear(&mut self) {
        for tally in self.tallies.values_mut() {
            tally.clear();
        }
        for stat in self.time_persistent.values_mut() {
            stat.clear();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
