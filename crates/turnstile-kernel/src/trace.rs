//! In-memory event tracing.

use serde::{Deserialize, Serialize};
use turnstile_types::SimTime;

/// One schedule or dispatch record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub time: SimTime,
    pub kind: String,
    pub details: String,
}

/// Append-only trace of kernel activity, off by default.
#[derive(Debug, Default)]
pub struct TraceLog {
    enabled: bool,
    entries: Vec<TraceEntry>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, time: SimTime, kind: impl Into<String>, details: impl Into<String>) {
        if self.enabled {
            self.entries.push(TraceEntry {
                time,
                kind: kind.into(),
                details: details.into(),
            });
        }
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_log_records_nothing() {
        let mut log = TraceLog::new();
        log.record(SimTime::ZERO, "dispatch", "arrival");
        assert!(log.entries().is_empty());
    }

    #[test]
    fn enabled_log_appends_in_order() {
        let mut log = TraceLog::new();
        log.set_enabled(true);
        log.record(SimTime::from_minutes(1.0), "schedule", "arrival #0");
        log.record(SimTime::from_minutes(2.0), "dispatch", "arrival #0");
        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.entries()[0].kind, "schedule");
        log.clear();
        assert!(log.entries().is_empty());
    }
}
