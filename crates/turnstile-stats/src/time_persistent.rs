//! Time-weighted statistics over piecewise-constant signals.

use crate::summary::TimePersistentSummary;

/// Time-weighted average of a signal like queue length or WIP.
///
/// Every `update(t, v)` first credits the previous value for the elapsed
/// interval, then switches to the new value. The time-average is
/// `∫v dt / total elapsed`.
///
/// # Examples
///
/// ```
/// # use turnstile_stats::TimePersistent;
/// let mut queue = TimePersistent::new();
/// queue.update(0.0, 0.0);
/// queue.update(10.0, 2.0); // zero for the first 10 minutes
/// queue.update(20.0, 0.0); // two for the next 10
/// assert_eq!(queue.time_average(), 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimePersistent {
    last_value: f64,
    last_time: f64,
    time_sum: f64,
    total_time: f64,
    min: f64,
    max: f64,
    started: bool,
    series: Vec<(f64, f64)>,
}

impl TimePersistent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the signal changed to `v` at time `t`.
    ///
    /// Out-of-order times are clamped: an update earlier than the last
    /// one contributes zero elapsed weight.
    pub fn update(&mut self, t: f64, v: f64) {
        if self.started {
            let elapsed = (t - self.last_time).max(0.0);
            self.time_sum += self.last_value * elapsed;
            self.total_time += elapsed;
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        } else {
            self.started = true;
            self.min = v;
            self.max = v;
        }
        self.last_value = v;
        self.last_time = t;
        self.series.push((t, v));
    }

    /// Credits the current value up to `t` without changing it.
    ///
    /// Called once at end of run so the final segment is weighted.
    pub fn finalize_at(&mut self, t: f64) {
        if self.started {
            let elapsed = (t - self.last_time).max(0.0);
            self.time_sum += self.last_value * elapsed;
            self.total_time += elapsed;
            self.last_time = t;
        }
    }

    /// Restarts accumulation at `t`, keeping the current signal value.
    ///
    /// The kernel calls this when the clock crosses the warm-up boundary
    /// so time-averages cover only the measurement window.
    pub fn restart_at(&mut self, t: f64) {
        let value = self.last_value;
        let started = self.started;
        self.time_sum = 0.0;
        self.total_time = 0.0;
        self.series.clear();
        self.last_time = t;
        self.last_value = value;
        if started {
            self.min = value;
            self.max = value;
            self.series.push((t, value));
        }
    }

    /// Time-weighted average; 0 before any elapsed time.
    pub fn time_average(&self) -> f64 {
        if self.total_time > 0.0 {
            self.time_sum / self.total_time
        } else {
            0.0
        }
    }

    pub fn current_value(&self) -> f64 {
        self.last_value
    }

    pub fn min(&self) -> f64 {
        if self.started { self.min } else { 0.0 }
    }

    pub fn max(&self) -> f64 {
        if self.started { self.max } else { 0.0 }
    }

    /// The retained `{t, v}` observation series.
    pub fn series(&self) -> &[(f64, f64)] {
        &self.series
    }

    pub fn observation_count(&self) -> u64 {
        self.series.len() as u64
    }

    pub fn summary(&self) -> TimePersistentSummary {
        TimePersistentSummary {
            time_average: self.time_average(),
            current_value: self.current_value(),
            min: self.min(),
            max: self.max(),
            observation_count: self.observation_count(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_signal_time_average() {
        let mut stat = TimePersistent::new();
        stat.update(0.0, 1.0);
        stat.update(5.0, 3.0);
        stat.update(10.0, 0.0);
        // 1.0 for 5 min, 3.0 for 5 min.
        assert_eq!(stat.time_average(), 2.0);
        assert_eq!(stat.min(), 0.0);
        assert_eq!(stat.max(), 3.0);
        assert_eq!(stat.current_value(), 0.0);
        assert_eq!(stat.observation_count(), 3);
    }

    #[test]
    fn finalize_weights_the_open_segment() {
        let mut stat = TimePersistent::new();
        stat.update(0.0, 4.0);
        stat.finalize_at(10.0);
        assert_eq!(stat.time_average(), 4.0);

        // Finalizing again at the same instant adds nothing.
        stat.finalize_at(10.0);
        assert_eq!(stat.time_average(), 4.0);
    }

    #[test]
    fn empty_stat_reports_zeros() {
        let stat = TimePersistent::new();
        assert_eq!(stat.time_average(), 0.0);
        assert_eq!(stat.min(), 0.0);
        assert_eq!(stat.max(), 0.0);
        assert_eq!(stat.summary(), TimePersistentSummary::default());
    }

    #[test]
    fn restart_discards_history_but_keeps_value() {
        let mut stat = TimePersistent::new();
        stat.update(0.0, 10.0);
        stat.update(50.0, 2.0);

        stat.restart_at(50.0);
        stat.update(60.0, 2.0);
        stat.finalize_at(70.0);
        // Only the 2.0 segment after the restart counts.
        assert_eq!(stat.time_average(), 2.0);
        assert_eq!(stat.max(), 2.0);
    }

    #[test]
    fn out_of_order_update_contributes_no_weight() {
        let mut stat = TimePersistent::new();
        stat.update(10.0, 5.0);
        stat.update(5.0, 1.0);
        stat.finalize_at(15.0);
        // 1.0 held for the final 10 minutes, 5.0 never accrued.
        assert_eq!(stat.time_average(), 1.0);
    }
}
