//! Observation-indexed statistics via Welford's online algorithm.

use crate::critical::t_critical;
use crate::summary::{ConfidenceInterval, TallySummary};

/// Running mean/variance/extremes over recorded observations.
///
/// Welford's update keeps `m2` (the sum of squared deviations) stable
/// against catastrophic cancellation, so variance stays accurate even
/// after millions of near-equal observations. Observations are retained
/// for percentile recovery.
///
/// # Examples
///
/// ```
/// # use turnstile_stats::Tally;
/// let mut waits = Tally::new();
/// for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     waits.record(x);
/// }
/// assert!((waits.mean() - 5.0).abs() < 1e-12);
/// assert!((waits.variance() - 32.0 / 7.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Tally {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
    observations: Vec<f64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observation.
    pub fn record(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;

        if self.count == 1 {
            self.min = x;
            self.max = x;
        } else {
            self.min = self.min.min(x);
            self.max = self.max.max(x);
        }
        self.observations.push(x);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance (`n − 1` denominator); 0 below two observations.
    pub fn variance(&self) -> f64 {
        if self.count >= 2 {
            self.m2 / (self.count - 1) as f64
        } else {
            0.0
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn std_error(&self) -> f64 {
        if self.count > 0 {
            self.std_dev() / (self.count as f64).sqrt()
        } else {
            0.0
        }
    }

    pub fn min(&self) -> f64 {
        if self.count > 0 { self.min } else { 0.0 }
    }

    pub fn max(&self) -> f64 {
        if self.count > 0 { self.max } else { 0.0 }
    }

    /// The `p`-th percentile (`0 <= p <= 100`) by linear interpolation on
    /// the sorted observations. 0 when empty.
    pub fn percentile(&self, p: f64) -> f64 {
        if self.observations.is_empty() {
            return 0.0;
        }
        let mut sorted = self.observations.clone();
        sorted.sort_by(f64::total_cmp);

        let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
        let below = rank.floor() as usize;
        let above = rank.ceil() as usize;
        if below == above {
            return sorted[below];
        }
        let weight = rank - below as f64;
        sorted[below] * (1.0 - weight) + sorted[above] * weight
    }

    /// Two-sided confidence interval at level `1 − alpha`.
    ///
    /// Half-width is `t(alpha/2, n−1) · std_error`, with the exact
    /// t-table for `df <= 30` and the z approximation above.
    pub fn confidence_interval(&self, alpha: f64) -> ConfidenceInterval {
        if self.count < 2 {
            return ConfidenceInterval {
                lower: self.mean,
                upper: self.mean,
                half_width: 0.0,
            };
        }
        let half_width = t_critical(self.count - 1, alpha) * self.std_error();
        ConfidenceInterval {
            lower: self.mean - half_width,
            upper: self.mean + half_width,
            half_width,
        }
    }

    /// Full snapshot for the statistics summary.
    pub fn summary(&self) -> TallySummary {
        let ci = self.confidence_interval(0.05);
        TallySummary {
            count: self.count,
            mean: self.mean,
            std_dev: self.std_dev(),
            variance: self.variance(),
            std_error: self.std_error(),
            min: self.min(),
            max: self.max(),
            ci95_lower: ci.lower,
            ci95_upper: ci.upper,
            ci95_half_width: ci.half_width,
            p10: self.percentile(10.0),
            p25: self.percentile(25.0),
            p50: self.percentile(50.0),
            p75: self.percentile(75.0),
            p90: self.percentile(90.0),
            p95: self.percentile(95.0),
            p99: self.percentile(99.0),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Tests
// ============================================================================
