//! Batch means for autocorrelated output series.

use crate::critical::t_critical;
use crate::summary::ConfidenceInterval;

/// Groups a correlated observation stream into fixed-size batches.
///
/// Consecutive observations from one simulation run are correlated, which
/// makes the plain standard error of the mean optimistic. Averaging each
/// batch of `k` observations yields approximately independent batch means
/// the usual t-interval applies to.
#[derive(Debug, Clone)]
pub struct BatchMeans {
    batch_size: u64,
    in_progress_sum: f64,
    in_progress_count: u64,
    batches: Vec<f64>,
}

impl BatchMeans {
    /// Creates a collector with the given batch size (minimum 1).
    pub fn new(batch_size: u64) -> Self {
        Self {
            batch_size: batch_size.max(1),
            in_progress_sum: 0.0,
            in_progress_count: 0,
            batches: Vec::new(),
        }
    }

    /// Records one observation, flushing a batch mean when full.
    pub fn record(&mut self, x: f64) {
        self.in_progress_sum += x;
        self.in_progress_count += 1;
        if self.in_progress_count == self.batch_size {
            self.batches.push(self.in_progress_sum / self.batch_size as f64);
            self.in_progress_sum = 0.0;
            self.in_progress_count = 0;
        }
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Completed batch means; a partial batch in progress is excluded.
    pub fn batch_means(&self) -> &[f64] {
        &self.batches
    }

    pub fn batch_count(&self) -> u64 {
        self.batches.len() as u64
    }

    /// Mean over the completed batches; 0 when none have completed.
    pub fn grand_mean(&self) -> f64 {
        if self.batches.is_empty() {
            return 0.0;
        }
        self.batches.iter().sum::<f64>() / self.batches.len() as f64
    }

    /// Confidence interval over the batch means at level `1 − alpha`.
    pub fn confidence_interval(&self, alpha: f64) -> ConfidenceInterval {
        let n = self.batches.len() as u64;
        let mean = self.grand_mean();
        if n < 2 {
            return ConfidenceInterval {
                lower: mean,
                upper: mean,
                half_width: 0.0,
            };
        }
        let variance = self
            .batches
            .iter()
            .map(|b| (b - mean) * (b - mean))
            .sum::<f64>()
            / (n - 1) as f64;
        let std_error = (variance / n as f64).sqrt();
        let half_width = t_critical(n - 1, alpha) * std_error;
        ConfidenceInterval {
            lower: mean - half_width,
            upper: mean + half_width,
            half_width,
        }
    }

    pub fn clear(&mut self) {
        self.in_progress_sum = 0.0;
        self.in_progress_count = 0;
        self.batches.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================
