//! Service-time and inter-arrival distributions.
//!
//! A [`Distribution`] is the compiled, validated form of the distribution
//! records a model declares. Sampling consumes a caller-supplied
//! [`Mt19937`] stream so that every draw is attributable to a named stream
//! and reproducible from the base seed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Mt19937;

/// Tolerance for empirical probability sums.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-4;

/// Validation failures for distribution parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DistributionError {
    #[error("exponential mean must be positive, got {mean}")]
    NonPositiveMean { mean: f64 },

    #[error("uniform bounds must satisfy min < max, got [{min}, {max}]")]
    UniformBounds { min: f64, max: f64 },

    #[error("triangular parameters must satisfy min <= mode <= max, got min={min} mode={mode} max={max}")]
    TriangularOrder { min: f64, mode: f64, max: f64 },

    #[error("normal std_dev must be positive, got {std_dev}")]
    NonPositiveStdDev { std_dev: f64 },

    #[error("empirical values/probabilities length mismatch: {values} values, {probabilities} probabilities")]
    EmpiricalLengthMismatch { values: usize, probabilities: usize },

    #[error("empirical probabilities must sum to 1.0, got {sum}")]
    EmpiricalProbabilitySum { sum: f64 },

    #[error("empirical distribution must have at least one value")]
    EmpiricalEmpty,
}

// ============================================================================
// Distribution
// ============================================================================

/// A sampleable duration distribution (all values in minutes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Distribution {
    /// Always `value`.
    Constant { value: f64 },
    /// Exponential with the given mean (not rate).
    Exponential { mean: f64 },
    /// Uniform on `[min, max)`.
    Uniform { min: f64, max: f64 },
    /// Triangular on `[min, max]` with the given mode.
    Triangular { min: f64, mode: f64, max: f64 },
    /// Normal; samples may be negative, callers clamp where a duration
    /// is required.
    Normal { mean: f64, std_dev: f64 },
    /// Discrete empirical distribution: `values[i]` with
    /// `probabilities[i]`.
    Empirical {
        values: Vec<f64>,
        probabilities: Vec<f64>,
    },
}

impl Distribution {
    /// Checks the parameter constraints the model compiler enforces.
    pub fn validate(&self) -> Result<(), DistributionError> {
        match self {
            Distribution::Constant { .. } => Ok(()),
            Distribution::Exponential { mean } => {
                if *mean > 0.0 {
                    Ok(())
                } else {
                    Err(DistributionError::NonPositiveMean { mean: *mean })
                }
            }
            Distribution::Uniform { min, max } => {
                if min < max {
                    Ok(())
                } else {
                    Err(DistributionError::UniformBounds {
                        min: *min,
                        max: *max,
                    })
                }
            }
            Distribution::Triangular { min, mode, max } => {
                if min <= mode && mode <= max {
                    Ok(())
                } else {
                    Err(DistributionError::TriangularOrder {
                        min: *min,
                        mode: *mode,
                        max: *max,
                    })
                }
            }
            Distribution::Normal { std_dev, .. } => {
                if *std_dev > 0.0 {
                    Ok(())
                } else {
                    Err(DistributionError::NonPositiveStdDev { std_dev: *std_dev })
                }
            }
            Distribution::Empirical {
                values,
                probabilities,
            } => {
                if values.is_empty() {
                    return Err(DistributionError::EmpiricalEmpty);
                }
                if values.len() != probabilities.len() {
                    return Err(DistributionError::EmpiricalLengthMismatch {
                        values: values.len(),
                        probabilities: probabilities.len(),
                    });
                }
                let sum: f64 = probabilities.iter().sum();
                if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
                    return Err(DistributionError::EmpiricalProbabilitySum { sum });
                }
                Ok(())
            }
        }
    }

    /// Draws one sample from the supplied stream.
    ///
    /// Exponential and triangular use their inverse CDFs; normal uses
    /// Box-Muller (two uniforms per sample, cosine branch) so sampling
    /// carries no hidden state between calls.
    pub fn sample(&self, rng: &mut Mt19937) -> f64 {
        match self {
            Distribution::Constant { value } => *value,
            Distribution::Exponential { mean } => {
                let u = rng.next_f64();
                -(1.0 - u).ln() * mean
            }
            Distribution::Uniform { min, max } => {
                let u = rng.next_f64();
                min + u * (max - min)
            }
            Distribution::Triangular { min, mode, max } => {
                let u = rng.next_f64();
                let span = max - min;
                let cut = if span > 0.0 { (mode - min) / span } else { 0.0 };
                if u < cut {
                    min + (u * span * (mode - min)).sqrt()
                } else {
                    max - ((1.0 - u) * span * (max - mode)).sqrt()
                }
            }
            Distribution::Normal { mean, std_dev } => {
                let u1 = rng.next_f64_open();
                let u2 = rng.next_f64();
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
                mean + std_dev * z
            }
            Distribution::Empirical {
                values,
                probabilities,
            } => {
                let u = rng.next_f64();
                let mut cumulative = 0.0;
                for (value, p) in values.iter().zip(probabilities) {
                    cumulative += p;
                    if u < cumulative {
                        return *value;
                    }
                }
                // Floating error left u above the final cumulative sum.
                *values.last().expect("validated non-empty")
            }
        }
    }

    /// The theoretical mean, used by the analytical validator and tests.
    pub fn mean(&self) -> f64 {
        match self {
            Distribution::Constant { value } => *value,
            Distribution::Exponential { mean } | Distribution::Normal { mean, .. } => *mean,
            Distribution::Uniform { min, max } => (min + max) / 2.0,
            Distribution::Triangular { min, mode, max } => (min + mode + max) / 3.0,
            Distribution::Empirical {
                values,
                probabilities,
            } => values.iter().zip(probabilities).map(|(v, p)| v * p).sum(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn constant_always_returns_its_value() {
        let d = Distribution::Constant { value: 2.5 };
        let mut rng = Mt19937::new(1);
        for _ in 0..10 {
            assert_eq!(d.sample(&mut rng), 2.5);
        }
    }

    #[test]
    fn exponential_matches_inverse_cdf() {
        let d = Distribution::Exponential { mean: 3.0 };
        let mut sampling = Mt19937::new(77);
        let mut replay = Mt19937::new(77);
        for _ in 0..100 {
            let sample = d.sample(&mut sampling);
            let u = replay.next_f64();
            assert!((sample - (-(1.0 - u).ln() * 3.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn exponential_sample_mean_converges() {
        let d = Distribution::Exponential { mean: 2.0 };
        let mut rng = Mt19937::new(2024);
        let n = 200_000;
        let total: f64 = (0..n).map(|_| d.sample(&mut rng)).sum();
        let mean = total / f64::from(n);
        assert!((mean - 2.0).abs() < 0.05, "sample mean {mean} too far from 2.0");
    }

    #[test]
    fn empirical_walks_cumulative_probabilities() {
        let d = Distribution::Empirical {
            values: vec![1.0, 5.0, 10.0],
            probabilities: vec![0.2, 0.5, 0.3],
        };
        d.validate().unwrap();
        let mut rng = Mt19937::new(3);
        for _ in 0..1_000 {
            let v = d.sample(&mut rng);
            assert!(v == 1.0 || v == 5.0 || v == 10.0);
        }
        assert!((d.mean() - (0.2 + 2.5 + 3.0)).abs() < 1e-12);
    }

    #[test_case(Distribution::Exponential { mean: 0.0 }; "zero exponential mean")]
    #[test_case(Distribution::Exponential { mean: -1.0 }; "negative exponential mean")]
    #[test_case(Distribution::Uniform { min: 2.0, max: 2.0 }; "degenerate uniform")]
    #[test_case(Distribution::Uniform { min: 3.0, max: 1.0 }; "inverted uniform")]
    #[test_case(Distribution::Triangular { min: 0.0, mode: 5.0, max: 4.0 }; "mode above max")]
    #[test_case(Distribution::Triangular { min: 2.0, mode: 1.0, max: 4.0 }; "mode below min")]
    #[test_case(Distribution::Normal { mean: 0.0, std_dev: 0.0 }; "zero std dev")]
    fn invalid_parameters_are_rejected(d: Distribution) {
        assert!(d.validate().is_err());
    }

    #[test]
    fn empirical_validation_errors() {
        let mismatched = Distribution::Empirical {
            values: vec![1.0, 2.0],
            probabilities: vec![1.0],
        };
        assert!(matches!(
            mismatched.validate(),
            Err(DistributionError::EmpiricalLengthMismatch { .. })
        ));

        let bad_sum = Distribution::Empirical {
            values: vec![1.0, 2.0],
            probabilities: vec![0.4, 0.4],
        };
        assert!(matches!(
            bad_sum.validate(),
            Err(DistributionError::EmpiricalProbabilitySum { .. })
        ));

        // Within tolerance passes.
        let near_one = Distribution::Empirical {
            values: vec![1.0, 2.0],
            probabilities: vec![0.5, 0.500_01],
        };
        assert!(near_one.validate().is_ok());
    }

    proptest! {
        #[test]
        fn uniform_samples_stay_in_bounds(seed in any::<u32>(), min in -100.0f64..100.0, width in 0.001f64..50.0) {
            let d = Distribution::Uniform { min, max: min + width };
            let mut rng = Mt19937::new(seed);
            for _ in 0..64 {
                let v = d.sample(&mut rng);
                prop_assert!(v >= min && v < min + width);
            }
        }

        #[test]
        fn triangular_samples_stay_in_bounds(seed in any::<u32>(), min in -10.0f64..10.0, a in 0.0f64..5.0, b in 0.0f64..5.0) {
            let mode = min + a;
            let max = mode + b;
            let d = Distribution::Triangular { min, mode, max };
            prop_assume!(d.validate().is_ok());
            let mut rng = Mt19937::new(seed);
            for _ in 0..64 {
                let v = d.sample(&mut rng);
                prop_assert!(v >= min - 1e-9 && v <= max + 1e-9);
            }
        }
    }
}
