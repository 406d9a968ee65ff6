//! # Analytical Validation Oracle
//!
//! This crate validates the simulation engine against queueing theory,
//! the way a differential-testing oracle validates a database against a
//! reference implementation: closed-form M/M/1 and M/M/c results are the
//! ground truth, the kernel is the system under test.
//!
//! ## Methodology
//!
//! 1. **Build** a minimal model: exponential arrivals at rate λ into a
//!    single station with c exponential servers at rate μ each.
//! 2. **Run** it for a long horizon with a warm-up prefix so the
//!    transient is discarded.
//! 3. **Compare** every recovered statistic (utilization, L, Lq, W, Wq,
//!    throughput) against theory.
//! 4. **Report** per-metric relative errors; a metric passes below the
//!    caller's threshold.
//!
//! The threshold is a parameter: 5% is the default for the standard
//! 2000-hour horizon, tightening to 2% for very long runs.
//!
//! ## Example
//!
//! ```no_run
//! use turnstile_oracle::OracleScenario;
//!
//! let scenario = OracleScenario::mm1("mm1_half_load", 30.0, 60.0);
//! let report = scenario.validate(0.05).unwrap();
//! assert!(report.all_passed(), "{report}");
//! ```

mod scenario;
mod theory;

pub use scenario::{MetricCheck, OracleError, OracleScenario, ValidationReport};
pub use theory::{erlang_c, mm1_theory, mmc_theory, QueueTheory};

/// The pass threshold recommended for a given horizon.
pub fn recommended_threshold(run_hours: f64) -> f64 {
    if run_hours >= 10_000.0 { 0.02 } else { 0.05 }
}
