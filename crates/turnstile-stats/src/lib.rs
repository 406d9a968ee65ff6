//! # turnstile-stats: Simulation output analysis
//!
//! Two families of statistics drive every performance figure Turnstile
//! reports:
//!
//! - [`Tally`]: observation-indexed, one update per recorded value
//!   (waiting times, cycle times). Welford's online algorithm keeps the
//!   mean and variance numerically stable over millions of observations;
//!   raw observations are retained for percentile recovery.
//! - [`TimePersistent`]: time-weighted; tracks a piecewise-constant
//!   signal (queue length, entities in system) and reports its
//!   time-average.
//!
//! On top of those sit [`BatchMeans`] (variance reduction for correlated
//! output series), [`welch_warmup_index`] (warm-up truncation point
//! detection across replications), and the [`critical`] t/z tables that
//! turn standard errors into confidence intervals.
//!
//! A [`StatisticsRegistry`] owns every named statistic of one kernel and
//! produces the serializable summary records hosts consume.

mod batch;
pub mod critical;
mod registry;
mod summary;
mod tally;
mod time_persistent;
mod welch;

pub use batch::BatchMeans;
pub use registry::StatisticsRegistry;
pub use summary::{ConfidenceInterval, TallySummary, TimePersistentSummary};
pub use tally::Tally;
pub use time_persistent::TimePersistent;
pub use welch::welch_warmup_index;
