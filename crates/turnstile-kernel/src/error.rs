//! Runtime errors and recoverable diagnostics.
//!
//! Fatal conditions ([`SimError`]) abort the run. Recoverable conditions
//! ([`Diagnostic`]) are logged, recorded in the statistics summary, and
//! the run continues.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use turnstile_types::{EntityId, SimTime};

/// Fatal simulation failures.
#[derive(Debug, Error)]
pub enum SimError {
    /// An event was scheduled before the current clock. Indicates a
    /// kernel bug or host misuse; never recovered.
    #[error("cannot schedule a {kind} event at {event_time}: clock is already at {now}")]
    SchedulePast {
        kind: String,
        event_time: SimTime,
        now: SimTime,
    },

    /// A dispatched event left the state inconsistent. The message
    /// carries a snapshot of the offending entity or resource; the run
    /// aborts and is never silently repaired.
    #[error("invariant {invariant:?} violated at {time}: {message}")]
    InvariantViolation {
        invariant: &'static str,
        time: SimTime,
        message: String,
    },
}

/// Recoverable conditions surfaced through the statistics summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "diagnostic_kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An entity's stage or next resource could not be resolved; the
    /// entity was routed to departure instead of being stranded.
    RoutingWarning { entity: EntityId, detail: String },
    /// An entity class declared an arrival pattern the engine does not
    /// recognize; the class produces no arrivals.
    ArrivalUnsupported { class: String, kind: String },
}
