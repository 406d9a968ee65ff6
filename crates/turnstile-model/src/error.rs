//! Model compilation errors.
//!
//! Every variant is a compile-time rejection: when `compile` returns one
//! of these, no kernel was constructed and no event was scheduled.

use std::path::PathBuf;

use thiserror::Error;
use turnstile_rng::DistributionError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file at {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse model JSON at {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("model declares no entities")]
    NoEntities,

    #[error("model declares no resources")]
    NoResources,

    #[error("duplicate resource name {name:?}")]
    DuplicateResource { name: String },

    #[error("resource {name:?} has zero capacity")]
    ZeroCapacity { name: String },

    #[error("resource {resource:?} requests queue discipline {discipline:?}; only FIFO is supported")]
    UnsupportedQueueDiscipline { resource: String, discipline: String },

    #[error("unknown distribution type {name:?}")]
    UnknownDistribution { name: String },

    #[error("distribution {distribution:?} is missing parameter {parameter:?}")]
    MissingParameter {
        distribution: String,
        parameter: &'static str,
    },

    #[error("invalid distribution parameters: {0}")]
    InvalidDistribution(#[from] DistributionError),

    #[error("unknown rate unit {unit:?}")]
    UnknownRateUnit { unit: String },

    #[error("process {process:?} step {step:?} seizes unknown resource {resource:?}")]
    UnknownResource {
        process: String,
        step: String,
        resource: String,
    },

    #[error("routing probabilities for stage {stage:?} sum to {sum}, expected 1.0")]
    RoutingProbabilitySum { stage: String, sum: f64 },

    #[error("malformed clock window bound {value:?}, expected \"HH:MM\"")]
    InvalidClockWindow { value: String },

    #[error("arrival window ends before it starts: [{start}, {end}] minutes")]
    WindowOrder { start: f64, end: f64 },

    #[error("arrival time for class {class:?} must be a non-negative number, got {value}")]
    NegativeTime { class: String, value: f64 },

    #[error("arrival window for class {class:?} has no start/end bounds")]
    MissingWindowBounds { class: String },
}
