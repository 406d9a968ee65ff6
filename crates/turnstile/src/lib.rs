//! # Turnstile
//!
//! Deterministic discrete-event simulation for queueing networks.
//!
//! Turnstile takes a model description (entity classes with arrival
//! patterns, finite-capacity resources, multi-stage process flows) and
//! advances simulated time event by event, producing observation-based
//! and time-weighted statistics with confidence intervals.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                          Turnstile                             │
//! │  ┌─────────┐   ┌──────────┐   ┌──────────┐   ┌─────────────┐   │
//! │  │  Model  │ → │ Compiler │ → │  Kernel  │ → │  Statistics │   │
//! │  │ (JSON)  │   │ (stages) │   │ (events) │   │  (summary)  │   │
//! │  └─────────┘   └──────────┘   └──────────┘   └─────────────┘   │
//! │                                     ↑                          │
//! │                        MT19937 named streams                   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Same model + same seed → bitwise-identical trace and summary; the
//! analytical oracle ([`oracle`]) keeps the engine honest against
//! closed-form M/M/1 and M/M/c results.
//!
//! # Quick Start
//!
//! ```no_run
//! use turnstile::{load_model, Simulation};
//!
//! let model = load_model("clinic.json")?;
//! let mut sim = Simulation::from_model(&model)?;
//! let summary = sim.run_to_completion()?;
//!
//! println!("mean cycle time: {:.2} min", summary.tally["entity_cycle_time"].mean);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! - **Driver**: [`Simulation`], [`ReplicationRunner`] - run models
//! - **Core**: [`Kernel`], [`Event`], [`StepStatus`] - the event loop
//! - **Model**: [`ModelDescription`], [`compile`] - input handling
//! - **Output**: [`StatisticsSummary`] - results
//! - **Oracle**: [`oracle`] - analytical validation

pub use turnstile_kernel::{
    ArrivalSource, Diagnostic, Entity, Event, EventCalendar, EventKind, FlowEngine, Kernel,
    Layout, ReplicationRunner, ReplicationSummary, Resource, SimError, Simulation, StatisticsSummary,
    StepStatus, TraceEntry, VisualEntity, VisualResource,
};
pub use turnstile_model::{
    compile, load_model, ArrivalPattern, CompiledModel, DistributionSpec, ModelDescription,
    ModelError,
};
pub use turnstile_rng::{Distribution, Mt19937, StreamManager};
pub use turnstile_stats::{BatchMeans, StatisticsRegistry, Tally, TimePersistent};
pub use turnstile_types::{EntityId, EntityState, ResourceId, SimTime, StageId};

/// Analytical validation against queueing theory.
pub mod oracle {
    pub use turnstile_oracle::{
        erlang_c, mm1_theory, mmc_theory, recommended_threshold, OracleScenario, QueueTheory,
        ValidationReport,
    };
}
