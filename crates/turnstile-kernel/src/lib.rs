//! # turnstile-kernel: The discrete-event simulation core
//!
//! Turnstile advances simulated time by jumping between scheduled events.
//! This crate owns everything between a compiled model and a statistics
//! summary:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            Kernel                                │
//! │  ┌────────────┐   ┌───────────┐   ┌──────────────────────────┐   │
//! │  │  Calendar  │   │   Clock   │   │  StreamManager (MT19937) │   │
//! │  │ (min-heap) │   │  (`now`)  │   │  "main", "arrivals_<k>"  │   │
//! │  └────────────┘   └───────────┘   └──────────────────────────┘   │
//! │                                                                  │
//! │  ┌──────────────────────────────────────────────────────────┐    │
//! │  │  Dispatch: Arrival → StartService → EndService → …       │    │
//! │  │  Entities ⟷ Resources ⟷ FlowEngine ⟷ ArrivalSources      │    │
//! │  └──────────────────────────────────────────────────────────┘    │
//! │                                                                  │
//! │  ┌──────────────────────────────────────────────────────────┐    │
//! │  │  Invariants: conservation, load = |in_service| ≤ cap,    │    │
//! │  │  monotone clock, calendar horizon                        │    │
//! │  └──────────────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Execution is single-threaded and cooperative: each event is dispatched
//! atomically, and callers drive progress with [`Kernel::run`] or
//! [`Kernel::step`]. Given the same model, seed, and stepping schedule,
//! the event trace and the statistics summary are bitwise identical.
//!
//! # Quick start
//!
//! ```
//! use turnstile_kernel::Simulation;
//! use turnstile_model::ModelDescription;
//!
//! let json = r#"{
//!     "system_name": "espresso bar",
//!     "entities": [{"name": "Customer", "class": "customer",
//!         "arrival_pattern": {"kind": "poisson", "rate": 30, "rate_unit": "per_hour"}}],
//!     "resources": [{"name": "Barista", "type": "server", "capacity": 1,
//!         "processing_time": {"type": "exponential", "parameters": {"mean": 1.5}}}],
//!     "processes": [{"name": "order", "entity_type": "customer",
//!         "sequence": [
//!             {"id": "s1", "type": "seize", "resource_name": "Barista"},
//!             {"id": "d1", "type": "delay",
//!              "duration": {"type": "exponential", "parameters": {"mean": 1.5}}},
//!             {"id": "r1", "type": "release", "resource_name": "Barista"}]}],
//!     "simulation_duration": 4.0,
//!     "random_seed": 7
//! }"#;
//!
//! let model = ModelDescription::from_json(json).unwrap();
//! let mut sim = Simulation::from_model(&model).unwrap();
//! let summary = sim.run_to_completion().unwrap();
//! assert!(summary.simulation.entities_created > 0);
//! assert!(sim.kernel().validate_conservation());
//! ```

mod arrivals;
mod calendar;
mod entity;
mod error;
mod event;
mod kernel;
mod resource;
mod routing;
mod sim;
mod summary;
mod trace;
mod visual;

pub use arrivals::ArrivalSource;
pub use calendar::{EventCalendar, MinHeap};
pub use entity::{AttributeValue, Entity, SERVICE_DISTRIBUTION_ATTRIBUTE};
pub use error::{Diagnostic, SimError};
pub use event::{Event, EventKind, EventPayload};
pub use kernel::{Kernel, StepStatus};
pub use resource::Resource;
pub use routing::FlowEngine;
pub use sim::{ReplicationFailure, ReplicationRunner, ReplicationSummary, Simulation};
pub use summary::{ResourceSummary, SimulationSummary, StatisticsSummary};
pub use trace::{TraceEntry, TraceLog};
pub use visual::{Layout, VisualEntity, VisualResource};
