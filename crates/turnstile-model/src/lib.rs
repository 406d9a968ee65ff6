//! # turnstile-model: Model descriptions and the flow compiler
//!
//! The model description is the only mandatory input to a Turnstile
//! simulation: entity classes with arrival patterns, resources with
//! capacities and service times, and multi-stage process sequences. This
//! crate owns:
//!
//! - the serde wire types ([`ModelDescription`] and friends); unknown
//!   fields are ignored so editor output with extra metadata loads as-is;
//! - synonym-tolerant distribution records ([`DistributionSpec`] →
//!   [`turnstile_rng::Distribution`]);
//! - the flow compiler ([`compile`]) that scans each process's
//!   seize→delay→release sequence into stages with routing rules;
//! - arrival-pattern normalization (rate units to per-minute, `"HH:MM"`
//!   clock windows to simulation minutes);
//! - [`ModelError`]: every malformed-model condition is caught here,
//!   before a single event is scheduled.
//!
//! # Example
//!
//! ```
//! use turnstile_model::{compile, ModelDescription};
//!
//! let json = r#"{
//!     "system_name": "espresso bar",
//!     "entities": [{
//!         "name": "Customer", "class": "customer",
//!         "arrival_pattern": {"kind": "poisson", "rate": 30, "rate_unit": "per_hour"}
//!     }],
//!     "resources": [{
//!         "name": "Barista", "type": "server", "capacity": 1,
//!         "processing_time": {"type": "exponential", "parameters": {"mean": 2.0}}
//!     }],
//!     "processes": [{
//!         "name": "order", "entity_type": "customer",
//!         "sequence": [
//!             {"id": "s1", "type": "seize", "resource_name": "Barista"},
//!             {"id": "d1", "type": "delay",
//!              "duration": {"type": "exponential", "parameters": {"mean": 2.0}}},
//!             {"id": "r1", "type": "release", "resource_name": "Barista"}
//!         ]
//!     }],
//!     "simulation_duration": 8.0,
//!     "random_seed": 42
//! }"#;
//!
//! let model = ModelDescription::from_json(json).unwrap();
//! let compiled = compile(&model).unwrap();
//! assert_eq!(compiled.resources.len(), 1);
//! assert_eq!(compiled.flows["customer"].stages.len(), 1);
//! ```

mod compile;
mod description;
mod distribution;
mod error;
mod loader;
mod steps;

pub use compile::{
    compile, ArrivalPattern, ArrivalPlan, AttributeSeed, CompiledModel, CompiledResource, Flow,
    NextStage, RateWindow, RoutingRule, Stage,
};
pub use description::{
    ArrivalPatternSpec, AttributeSpec, ConditionSpec, DistributionSpec, EntitySpec, FailureSpec,
    ModelDescription, ProcessSpec, RateWindowSpec, ResourceSpec, StepSpec,
};
pub use distribution::compile_distribution;
pub use error::ModelError;
pub use loader::load_model;
pub use steps::{classify_step, normalize_token, StepKind};
