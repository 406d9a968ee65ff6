//! Serde wire types for the model description.
//!
//! These mirror the editor's output format. Deserialization is
//! permissive: unknown fields are ignored, and enum-like fields (`kind`,
//! `type`) are plain strings so an unrecognized value survives parsing
//! and gets a proper diagnostic at compile time instead of a serde error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// A complete queueing-network model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDescription {
    pub system_name: String,
    pub system_type: String,
    pub description: String,
    pub entities: Vec<EntitySpec>,
    pub resources: Vec<ResourceSpec>,
    pub processes: Vec<ProcessSpec>,
    /// Run length in hours.
    pub simulation_duration: f64,
    /// Warm-up prefix in hours; observations before it are discarded.
    pub warmup_period: f64,
    pub replications: u32,
    pub random_seed: u32,
}

impl Default for ModelDescription {
    fn default() -> Self {
        Self {
            system_name: String::new(),
            system_type: String::new(),
            description: String::new(),
            entities: Vec::new(),
            resources: Vec::new(),
            processes: Vec::new(),
            simulation_duration: 8.0,
            warmup_period: 0.0,
            replications: 1,
            random_seed: 12345,
        }
    }
}

impl ModelDescription {
    /// Parses a model from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        serde_json::from_str(json).map_err(|source| ModelError::ParseError {
            path: "<inline>".into(),
            source,
        })
    }
}

/// One entity class and how its members arrive.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EntitySpec {
    pub name: String,
    pub class: String,
    pub arrival_pattern: Option<ArrivalPatternSpec>,
    pub attributes: Vec<AttributeSpec>,
    pub priority: Option<u32>,
    pub batch_size: Option<u32>,
}

/// A user attribute attached to every entity of a class.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AttributeSpec {
    pub name: String,
    pub value: serde_json::Value,
}

/// Arrival process declaration. `kind` is matched case-insensitively at
/// compile time; unknown kinds disable arrivals for the class with a
/// diagnostic rather than failing the parse.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ArrivalPatternSpec {
    pub kind: String,
    /// Homogeneous Poisson rate, in `rate_unit`s.
    pub rate: Option<f64>,
    pub rate_unit: Option<String>,
    /// Optional cap on total arrivals for the class.
    pub max_arrivals: Option<u64>,
    /// Non-homogeneous Poisson rate windows.
    pub windows: Option<Vec<RateWindowSpec>>,
    /// Scheduled absolute arrival times, in minutes.
    pub times: Option<Vec<f64>>,
}

/// One rate window; bounds come either as minutes or `"HH:MM"` strings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RateWindowSpec {
    pub start_min: Option<f64>,
    pub end_min: Option<f64>,
    /// Clock-time alternative to `start_min`, e.g. `"08:30"`.
    pub start: Option<String>,
    /// Clock-time alternative to `end_min`.
    pub end: Option<String>,
    pub rate_per_hour: f64,
}

fn default_capacity() -> u32 {
    1
}

/// A finite-capacity service station.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    /// Default service time when a stage declares none.
    pub processing_time: Option<DistributionSpec>,
    pub queue_discipline: Option<String>,
    /// Scheduled capacity windows; declared but not enacted by the core.
    pub schedule: Option<serde_json::Value>,
    /// MTBF/MTTR failure profile; declared but not enacted by the core.
    pub failures: Option<FailureSpec>,
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            resource_type: String::new(),
            capacity: default_capacity(),
            processing_time: None,
            queue_discipline: None,
            schedule: None,
            failures: None,
        }
    }
}

/// Mean time between failures / to repair, in minutes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FailureSpec {
    pub mtbf: Option<f64>,
    pub mttr: Option<f64>,
}

/// A process flow for one entity class.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProcessSpec {
    pub name: String,
    pub entity_type: String,
    pub routing_logic: String,
    pub sequence: Vec<StepSpec>,
}

/// One step of a process sequence. `type` accepts the synonym families
/// seize/acquire/grab, delay/wait/process/travel, release/free,
/// decision/branch/choose/decide, and the exit family.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StepSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: String,
    pub resource_name: Option<String>,
    pub duration: Option<DistributionSpec>,
    pub conditions: Option<Vec<ConditionSpec>>,
}

/// One branch of a decision step.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConditionSpec {
    /// Condition expression placeholder; evaluation is a declared
    /// extension, presence alone does not influence routing.
    pub condition: Option<String>,
    pub probability: Option<f64>,
    pub next_step_id: Option<String>,
}

/// A distribution record: `{type, parameters, unit}` with
/// synonym-tolerant type names and parameter keys.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DistributionSpec {
    #[serde(rename = "type")]
    pub dist_type: String,
    pub parameters: BTreeMap<String, serde_json::Value>,
    /// Time unit of the parameters: seconds, minutes (default), hours.
    pub unit: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
