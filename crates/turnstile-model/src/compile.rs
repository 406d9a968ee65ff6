//! The model compiler.
//!
//! Compilation turns a [`ModelDescription`] into the flat, validated form
//! the kernel consumes: resources keyed by id, per-class process flows as
//! stage lists with routing rules, and normalized arrival plans. All
//! `ModelError` conditions surface here; a compiled model never fails
//! validation at runtime.

use std::collections::BTreeMap;

use turnstile_rng::Distribution;
use turnstile_types::{ResourceId, StageId};

use crate::steps::{classify_step, normalize_token, StepKind};
use crate::{
    compile_distribution, ArrivalPatternSpec, ModelDescription, ModelError, ProcessSpec,
    RateWindowSpec, StepSpec,
};

/// Tolerance for routing probability sums.
const ROUTING_PROBABILITY_TOLERANCE: f64 = 1e-4;

// ============================================================================
// Compiled Forms
// ============================================================================

/// The validated, kernel-ready model.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    pub name: String,
    pub resources: Vec<CompiledResource>,
    /// Flows keyed by entity class.
    pub flows: BTreeMap<String, Flow>,
    /// One plan per entity class, in declaration order.
    pub arrivals: Vec<ArrivalPlan>,
    pub run_length_minutes: f64,
    pub warmup_minutes: f64,
    pub replications: u32,
    pub base_seed: u32,
}

/// A resource with validated capacity and compiled distributions.
#[derive(Debug, Clone)]
pub struct CompiledResource {
    pub id: ResourceId,
    pub name: String,
    pub capacity: u32,
    /// Fallback service time when a stage declares none.
    pub processing_time: Option<Distribution>,
}

/// The stage list for one entity class.
#[derive(Debug, Clone)]
pub struct Flow {
    pub class: String,
    pub first_stage: StageId,
    pub stages: Vec<Stage>,
}

impl Flow {
    pub fn stage(&self, id: &StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| &s.id == id)
    }
}

/// One seize-delay-release triple.
#[derive(Debug, Clone)]
pub struct Stage {
    pub id: StageId,
    pub resource: ResourceId,
    pub service: Option<Distribution>,
    pub rules: Vec<RoutingRule>,
}

/// Where an entity goes after a stage completes.
#[derive(Debug, Clone)]
pub struct RoutingRule {
    pub next: NextStage,
    pub probability: Option<f64>,
    /// Condition placeholder; evaluation is a declared extension.
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStage {
    Stage(StageId),
    Exit,
}

/// A user attribute value stamped onto every entity of a class.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeSeed {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl AttributeSeed {
    fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(AttributeSeed::Number),
            serde_json::Value::String(s) => Some(AttributeSeed::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(AttributeSeed::Flag(*b)),
            _ => None,
        }
    }
}

/// Normalized arrival plan for one entity class.
#[derive(Debug, Clone)]
pub struct ArrivalPlan {
    pub class: String,
    pub class_index: usize,
    pub pattern: ArrivalPattern,
    /// Declared user attributes, stamped onto each created entity.
    pub attributes: Vec<(String, AttributeSeed)>,
}

#[derive(Debug, Clone)]
pub enum ArrivalPattern {
    /// Homogeneous Poisson, rate normalized to per-minute.
    Poisson {
        rate_per_minute: f64,
        max_arrivals: Option<u64>,
    },
    /// Piecewise-constant rate windows in simulation minutes.
    NonHomogeneousPoisson { windows: Vec<RateWindow> },
    /// Absolute arrival instants in minutes, sorted ascending.
    Scheduled { times_min: Vec<f64> },
    /// Unrecognized pattern kind: the class produces no arrivals and the
    /// kernel records a diagnostic.
    Unsupported { kind: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateWindow {
    pub start_min: f64,
    pub end_min: f64,
    pub rate_per_hour: f64,
}

// ============================================================================
// Compilation
// ============================================================================

/// Compiles and validates a model description.
pub fn compile(model: &ModelDescription) -> Result<CompiledModel, ModelError> {
    if model.entities.is_empty() {
        return Err(ModelError::NoEntities);
    }
    if model.resources.is_empty() {
        return Err(ModelError::NoResources);
    }

    let resources = compile_resources(model)?;
    let resource_ids: BTreeMap<String, ResourceId> = resources
        .iter()
        .map(|r| (normalize_token(&r.name), r.id.clone()))
        .collect();

    let mut flows = BTreeMap::new();
    for process in &model.processes {
        let flow = compile_flow(process, &resource_ids)?;
        // First declared process wins for a class.
        flows.entry(flow.class.clone()).or_insert(flow);
    }

    let arrivals = model
        .entities
        .iter()
        .enumerate()
        .map(|(class_index, entity)| {
            let pattern = match &entity.arrival_pattern {
                Some(spec) => compile_arrival_pattern(spec, &entity.class)?,
                None => ArrivalPattern::Scheduled { times_min: Vec::new() },
            };
            let attributes = entity
                .attributes
                .iter()
                .filter_map(|a| AttributeSeed::from_json(&a.value).map(|v| (a.name.clone(), v)))
                .collect();
            Ok(ArrivalPlan {
                class: entity.class.clone(),
                class_index,
                pattern,
                attributes,
            })
        })
        .collect::<Result<Vec<_>, ModelError>>()?;

    Ok(CompiledModel {
        name: model.system_name.clone(),
        resources,
        flows,
        arrivals,
        run_length_minutes: model.simulation_duration * 60.0,
        warmup_minutes: model.warmup_period * 60.0,
        replications: model.replications.max(1),
        base_seed: model.random_seed,
    })
}

/// A stable resource id derived from the declared name.
fn resource_id_for(name: &str) -> ResourceId {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    ResourceId::new(slug)
}

fn compile_resources(model: &ModelDescription) -> Result<Vec<CompiledResource>, ModelError> {
    let mut seen = BTreeMap::new();
    let mut resources = Vec::with_capacity(model.resources.len());

    for spec in &model.resources {
        let id = resource_id_for(&spec.name);
        if seen.insert(id.clone(), ()).is_some() {
            return Err(ModelError::DuplicateResource {
                name: spec.name.clone(),
            });
        }
        if spec.capacity == 0 {
            return Err(ModelError::ZeroCapacity {
                name: spec.name.clone(),
            });
        }
        if let Some(discipline) = &spec.queue_discipline {
            if normalize_token(discipline) != "fifo" {
                return Err(ModelError::UnsupportedQueueDiscipline {
                    resource: spec.name.clone(),
                    discipline: discipline.clone(),
                });
            }
        }
        let processing_time = spec
            .processing_time
            .as_ref()
            .map(compile_distribution)
            .transpose()?;

        resources.push(CompiledResource {
            id,
            name: spec.name.clone(),
            capacity: spec.capacity,
            processing_time,
        });
    }
    Ok(resources)
}

// ============================================================================
// Flow Compilation
// ============================================================================

/// Scans a process sequence into stages.
///
/// Each seize step opens a stage: the next delay supplies its service
/// time, the matching release closes it, and the step after the release
/// determines its routing rules.
fn compile_flow(
    process: &ProcessSpec,
    resource_ids: &BTreeMap<String, ResourceId>,
) -> Result<Flow, ModelError> {
    let sequence = &process.sequence;
    let mut stages = Vec::new();

    for (i, step) in sequence.iter().enumerate() {
        if classify_step(step) != StepKind::Seize {
            continue;
        }
        let resource_name = step.resource_name.clone().unwrap_or_default();
        let resource = resource_ids
            .get(&normalize_token(&resource_name))
            .cloned()
            .ok_or_else(|| ModelError::UnknownResource {
                process: process.name.clone(),
                step: step.id.clone(),
                resource: resource_name,
            })?;

        let service = next_delay_distribution(&sequence[i + 1..])?;
        let release_offset = find_release(&sequence[i + 1..], step.resource_name.as_deref());
        let after_release = release_offset.map(|offset| i + 1 + offset + 1);

        let rules = routing_rules_after(sequence, after_release)?;
        validate_probabilities(&step.id, &rules)?;

        stages.push(Stage {
            id: StageId::new(step.id.clone()),
            resource,
            service,
            rules,
        });
    }

    let first_stage = stages
        .first()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| StageId::new(""));

    Ok(Flow {
        class: process.entity_type.clone(),
        first_stage,
        stages,
    })
}

/// The duration of the first delay step in `rest`, compiled.
fn next_delay_distribution(rest: &[StepSpec]) -> Result<Option<Distribution>, ModelError> {
    for step in rest {
        match classify_step(step) {
            StepKind::Delay => {
                return step.duration.as_ref().map(compile_distribution).transpose();
            }
            // A new seize means this stage has no delay of its own.
            StepKind::Seize => return Ok(None),
            _ => {}
        }
    }
    Ok(None)
}

/// Offset of the release matching `resource_name` within `rest`.
///
/// A release without an explicit resource name matches any open seize,
/// which is how editors emit single-resource sequences.
fn find_release(rest: &[StepSpec], resource_name: Option<&str>) -> Option<usize> {
    rest.iter().position(|step| {
        classify_step(step) == StepKind::Release
            && match (&step.resource_name, resource_name) {
                (Some(released), Some(seized)) => {
                    normalize_token(released) == normalize_token(seized)
                }
                _ => true,
            }
    })
}

/// Routing rules taken from the step at `index` (the one after the
/// stage's release). `None` means the release was missing or last:
/// the entity exits.
fn routing_rules_after(
    sequence: &[StepSpec],
    index: Option<usize>,
) -> Result<Vec<RoutingRule>, ModelError> {
    let exit = vec![RoutingRule {
        next: NextStage::Exit,
        probability: None,
        condition: None,
    }];

    let Some(index) = index else {
        return Ok(exit);
    };
    let Some(step) = sequence.get(index) else {
        return Ok(exit);
    };

    match classify_step(step) {
        StepKind::Seize => Ok(vec![RoutingRule {
            next: NextStage::Stage(StageId::new(step.id.clone())),
            probability: None,
            condition: None,
        }]),
        StepKind::Delay => {
            // A travel/delay between stages: route to the next seize.
            match next_seize_id(&sequence[index + 1..]) {
                Some(stage) => Ok(vec![RoutingRule {
                    next: NextStage::Stage(stage),
                    probability: None,
                    condition: None,
                }]),
                None => Ok(exit),
            }
        }
        StepKind::Decision => {
            let conditions = step.conditions.clone().unwrap_or_default();
            if conditions.is_empty() {
                return Ok(exit);
            }
            let rules = conditions
                .into_iter()
                .map(|condition| RoutingRule {
                    next: resolve_decision_target(sequence, condition.next_step_id.as_deref()),
                    probability: condition.probability,
                    condition: condition.condition,
                })
                .collect();
            Ok(rules)
        }
        StepKind::Release | StepKind::Exit | StepKind::Other => Ok(exit),
    }
}

/// Resolves a decision branch's `next_step_id` to a stage.
///
/// Absent targets and targets classified as exit steps route to EXIT; a
/// target that is not itself a seize resolves forward to the next seize
/// after it.
fn resolve_decision_target(sequence: &[StepSpec], next_step_id: Option<&str>) -> NextStage {
    let Some(target_id) = next_step_id else {
        return NextStage::Exit;
    };
    let Some(position) = sequence.iter().position(|s| s.id == target_id) else {
        return NextStage::Exit;
    };
    let target = &sequence[position];
    match classify_step(target) {
        StepKind::Seize => NextStage::Stage(StageId::new(target.id.clone())),
        StepKind::Exit => NextStage::Exit,
        _ => match next_seize_id(&sequence[position + 1..]) {
            Some(stage) => NextStage::Stage(stage),
            None => NextStage::Exit,
        },
    }
}

fn next_seize_id(rest: &[StepSpec]) -> Option<StageId> {
    rest.iter()
        .find(|s| classify_step(s) == StepKind::Seize)
        .map(|s| StageId::new(s.id.clone()))
}

/// Probabilistic rules must cover the unit interval.
fn validate_probabilities(stage_id: &str, rules: &[RoutingRule]) -> Result<(), ModelError> {
    if rules.iter().all(|r| r.probability.is_none()) {
        return Ok(());
    }
    let sum: f64 = rules.iter().filter_map(|r| r.probability).sum();
    if (sum - 1.0).abs() > ROUTING_PROBABILITY_TOLERANCE {
        return Err(ModelError::RoutingProbabilitySum {
            stage: stage_id.to_string(),
            sum,
        });
    }
    Ok(())
}

// ============================================================================
// Arrival Compilation
// ============================================================================

/// Converts a declared rate to arrivals per minute.
fn rate_per_minute(rate: f64, unit: Option<&str>) -> Result<f64, ModelError> {
    let unit_token = unit.map(normalize_token);
    let scale = match unit_token.as_deref() {
        Some("persecond" | "second" | "sec" | "s") => 60.0,
        Some("perminute" | "minute" | "min" | "m") | None => 1.0,
        Some("perhour" | "hour" | "hr" | "h") => 1.0 / 60.0,
        Some("perday" | "day" | "d") => 1.0 / (24.0 * 60.0),
        Some("perweek" | "week" | "w") => 1.0 / (7.0 * 24.0 * 60.0),
        Some(_) => {
            return Err(ModelError::UnknownRateUnit {
                unit: unit.unwrap_or_default().to_string(),
            });
        }
    };
    Ok(rate * scale)
}

/// Parses an `"HH:MM"` clock string into minutes past midnight.
fn clock_minutes(value: &str) -> Result<f64, ModelError> {
    let invalid = || ModelError::InvalidClockWindow {
        value: value.to_string(),
    };
    let (hours, minutes) = value.split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.trim().parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.trim().parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    Ok(f64::from(hours * 60 + minutes))
}

fn window_bound(
    minutes: Option<f64>,
    clock: Option<&str>,
    class: &str,
) -> Result<f64, ModelError> {
    match (minutes, clock) {
        (Some(m), _) => Ok(m),
        (None, Some(c)) => clock_minutes(c),
        (None, None) => Err(ModelError::MissingWindowBounds {
            class: class.to_string(),
        }),
    }
}

fn compile_window(spec: &RateWindowSpec, class: &str) -> Result<RateWindow, ModelError> {
    let start_min = window_bound(spec.start_min, spec.start.as_deref(), class)?;
    let end_min = window_bound(spec.end_min, spec.end.as_deref(), class)?;
    if !start_min.is_finite() || start_min < 0.0 {
        return Err(ModelError::NegativeTime {
            class: class.to_string(),
            value: start_min,
        });
    }
    if end_min <= start_min {
        return Err(ModelError::WindowOrder {
            start: start_min,
            end: end_min,
        });
    }
    Ok(RateWindow {
        start_min,
        end_min,
        rate_per_hour: spec.rate_per_hour,
    })
}

fn compile_arrival_pattern(
    spec: &ArrivalPatternSpec,
    class: &str,
) -> Result<ArrivalPattern, ModelError> {
    match normalize_token(&spec.kind).as_str() {
        "poisson" | "homogeneouspoisson" => Ok(ArrivalPattern::Poisson {
            rate_per_minute: rate_per_minute(spec.rate.unwrap_or(0.0), spec.rate_unit.as_deref())?,
            max_arrivals: spec.max_arrivals,
        }),
        "nonhomogeneouspoisson" | "nhpp" => {
            let mut windows = spec
                .windows
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|w| compile_window(w, class))
                .collect::<Result<Vec<_>, _>>()?;
            windows.sort_by(|a, b| a.start_min.total_cmp(&b.start_min));
            Ok(ArrivalPattern::NonHomogeneousPoisson { windows })
        }
        "scheduled" | "schedule" | "list" => {
            let mut times_min = spec.times.clone().unwrap_or_default();
            if let Some(bad) = times_min.iter().find(|t| !t.is_finite() || **t < 0.0) {
                return Err(ModelError::NegativeTime {
                    class: class.to_string(),
                    value: *bad,
                });
            }
            times_min.sort_by(f64::total_cmp);
            Ok(ArrivalPattern::Scheduled { times_min })
        }
        other => Ok(ArrivalPattern::Unsupported {
            kind: other.to_string(),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConditionSpec, DistributionSpec, EntitySpec, ResourceSpec};

    fn dist(dist_type: &str, params: &[(&str, f64)]) -> DistributionSpec {
        DistributionSpec {
            dist_type: dist_type.to_string(),
            parameters: params
                .iter()
                .map(|(k, v)| ((*k).to_string(), serde_json::json!(v)))
                .collect(),
            unit: None,
        }
    }

    fn step(id: &str, step_type: &str, resource: Option<&str>) -> StepSpec {
        StepSpec {
            id: id.to_string(),
            step_type: step_type.to_string(),
            resource_name: resource.map(str::to_string),
            ..StepSpec::default()
        }
    }

    fn base_model() -> ModelDescription {
        ModelDescription {
            system_name: "test".to_string(),
            entities: vec![EntitySpec {
                name: "Part".to_string(),
                class: "part".to_string(),
                arrival_pattern: Some(ArrivalPatternSpec {
                    kind: "poisson".to_string(),
                    rate: Some(20.0),
                    rate_unit: Some("per_hour".to_string()),
                    ..ArrivalPatternSpec::default()
                }),
                ..EntitySpec::default()
            }],
            resources: vec![
                ResourceSpec {
                    name: "Machine 1".to_string(),
                    capacity: 1,
                    ..ResourceSpec::default()
                },
                ResourceSpec {
                    name: "Machine 2".to_string(),
                    capacity: 1,
                    ..ResourceSpec::default()
                },
            ],
            processes: Vec::new(),
            ..ModelDescription::default()
        }
    }

    fn two_stage_process() -> ProcessSpec {
        let mut delay1 = step("d1", "delay", None);
        delay1.duration = Some(dist("constant", &[("value", 2.0)]));
        let mut delay2 = step("d2", "delay", None);
        delay2.duration = Some(dist("constant", &[("value", 1.5)]));
        ProcessSpec {
            name: "machining".to_string(),
            entity_type: "part".to_string(),
            routing_logic: "sequential".to_string(),
            sequence: vec![
                step("s1", "seize", Some("Machine 1")),
                delay1,
                step("r1", "release", Some("Machine 1")),
                step("s2", "seize", Some("Machine 2")),
                delay2,
                step("r2", "release", Some("Machine 2")),
            ],
        }
    }

    #[test]
    fn empty_entity_or_resource_lists_are_rejected() {
        let mut model = base_model();
        model.entities.clear();
        assert!(matches!(compile(&model), Err(ModelError::NoEntities)));

        let mut model = base_model();
        model.resources.clear();
        assert!(matches!(compile(&model), Err(ModelError::NoResources)));
    }

    #[test]
    fn zero_capacity_is_a_compile_error() {
        let mut model = base_model();
        model.resources[0].capacity = 0;
        assert!(matches!(compile(&model), Err(ModelError::ZeroCapacity { .. })));
    }

    #[test]
    fn non_fifo_discipline_is_rejected() {
        let mut model = base_model();
        model.resources[0].queue_discipline = Some("SPT".to_string());
        assert!(matches!(
            compile(&model),
            Err(ModelError::UnsupportedQueueDiscipline { .. })
        ));

        let mut model = base_model();
        model.resources[0].queue_discipline = Some("fifo".to_string());
        assert!(compile(&model).is_ok());
    }

    #[test]
    fn two_stage_sequence_compiles_to_chained_stages() {
        let mut model = base_model();
        model.processes.push(two_stage_process());
        let compiled = compile(&model).unwrap();
        let flow = &compiled.flows["part"];

        assert_eq!(flow.first_stage, StageId::new("s1"));
        assert_eq!(flow.stages.len(), 2);

        let s1 = flow.stage(&StageId::new("s1")).unwrap();
        assert_eq!(s1.resource, ResourceId::new("machine_1"));
        assert_eq!(s1.service, Some(Distribution::Constant { value: 2.0 }));
        assert_eq!(s1.rules.len(), 1);
        assert_eq!(s1.rules[0].next, NextStage::Stage(StageId::new("s2")));

        let s2 = flow.stage(&StageId::new("s2")).unwrap();
        assert_eq!(s2.rules[0].next, NextStage::Exit);
    }

    #[test]
    fn decision_step_yields_one_rule_per_condition() {
        let mut model = base_model();
        let mut process = two_stage_process();
        // Replace the tail with a branch after the first release.
        process.sequence.truncate(3);
        process.sequence.push(StepSpec {
            id: "b1".to_string(),
            step_type: "decision".to_string(),
            conditions: Some(vec![
                ConditionSpec {
                    probability: Some(0.7),
                    next_step_id: Some("s2".to_string()),
                    condition: None,
                },
                ConditionSpec {
                    probability: Some(0.3),
                    next_step_id: None,
                    condition: None,
                },
            ]),
            ..StepSpec::default()
        });
        process.sequence.push(step("s2", "seize", Some("Machine 2")));
        process.sequence.push(step("r2", "release", Some("Machine 2")));
        model.processes.push(process);

        let compiled = compile(&model).unwrap();
        let s1 = compiled.flows["part"].stage(&StageId::new("s1")).unwrap();
        assert_eq!(s1.rules.len(), 2);
        assert_eq!(s1.rules[0].next, NextStage::Stage(StageId::new("s2")));
        assert_eq!(s1.rules[0].probability, Some(0.7));
        assert_eq!(s1.rules[1].next, NextStage::Exit);
    }

    #[test]
    fn probability_sum_tolerance_boundaries() {
        let build = |p: f64| {
            let mut model = base_model();
            let mut process = two_stage_process();
            process.sequence.truncate(3);
            process.sequence.push(StepSpec {
                id: "b1".to_string(),
                step_type: "branch".to_string(),
                conditions: Some(vec![
                    ConditionSpec {
                        probability: Some(0.5),
                        next_step_id: Some("s2".to_string()),
                        condition: None,
                    },
                    ConditionSpec {
                        probability: Some(p),
                        next_step_id: None,
                        condition: None,
                    },
                ]),
                ..StepSpec::default()
            });
            process.sequence.push(step("s2", "seize", Some("Machine 2")));
            model.processes.push(process);
            compile(&model)
        };

        // 1 + 1e-5 is inside the 1e-4 tolerance.
        assert!(build(0.5 + 1e-5).is_ok());
        // 1 + 1e-3 is outside it.
        assert!(matches!(
            build(0.5 + 1e-3),
            Err(ModelError::RoutingProbabilitySum { .. })
        ));
    }

    #[test]
    fn seize_of_unknown_resource_fails_compile() {
        let mut model = base_model();
        let mut process = two_stage_process();
        process.sequence[0].resource_name = Some("Ghost".to_string());
        model.processes.push(process);
        assert!(matches!(compile(&model), Err(ModelError::UnknownResource { .. })));
    }

    #[test]
    fn synonym_steps_compile_identically() {
        let mut model = base_model();
        let mut process = two_stage_process();
        process.sequence[0].step_type = "Acquire".to_string();
        process.sequence[1].step_type = "wait".to_string();
        process.sequence[2].step_type = "FREE".to_string();
        model.processes.push(process);
        let compiled = compile(&model).unwrap();
        let s1 = compiled.flows["part"].stage(&StageId::new("s1")).unwrap();
        assert_eq!(s1.service, Some(Distribution::Constant { value: 2.0 }));
        assert_eq!(s1.rules[0].next, NextStage::Stage(StageId::new("s2")));
    }

    #[test]
    fn rates_normalize_to_per_minute() {
        assert_eq!(rate_per_minute(30.0, Some("per_hour")).unwrap(), 0.5);
        assert_eq!(rate_per_minute(2.0, Some("per_second")).unwrap(), 120.0);
        assert_eq!(rate_per_minute(3.0, Some("per_minute")).unwrap(), 3.0);
        assert_eq!(rate_per_minute(1440.0, Some("per_day")).unwrap(), 1.0);
        assert_eq!(
            rate_per_minute(7.0 * 24.0 * 60.0, Some("Per_Week")).unwrap(),
            1.0
        );
        assert!(matches!(
            rate_per_minute(1.0, Some("per_fortnight")),
            Err(ModelError::UnknownRateUnit { .. })
        ));
    }

    #[test]
    fn clock_windows_convert_to_minutes() {
        let window = compile_window(
            &RateWindowSpec {
                start: Some("08:30".to_string()),
                end: Some("10:00".to_string()),
                rate_per_hour: 12.0,
                ..RateWindowSpec::default()
            },
            "walkin",
        )
        .unwrap();
        assert_eq!(window.start_min, 510.0);
        assert_eq!(window.end_min, 600.0);

        assert!(matches!(
            clock_minutes("8h30"),
            Err(ModelError::InvalidClockWindow { .. })
        ));
        assert!(matches!(
            clock_minutes("08:75"),
            Err(ModelError::InvalidClockWindow { .. })
        ));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = compile_window(
            &RateWindowSpec {
                start_min: Some(120.0),
                end_min: Some(60.0),
                rate_per_hour: 10.0,
                ..RateWindowSpec::default()
            },
            "walkin",
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::WindowOrder { .. }));
    }

    #[test]
    fn negative_scheduled_times_are_rejected() {
        let mut model = base_model();
        model.entities[0].arrival_pattern = Some(ArrivalPatternSpec {
            kind: "scheduled".to_string(),
            times: Some(vec![5.0, -1.0]),
            ..ArrivalPatternSpec::default()
        });
        assert!(matches!(compile(&model), Err(ModelError::NegativeTime { .. })));
    }

    #[test]
    fn unknown_arrival_kind_becomes_unsupported_plan() {
        let mut model = base_model();
        model.entities[0].arrival_pattern = Some(ArrivalPatternSpec {
            kind: "fractal_burst".to_string(),
            ..ArrivalPatternSpec::default()
        });
        let compiled = compile(&model).unwrap();
        assert!(matches!(
            compiled.arrivals[0].pattern,
            ArrivalPattern::Unsupported { .. }
        ));
    }

    #[test]
    fn durations_convert_hours_to_minutes() {
        let mut model = base_model();
        model.simulation_duration = 2.0;
        model.warmup_period = 0.5;
        let compiled = compile(&model).unwrap();
        assert_eq!(compiled.run_length_minutes, 120.0);
        assert_eq!(compiled.warmup_minutes, 30.0);
    }
}
