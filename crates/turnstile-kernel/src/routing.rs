//! The routing engine: next-stage selection on service completion.

use std::collections::BTreeMap;

use turnstile_model::{Flow, NextStage, RoutingRule};
use turnstile_rng::MAIN_STREAM;
use turnstile_types::{EntityId, ResourceId};

use crate::kernel::Kernel;

/// Per-class stage tables and the rule-selection logic.
///
/// The engine holds only flat, id-keyed data; it re-enters the kernel
/// through the service-completion callback to schedule the consequences
/// of each decision.
#[derive(Debug, Clone)]
pub struct FlowEngine {
    flows: BTreeMap<String, Flow>,
}

impl FlowEngine {
    pub fn new(flows: BTreeMap<String, Flow>) -> Self {
        Self { flows }
    }

    /// Installs this engine as the kernel's `on_service_complete`
    /// callback, consuming it.
    pub fn install(self, kernel: &mut Kernel) {
        kernel.set_on_service_complete(Box::new(
            move |kernel: &mut Kernel, entity_id: &EntityId, resource_id: &ResourceId| {
                self.on_service_complete(kernel, entity_id, resource_id);
            },
        ));
    }

    /// Decides where an entity goes after finishing service at
    /// `resource_id`, per its current stage's routing rules.
    pub fn on_service_complete(
        &self,
        kernel: &mut Kernel,
        entity_id: &EntityId,
        _resource_id: &ResourceId,
    ) {
        let Some(entity) = kernel.get_entity(entity_id) else {
            return;
        };
        // No stage means no flow: the entity is done.
        let Some(stage_id) = entity.current_stage.clone() else {
            let _ = kernel.schedule_entity_departure(entity_id);
            return;
        };
        let class = entity.class.clone();

        let stage = self
            .flows
            .get(&class)
            .and_then(|flow| flow.stage(&stage_id));
        let Some(stage) = stage else {
            let _ = kernel.route_to_departure_with_warning(
                entity_id,
                format!("stage {stage_id} not found for class {class}"),
            );
            return;
        };

        let next = {
            let rule = select_rule(&stage.rules, || {
                kernel.streams_mut().stream(MAIN_STREAM).next_f64()
            });
            rule.map(|r| r.next.clone())
        };

        match next {
            None | Some(NextStage::Exit) => {
                if let Some(entity) = kernel.get_entity_mut(entity_id) {
                    entity.current_stage = None;
                }
                let _ = kernel.schedule_entity_departure(entity_id);
            }
            Some(NextStage::Stage(next_id)) => {
                let next_stage = self
                    .flows
                    .get(&class)
                    .and_then(|flow| flow.stage(&next_id))
                    .cloned();
                let Some(next_stage) = next_stage else {
                    let _ = kernel.route_to_departure_with_warning(
                        entity_id,
                        format!("next stage {next_id} not found for class {class}"),
                    );
                    return;
                };
                if let Some(entity) = kernel.get_entity_mut(entity_id) {
                    entity.current_stage = Some(next_stage.id.clone());
                    match &next_stage.service {
                        Some(distribution) => {
                            entity.set_service_distribution(distribution.clone());
                        }
                        None => entity.clear_service_distribution(),
                    }
                }
                let _ = kernel.route_entity_to_resource(entity_id, &next_stage.resource);
            }
        }
    }
}

/// Picks one routing rule.
///
/// A single rule is taken as-is. When any rule carries a probability,
/// one uniform draw walks the cumulative sum and the first rule whose
/// cumulative probability reaches the draw wins; floating error falls
/// back to the last rule. Otherwise the first rule wins (conditional
/// evaluation is a declared extension).
fn select_rule<'a>(
    rules: &'a [RoutingRule],
    mut draw: impl FnMut() -> f64,
) -> Option<&'a RoutingRule> {
    match rules {
        [] => None,
        [only] => Some(only),
        _ if rules.iter().any(|r| r.probability.is_some()) => {
            let u = draw();
            let mut cumulative = 0.0;
            for rule in rules {
                cumulative += rule.probability.unwrap_or(0.0);
                if cumulative >= u {
                    return Some(rule);
                }
            }
            rules.last()
        }
        _ => rules.first(),
    }
}

// ============================================================================
// Tests
// ============================================================================
