//! Live entities and their attributes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use turnstile_rng::Distribution;
use turnstile_types::{EntityId, EntityState, ResourceId, SimTime, StageId};

/// Attribute key under which the router stores the service-time
/// distribution that applies to the entity's current stage.
pub const SERVICE_DISTRIBUTION_ATTRIBUTE: &str = "service_distribution";

/// A value in an entity's attribute map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
    Flag(bool),
    Distribution(Distribution),
}

/// One live entity, owned by the kernel from creation until departure.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub class: String,
    pub state: EntityState,
    pub created_at: SimTime,
    /// Cumulative minutes spent waiting in queues.
    pub total_wait: f64,
    /// Cumulative minutes of service received.
    pub total_processing: f64,
    /// Cumulative minutes of travel between stations.
    pub total_travel: f64,
    /// Every resource this entity has been routed to, in order.
    pub visited: Vec<ResourceId>,
    pub current_resource: Option<ResourceId>,
    pub current_stage: Option<StageId>,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Entity {
    pub fn new(id: EntityId, class: impl Into<String>, created_at: SimTime) -> Self {
        Self {
            id,
            class: class.into(),
            state: EntityState::Created,
            created_at,
            total_wait: 0.0,
            total_processing: 0.0,
            total_travel: 0.0,
            visited: Vec::new(),
            current_resource: None,
            current_stage: None,
            attributes: BTreeMap::new(),
        }
    }

    /// The service-time distribution for the entity's current stage.
    pub fn service_distribution(&self) -> Option<&Distribution> {
        match self.attributes.get(SERVICE_DISTRIBUTION_ATTRIBUTE) {
            Some(AttributeValue::Distribution(d)) => Some(d),
            _ => None,
        }
    }

    pub fn set_service_distribution(&mut self, distribution: Distribution) {
        self.attributes.insert(
            SERVICE_DISTRIBUTION_ATTRIBUTE.to_string(),
            AttributeValue::Distribution(distribution),
        );
    }

    pub fn clear_service_distribution(&mut self) {
        self.attributes.remove(SERVICE_DISTRIBUTION_ATTRIBUTE);
    }

    /// Whether the timing books balance: accumulated wait + processing +
    /// travel can never exceed the entity's elapsed lifetime.
    pub fn timing_consistent(&self, now: SimTime, tolerance: f64) -> bool {
        let elapsed = now - self.created_at;
        self.total_wait + self.total_processing + self.total_travel <= elapsed + tolerance
    }
}

// ============================================================================
// Tests
// ============================================================================
