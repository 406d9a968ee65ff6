//! Pull-only views for hosts that animate the simulation.
//!
//! Nothing here mutates simulation state: the host polls at its own
//! rate and renders whatever it gets. Positions come from a
//! host-supplied [`Layout`], falling back to a deterministic grid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use turnstile_types::{EntityId, EntityState, ResourceId, SimTime};

use crate::kernel::Kernel;

const GRID_COLUMNS: usize = 4;
const GRID_ORIGIN: (f64, f64) = (120.0, 120.0);
const GRID_SPACING: (f64, f64) = (180.0, 140.0);
const QUEUE_SPACING: f64 = 30.0;

/// Resource positions supplied by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layout {
    positions: BTreeMap<ResourceId, (f64, f64)>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, resource: ResourceId, x: f64, y: f64) {
        self.positions.insert(resource, (x, y));
    }

    pub fn position(&self, resource: &ResourceId) -> Option<(f64, f64)> {
        self.positions.get(resource).copied()
    }
}

/// Snapshot of one live entity for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualEntity {
    pub id: EntityId,
    pub class: String,
    pub state: EntityState,
    pub position: (f64, f64),
    pub current_resource: Option<ResourceId>,
    pub creation_time: SimTime,
}

/// Snapshot of one resource for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualResource {
    pub id: ResourceId,
    pub name: String,
    pub position: (f64, f64),
    pub capacity: u32,
    pub current_load: u32,
    pub queue_length: u64,
    pub utilization_percent: f64,
}

impl Kernel {
    /// Supplies resource positions; un-placed resources stay on the grid.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = Some(layout);
    }

    fn resource_position(&self, resource: &ResourceId) -> (f64, f64) {
        if let Some(position) = self.layout.as_ref().and_then(|l| l.position(resource)) {
            return position;
        }
        // Default: resources on a grid in declaration (id) order.
        let index = self
            .resources()
            .position(|r| &r.id == resource)
            .unwrap_or(0);
        let column = index % GRID_COLUMNS;
        let row = index / GRID_COLUMNS;
        (
            GRID_ORIGIN.0 + column as f64 * GRID_SPACING.0,
            GRID_ORIGIN.1 + row as f64 * GRID_SPACING.1,
        )
    }

    /// Per-entity render snapshots, in id order.
    pub fn visual_entities(&self) -> Vec<VisualEntity> {
        self.active_entities()
            .into_iter()
            .map(|entity| {
                let position = match &entity.current_resource {
                    Some(resource_id) => {
                        let base = self.resource_position(resource_id);
                        let queue_index = self
                            .get_resource(resource_id)
                            .and_then(|r| r.queue.iter().position(|id| id == &entity.id));
                        match queue_index {
                            // Waiting entities fan out to the left of
                            // their station.
                            Some(index) => {
                                (base.0 - QUEUE_SPACING * (index as f64 + 1.0), base.1)
                            }
                            None => base,
                        }
                    }
                    None => GRID_ORIGIN,
                };
                VisualEntity {
                    id: entity.id.clone(),
                    class: entity.class.clone(),
                    state: entity.state,
                    position,
                    current_resource: entity.current_resource.clone(),
                    creation_time: entity.created_at,
                }
            })
            .collect()
    }

    /// Per-resource render snapshots, in id order.
    pub fn visual_resources(&self) -> Vec<VisualResource> {
        let now = self.now();
        self.resources()
            .map(|resource| VisualResource {
                id: resource.id.clone(),
                name: resource.name.clone(),
                position: self.resource_position(&resource.id),
                capacity: resource.capacity,
                current_load: resource.current_load,
                queue_length: resource.queue.len() as u64,
                utilization_percent: resource.utilization(now) * 100.0,
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
