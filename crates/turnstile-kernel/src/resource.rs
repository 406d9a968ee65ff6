//! Finite-capacity resources.

use std::collections::{BTreeSet, VecDeque};

use turnstile_rng::Distribution;
use turnstile_types::{EntityId, ResourceId, SimTime};

/// A service station with `capacity` parallel servers and a FIFO queue.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub capacity: u32,
    /// Units currently in use; always equals `in_service.len()`.
    pub current_load: u32,
    /// Entities waiting for a server, in arrival order.
    pub queue: VecDeque<EntityId>,
    /// Entities currently being served (unordered).
    pub in_service: BTreeSet<EntityId>,
    /// Cumulative server-minutes of service delivered.
    pub busy_time: f64,
    pub last_change: SimTime,
    /// Service time used when a routed entity carries no distribution of
    /// its own.
    pub default_service: Option<Distribution>,
}

impl Resource {
    pub fn new(id: ResourceId, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
            current_load: 0,
            queue: VecDeque::new(),
            in_service: BTreeSet::new(),
            busy_time: 0.0,
            last_change: SimTime::ZERO,
            default_service: None,
        }
    }

    pub fn has_idle_capacity(&self) -> bool {
        self.current_load < self.capacity
    }

    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    /// Fraction of total server-minutes spent busy since time zero.
    pub fn utilization(&self, now: SimTime) -> f64 {
        let elapsed = now.as_minutes();
        if elapsed > 0.0 && self.capacity > 0 {
            self.busy_time / (elapsed * f64::from(self.capacity))
        } else {
            0.0
        }
    }

    /// Returns a description of the first violated structural invariant,
    /// if any: load/in-service agreement, capacity bound, and
    /// queue/in-service disjointness.
    pub fn invariant_violation(&self) -> Option<String> {
        if self.current_load as usize != self.in_service.len() {
            return Some(format!(
                "resource {}: current_load {} != in_service {}",
                self.id,
                self.current_load,
                self.in_service.len()
            ));
        }
        if self.current_load > self.capacity {
            return Some(format!(
                "resource {}: current_load {} exceeds capacity {}",
                self.id, self.current_load, self.capacity
            ));
        }
        if let Some(both) = self.queue.iter().find(|id| self.in_service.contains(*id)) {
            return Some(format!(
                "resource {}: entity {both} is both queued and in service",
                self.id
            ));
        }
        None
    }

    /// Drops all dynamic state, keeping identity, capacity, and the
    /// default service time.
    pub fn reset(&mut self) {
        self.current_load = 0;
        self.queue.clear();
        self.in_service.clear();
        self.busy_time = 0.0;
        self.last_change = SimTime::ZERO;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(capacity: u32) -> Resource {
        Resource::new(ResourceId::new("till"), "Till", capacity)
    }

    #[test]
    fn utilization_is_busy_over_capacity_minutes() {
        let mut r = resource(2);
        r.busy_time = 30.0;
        assert_eq!(r.utilization(SimTime::from_minutes(60.0)), 0.25);
        assert_eq!(r.utilization(SimTime::ZERO), 0.0);
    }

    #[test]
    fn invariants_catch_load_mismatch() {
        let mut r = resource(2);
        r.current_load = 1;
        assert!(r.invariant_violation().unwrap().contains("current_load"));

        r.in_service.insert(EntityId::generate("c", 1));
        assert!(r.invariant_violation().is_none());
    }

    #[test]
    fn invariants_catch_queue_service_overlap() {
        let mut r = resource(2);
        let id = EntityId::generate("c", 1);
        r.queue.push_back(id.clone());
        r.in_service.insert(id);
        r.current_load = 1;
        assert!(r.invariant_violation().unwrap().contains("both queued"));
    }

    #[test]
    fn reset_keeps_identity_and_default_service() {
        let mut r = resource(3);
        r.default_service = Some(Distribution::Constant { value: 1.0 });
        r.current_load = 2;
        r.busy_time = 12.0;
        r.queue.push_back(EntityId::generate("c", 1));
        r.reset();
        assert_eq!(r.current_load, 0);
        assert_eq!(r.busy_time, 0.0);
        assert!(r.queue.is_empty());
        assert_eq!(r.capacity, 3);
        assert!(r.default_service.is_some());
    }
}
