//! Events and their total order.

use std::cmp::Ordering;
use std::fmt;

use turnstile_rng::Distribution;
use turnstile_types::{EntityId, EventSeq, ResourceId, SimTime, StageId};

use crate::kernel::Kernel;

/// The closed set of things that can happen in a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Arrival,
    StartService,
    EndService,
    Departure,
    ResourceAvailable,
    StateChange,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Arrival => "arrival",
            EventKind::StartService => "start_service",
            EventKind::EndService => "end_service",
            EventKind::Departure => "departure",
            EventKind::ResourceAvailable => "resource_available",
            EventKind::StateChange => "state_change",
        };
        write!(f, "{name}")
    }
}

/// A user-supplied idempotent state update, run when its `StateChange`
/// event is dispatched.
pub type StateChangeFn = Box<dyn FnOnce(&mut Kernel)>;

/// Per-kind event data.
pub enum EventPayload {
    None,
    /// Everything an arrival needs so that `StartService` requires no
    /// further lookups: the class, the entry stage of its flow, that
    /// stage's resource, and its service-time distribution.
    Arrival {
        class: String,
        /// Index of the arrival source to ask for the successor arrival;
        /// absent for manually scheduled arrivals.
        class_index: Option<usize>,
        first_stage: Option<StageId>,
        first_resource: Option<ResourceId>,
        service: Option<Distribution>,
    },
    /// The distribution to sample the service duration from.
    ServiceStart { distribution: Distribution },
    /// The sampled duration, carried so `EndService` can credit busy time
    /// without re-deriving it.
    ServiceEnd { duration: f64 },
    /// Extension hook.
    StateChange(StateChangeFn),
}

impl fmt::Debug for EventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventPayload::None => write!(f, "None"),
            EventPayload::Arrival { class, .. } => write!(f, "Arrival({class})"),
            EventPayload::ServiceStart { distribution } => {
                write!(f, "ServiceStart({distribution:?})")
            }
            EventPayload::ServiceEnd { duration } => write!(f, "ServiceEnd({duration})"),
            EventPayload::StateChange(_) => write!(f, "StateChange(..)"),
        }
    }
}

/// One scheduled occurrence.
///
/// Events are owned by the calendar and consumed by dispatch. The total
/// order is `(time, sequence)` ascending; `sequence` is assigned by the
/// kernel at schedule time, so equal-time events leave the calendar in
/// insertion order. Times are never compared for equality.
#[derive(Debug)]
pub struct Event {
    pub time: SimTime,
    pub kind: EventKind,
    pub sequence: EventSeq,
    pub entity: Option<EntityId>,
    pub resource: Option<ResourceId>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(time: SimTime, kind: EventKind) -> Self {
        Self {
            time,
            kind,
            sequence: EventSeq::default(),
            entity: None,
            resource: None,
            payload: EventPayload::None,
        }
    }

    pub fn arrival(
        time: SimTime,
        class: impl Into<String>,
        class_index: Option<usize>,
        first_stage: Option<StageId>,
        first_resource: Option<ResourceId>,
        service: Option<Distribution>,
    ) -> Self {
        Self {
            payload: EventPayload::Arrival {
                class: class.into(),
                class_index,
                first_stage,
                first_resource,
                service,
            },
            ..Self::new(time, EventKind::Arrival)
        }
    }

    pub fn start_service(
        time: SimTime,
        entity: EntityId,
        resource: ResourceId,
        distribution: Distribution,
    ) -> Self {
        Self {
            entity: Some(entity),
            resource: Some(resource),
            payload: EventPayload::ServiceStart { distribution },
            ..Self::new(time, EventKind::StartService)
        }
    }

    pub fn end_service(
        time: SimTime,
        entity: EntityId,
        resource: ResourceId,
        duration: f64,
    ) -> Self {
        Self {
            entity: Some(entity),
            resource: Some(resource),
            payload: EventPayload::ServiceEnd { duration },
            ..Self::new(time, EventKind::EndService)
        }
    }

    pub fn departure(time: SimTime, entity: EntityId) -> Self {
        Self {
            entity: Some(entity),
            ..Self::new(time, EventKind::Departure)
        }
    }

    pub fn resource_available(time: SimTime, resource: ResourceId) -> Self {
        Self {
            resource: Some(resource),
            ..Self::new(time, EventKind::ResourceAvailable)
        }
    }

    pub fn state_change(time: SimTime, update: StateChangeFn) -> Self {
        Self {
            payload: EventPayload::StateChange(update),
            ..Self::new(time, EventKind::StateChange)
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        // Sequence numbers are unique, so distinct events never compare
        // equal; this exists only to satisfy the Ord bound.
        self.sequence == other.sequence && self.time.total_cmp(&other.time) == Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_by_time_then_sequence() {
        let mut early = Event::new(SimTime::from_minutes(1.0), EventKind::Arrival);
        early.sequence = EventSeq::new(5);
        let mut late = Event::new(SimTime::from_minutes(2.0), EventKind::Arrival);
        late.sequence = EventSeq::new(1);
        assert!(early < late);

        let mut first = Event::new(SimTime::from_minutes(1.0), EventKind::Departure);
        first.sequence = EventSeq::new(1);
        let mut second = Event::new(SimTime::from_minutes(1.0), EventKind::Departure);
        second.sequence = EventSeq::new(2);
        assert!(first < second);
    }

    #[test]
    fn distinct_sequences_never_compare_equal() {
        let mut a = Event::new(SimTime::from_minutes(3.0), EventKind::Arrival);
        a.sequence = EventSeq::new(10);
        let mut b = Event::new(SimTime::from_minutes(3.0), EventKind::Arrival);
        b.sequence = EventSeq::new(11);
        assert_ne!(a, b);
    }

    #[test]
    fn kind_display_names_are_stable() {
        assert_eq!(EventKind::StartService.to_string(), "start_service");
        assert_eq!(EventKind::ResourceAvailable.to_string(), "resource_available");
    }
}
