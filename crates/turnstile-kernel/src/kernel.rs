//! The simulation kernel: clock, dispatcher, and state tables.

use std::collections::BTreeMap;

use turnstile_model::AttributeSeed;
use turnstile_rng::{arrivals_stream, Distribution, StreamManager, MAIN_STREAM};
use turnstile_stats::StatisticsRegistry;
use turnstile_types::{EntityId, EntityState, EventSeq, ResourceId, SimTime};

use crate::arrivals::ArrivalSource;
use crate::calendar::EventCalendar;
use crate::entity::{AttributeValue, Entity};
use crate::error::{Diagnostic, SimError};
use crate::event::{Event, EventKind, EventPayload};
use crate::resource::Resource;
use crate::summary::{ResourceSummary, SimulationSummary, StatisticsSummary};
use crate::trace::{TraceEntry, TraceLog};
use crate::visual::Layout;

/// Tolerance for the per-entity timing-sum invariant.
const TIMING_TOLERANCE: f64 = 1e-3;

/// Standard statistics created at kernel init.
const ENTITY_WAIT_TIME: &str = "entity_wait_time";
const ENTITY_CYCLE_TIME: &str = "entity_cycle_time";
const ENTITY_SERVICE_TIME: &str = "entity_service_time";
const ENTITIES_IN_SYSTEM: &str = "entities_in_system";
const ENTITIES_WAITING: &str = "entities_waiting";

fn utilization_stat(resource: &ResourceId) -> String {
    format!("resource_{resource}_utilization")
}

fn queue_length_stat(resource: &ResourceId) -> String {
    format!("resource_{resource}_queue_length")
}

/// Callback invoked when a service completes, before the departure
/// default. The routing engine installs one to take over next-stage
/// selection.
pub type ServiceCompleteFn = Box<dyn FnMut(&mut Kernel, &EntityId, &ResourceId)>;

/// Outcome of a [`Kernel::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The clock advanced; more events may remain.
    Advanced,
    /// The calendar is empty; the clock did not move and will not.
    Complete,
}

// ============================================================================
// Kernel
// ============================================================================

/// The discrete-event simulation kernel.
///
/// Owns the calendar, the clock, the live-entity and resource tables,
/// the statistics registry, and the RNG stream manager. Single-threaded;
/// each event is dispatched atomically.
pub struct Kernel {
    calendar: EventCalendar,
    now: SimTime,
    warmup: SimTime,
    warmup_applied: bool,
    event_count: u64,
    next_sequence: EventSeq,
    entities: BTreeMap<EntityId, Entity>,
    resources: BTreeMap<ResourceId, Resource>,
    class_counters: BTreeMap<String, u64>,
    entities_created: u64,
    entities_departed: u64,
    stats: StatisticsRegistry,
    streams: StreamManager,
    trace: TraceLog,
    diagnostics: Vec<Diagnostic>,
    arrival_sources: Vec<ArrivalSource>,
    class_attributes: BTreeMap<String, Vec<(String, AttributeValue)>>,
    on_service_complete: Option<ServiceCompleteFn>,
    pub(crate) layout: Option<Layout>,
}

impl Kernel {
    /// Constructs a kernel with the given base seed.
    pub fn new(seed: u32) -> Self {
        let mut stats = StatisticsRegistry::new();
        stats.register_tally(ENTITY_WAIT_TIME);
        stats.register_tally(ENTITY_CYCLE_TIME);
        stats.register_tally(ENTITY_SERVICE_TIME);
        stats.register_time_persistent(ENTITIES_IN_SYSTEM);
        stats.register_time_persistent(ENTITIES_WAITING);

        Self {
            calendar: EventCalendar::new(),
            now: SimTime::ZERO,
            warmup: SimTime::ZERO,
            warmup_applied: false,
            event_count: 0,
            next_sequence: EventSeq::default(),
            entities: BTreeMap::new(),
            resources: BTreeMap::new(),
            class_counters: BTreeMap::new(),
            entities_created: 0,
            entities_departed: 0,
            stats,
            streams: StreamManager::new(seed),
            trace: TraceLog::new(),
            diagnostics: Vec::new(),
            arrival_sources: Vec::new(),
            class_attributes: BTreeMap::new(),
            on_service_complete: None,
            layout: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn entities_created(&self) -> u64 {
        self.entities_created
    }

    pub fn entities_departed(&self) -> u64 {
        self.entities_departed
    }

    /// True when no pending events remain.
    pub fn is_complete(&self) -> bool {
        self.calendar.is_empty()
    }

    pub fn pending_events(&self) -> usize {
        self.calendar.len()
    }

    pub fn get_entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_entity_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn get_resource(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Live entities in id order.
    pub fn active_entities(&self) -> Vec<&Entity> {
        self.entities.values().collect()
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn streams_mut(&mut self) -> &mut StreamManager {
        &mut self.streams
    }

    pub fn statistics(&self) -> &StatisticsRegistry {
        &self.stats
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn set_tracing(&mut self, enabled: bool) {
        self.trace.set_enabled(enabled);
    }

    pub fn trace_log(&self) -> &[TraceEntry] {
        self.trace.entries()
    }

    /// Installs the service-completion hand-off (a single function, not
    /// a listener list).
    pub fn set_on_service_complete(&mut self, callback: ServiceCompleteFn) {
        self.on_service_complete = Some(callback);
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Declares a resource and registers its statistics.
    pub fn add_resource(&mut self, id: ResourceId, name: impl Into<String>, capacity: u32) {
        self.add_resource_with_default(id, name, capacity, None);
    }

    /// Declares a resource with a fallback service-time distribution.
    pub fn add_resource_with_default(
        &mut self,
        id: ResourceId,
        name: impl Into<String>,
        capacity: u32,
        default_service: Option<Distribution>,
    ) {
        let mut resource = Resource::new(id.clone(), name, capacity);
        resource.default_service = default_service;
        self.stats.register_time_persistent(&utilization_stat(&id));
        self.stats.register_time_persistent(&queue_length_stat(&id));
        self.resources.insert(id, resource);
    }

    /// Installs per-class arrival sources and primes each one's first
    /// arrival. Sources with unsupported patterns are recorded as
    /// diagnostics and produce nothing.
    pub fn install_arrival_sources(
        &mut self,
        sources: Vec<ArrivalSource>,
    ) -> Result<(), SimError> {
        for source in &sources {
            if let Some(kind) = source.unsupported_kind() {
                tracing::warn!(class = source.class(), kind, "unsupported arrival pattern");
                self.diagnostics.push(Diagnostic::ArrivalUnsupported {
                    class: source.class().to_string(),
                    kind: kind.to_string(),
                });
            }
            if !source.attributes().is_empty() {
                let values = source
                    .attributes()
                    .iter()
                    .map(|(name, seed)| {
                        let value = match seed {
                            AttributeSeed::Number(n) => AttributeValue::Number(*n),
                            AttributeSeed::Text(s) => AttributeValue::Text(s.clone()),
                            AttributeSeed::Flag(b) => AttributeValue::Flag(*b),
                        };
                        (name.clone(), value)
                    })
                    .collect();
                self.class_attributes
                    .insert(source.class().to_string(), values);
            }
        }
        self.arrival_sources = sources;
        for class_index in 0..self.arrival_sources.len() {
            self.schedule_next_arrival(class_index)?;
        }
        Ok(())
    }

    /// Creates a live entity of `class` at the current clock.
    pub fn create_entity(&mut self, class: &str) -> EntityId {
        let counter = self.class_counters.entry(class.to_string()).or_insert(0);
        *counter += 1;
        let id = EntityId::generate(class, *counter);
        let entity = Entity::new(id.clone(), class, self.now);
        self.entities.insert(id.clone(), entity);
        self.entities_created += 1;
        id
    }

    // ------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------

    /// Assigns the event its sequence number and inserts it.
    ///
    /// Scheduling into the past is fatal: it indicates a kernel bug or a
    /// host misuse, never a recoverable condition.
    pub fn schedule(&mut self, mut event: Event) -> Result<(), SimError> {
        if !event.time.is_valid() || event.time < self.now {
            return Err(SimError::SchedulePast {
                kind: event.kind.to_string(),
                event_time: event.time,
                now: self.now,
            });
        }
        event.sequence = self.next_sequence.post_increment();
        self.trace.record(
            self.now,
            "schedule",
            format!("{} at {} {}", event.kind, event.time, event.sequence),
        );
        self.calendar.insert(event);
        Ok(())
    }

    /// Schedules the entity's departure at the current clock.
    pub fn schedule_entity_departure(&mut self, entity_id: &EntityId) -> Result<(), SimError> {
        self.schedule(Event::departure(self.now, entity_id.clone()))
    }

    /// Records a routing failure and sends the entity home instead of
    /// stranding it.
    pub fn route_to_departure_with_warning(
        &mut self,
        entity_id: &EntityId,
        detail: impl Into<String>,
    ) -> Result<(), SimError> {
        let detail = detail.into();
        tracing::warn!(entity = %entity_id, detail = %detail, "routing warning");
        self.diagnostics.push(Diagnostic::RoutingWarning {
            entity: entity_id.clone(),
            detail,
        });
        self.schedule_entity_departure(entity_id)
    }

    // ------------------------------------------------------------------
    // Run Loop
    // ------------------------------------------------------------------

    /// Processes events in time order until the calendar drains or the
    /// next event lies beyond `end_time`.
    ///
    /// An event at exactly `end_time` is dispatched; the first event
    /// strictly beyond it stays on the calendar, which is what makes
    /// incremental stepping deterministic. On an empty calendar the
    /// clock does not advance.
    pub fn run(&mut self, end_time: SimTime, warmup: SimTime) -> Result<(), SimError> {
        self.warmup = warmup;
        loop {
            let Some(next_time) = self.calendar.peek().map(|e| e.time) else {
                // Drained: nothing will ever happen again.
                self.finalize();
                return Ok(());
            };
            if next_time > end_time {
                // Horizon reached; the event stays pending.
                if end_time > self.now {
                    self.now = end_time;
                }
                self.finalize();
                return Ok(());
            }
            let event = self.calendar.extract_min().expect("peeked above");
            debug_assert!(event.time >= self.now, "calendar produced a past event");
            self.apply_warmup_boundary(event.time);
            self.now = event.time;
            self.event_count += 1;
            self.dispatch(event)?;
            self.check_invariants()?;
        }
    }

    /// Advances by `delta` minutes: `run(now + delta)` with the stored
    /// warm-up. Returns [`StepStatus::Complete`] without touching the
    /// clock when the calendar is empty.
    pub fn step(&mut self, delta: f64) -> Result<StepStatus, SimError> {
        if self.calendar.is_empty() {
            self.finalize();
            return Ok(StepStatus::Complete);
        }
        let target = self.now + delta;
        let warmup = self.warmup;
        self.run(target, warmup)?;
        if self.calendar.is_empty() {
            Ok(StepStatus::Complete)
        } else {
            Ok(StepStatus::Advanced)
        }
    }

    /// Restores the kernel to its just-constructed state: clock at zero,
    /// calendar empty except re-primed arrivals, streams re-seeded,
    /// statistics cleared. The same scheduling then reproduces the same
    /// trace.
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.calendar.clear();
        self.now = SimTime::ZERO;
        self.warmup = SimTime::ZERO;
        self.warmup_applied = false;
        self.event_count = 0;
        self.next_sequence = EventSeq::default();
        self.entities.clear();
        self.class_counters.clear();
        self.entities_created = 0;
        self.entities_departed = 0;
        for resource in self.resources.values_mut() {
            resource.reset();
        }
        self.stats.clear();
        self.streams.reset();
        self.trace.clear();
        self.diagnostics.clear();
        for source in &mut self.arrival_sources {
            source.reset();
        }
        for class_index in 0..self.arrival_sources.len() {
            self.schedule_next_arrival(class_index)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    fn dispatch(&mut self, event: Event) -> Result<(), SimError> {
        self.trace.record(
            self.now,
            "dispatch",
            format!("{} {}", event.kind, event.sequence),
        );
        match event.kind {
            EventKind::Arrival => self.dispatch_arrival(event),
            EventKind::StartService => self.dispatch_start_service(event),
            EventKind::EndService => self.dispatch_end_service(event),
            EventKind::Departure => self.dispatch_departure(&event),
            EventKind::ResourceAvailable => {
                if let Some(resource_id) = event.resource {
                    self.try_start_service_at_resource(&resource_id)?;
                }
                Ok(())
            }
            EventKind::StateChange => {
                if let EventPayload::StateChange(update) = event.payload {
                    update(self);
                }
                Ok(())
            }
        }
    }

    fn dispatch_arrival(&mut self, event: Event) -> Result<(), SimError> {
        let EventPayload::Arrival {
            class,
            class_index,
            first_stage,
            first_resource,
            service,
        } = event.payload
        else {
            return Ok(());
        };

        let entity_id = self.create_entity(&class);
        {
            let declared = self.class_attributes.get(&class).cloned().unwrap_or_default();
            let entity = self.entities.get_mut(&entity_id).expect("just created");
            entity.current_stage = first_stage;
            for (name, value) in declared {
                entity.attributes.insert(name, value);
            }
            if let Some(distribution) = service {
                entity.set_service_distribution(distribution);
            }
        }
        self.update_entities_in_system();

        if let Some(resource_id) = first_resource {
            self.route_entity_to_resource(&entity_id, &resource_id)?;
        }

        // The arrival chain: ask this class's source for its successor.
        if let Some(class_index) = class_index {
            self.schedule_next_arrival(class_index)?;
        }
        Ok(())
    }

    fn dispatch_start_service(&mut self, event: Event) -> Result<(), SimError> {
        let (Some(entity_id), Some(resource_id)) = (event.entity, event.resource) else {
            return Ok(());
        };
        let EventPayload::ServiceStart { distribution } = event.payload else {
            return Ok(());
        };

        let now = self.now;
        let warmup_passed = now >= self.warmup;
        let Some(entity) = self.entities.get_mut(&entity_id) else {
            return Ok(());
        };
        // Whatever lifetime is not yet accounted to service or travel
        // was spent waiting.
        let waited = ((now - entity.created_at) - entity.total_processing - entity.total_travel)
            .max(0.0);
        entity.total_wait = waited;
        entity.state = EntityState::Processing;
        if warmup_passed {
            self.stats.record(ENTITY_WAIT_TIME, waited);
        }

        let duration = distribution.sample(self.streams.stream(MAIN_STREAM)).max(0.0);
        self.schedule(Event::end_service(
            now + duration,
            entity_id,
            resource_id,
            duration,
        ))
    }

    fn dispatch_end_service(&mut self, event: Event) -> Result<(), SimError> {
        let (Some(entity_id), Some(resource_id)) = (event.entity, event.resource) else {
            return Ok(());
        };
        let EventPayload::ServiceEnd { duration } = event.payload else {
            return Ok(());
        };

        let warmup_passed = self.now >= self.warmup;
        if let Some(entity) = self.entities.get_mut(&entity_id) {
            entity.total_processing += duration;
        }
        if warmup_passed {
            self.stats.record(ENTITY_SERVICE_TIME, duration);
        }
        if let Some(resource) = self.resources.get_mut(&resource_id) {
            resource.current_load = resource.current_load.saturating_sub(1);
            resource.in_service.remove(&entity_id);
            resource.busy_time += duration;
            resource.last_change = self.now;
        }

        // Routing hand-off; without a router, served entities depart.
        if let Some(mut callback) = self.on_service_complete.take() {
            callback(self, &entity_id, &resource_id);
            if self.on_service_complete.is_none() {
                self.on_service_complete = Some(callback);
            }
        } else {
            self.schedule_entity_departure(&entity_id)?;
        }

        self.try_start_service_at_resource(&resource_id)
    }

    fn dispatch_departure(&mut self, event: &Event) -> Result<(), SimError> {
        let Some(entity_id) = &event.entity else {
            return Ok(());
        };
        if let Some(mut entity) = self.entities.remove(entity_id) {
            entity.state = EntityState::Departed;
            if self.now >= self.warmup {
                self.stats
                    .record(ENTITY_CYCLE_TIME, self.now - entity.created_at);
            }
            self.entities_departed += 1;
            self.update_entities_in_system();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Resource Service Logic
    // ------------------------------------------------------------------

    /// Starts service for queued entities while idle capacity remains.
    pub fn try_start_service_at_resource(
        &mut self,
        resource_id: &ResourceId,
    ) -> Result<(), SimError> {
        loop {
            let now = self.now;
            let Some(resource) = self.resources.get_mut(resource_id) else {
                return Ok(());
            };
            if !resource.has_idle_capacity() || resource.queue.is_empty() {
                return Ok(());
            }
            let entity_id = resource.queue.pop_front().expect("checked non-empty");
            resource.current_load += 1;
            resource.in_service.insert(entity_id.clone());
            resource.last_change = now;
            let queue_length = resource.queue.len() as f64;
            let default_service = resource.default_service.clone();

            let distribution = self
                .entities
                .get(&entity_id)
                .and_then(|e| e.service_distribution().cloned())
                .or(default_service)
                .unwrap_or(Distribution::Constant { value: 0.0 });

            self.stats
                .update(&queue_length_stat(resource_id), now.as_minutes(), queue_length);
            self.update_entities_waiting();
            self.schedule(Event::start_service(
                now,
                entity_id,
                resource_id.clone(),
                distribution,
            ))?;
        }
    }

    /// Appends the entity to the resource's FIFO queue and tries to
    /// start service. Unknown ids are recovered with a routing warning.
    pub fn route_entity_to_resource(
        &mut self,
        entity_id: &EntityId,
        resource_id: &ResourceId,
    ) -> Result<(), SimError> {
        if !self.resources.contains_key(resource_id) {
            return self.route_to_departure_with_warning(
                entity_id,
                format!("unknown resource {resource_id}"),
            );
        }
        let Some(entity) = self.entities.get_mut(entity_id) else {
            tracing::warn!(entity = %entity_id, "route requested for unknown entity");
            return Ok(());
        };
        entity.state = EntityState::Waiting;
        entity.current_resource = Some(resource_id.clone());
        entity.visited.push(resource_id.clone());

        let now = self.now;
        let resource = self.resources.get_mut(resource_id).expect("checked above");
        resource.queue.push_back(entity_id.clone());
        let queue_length = resource.queue.len() as f64;
        self.stats
            .update(&queue_length_stat(resource_id), now.as_minutes(), queue_length);
        self.update_entities_waiting();

        self.try_start_service_at_resource(resource_id)
    }

    // ------------------------------------------------------------------
    // Arrival Chain
    // ------------------------------------------------------------------

    fn schedule_next_arrival(&mut self, class_index: usize) -> Result<(), SimError> {
        let now = self.now;
        let event = {
            let Some(source) = self.arrival_sources.get_mut(class_index) else {
                return Ok(());
            };
            let stream_name = arrivals_stream(class_index);
            let rng = self.streams.stream(&stream_name);
            match source.next_arrival(now, rng) {
                Some(time) => source.arrival_event(time),
                None => return Ok(()),
            }
        };
        self.schedule(event)
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    fn update_entities_in_system(&mut self) {
        self.stats.update(
            ENTITIES_IN_SYSTEM,
            self.now.as_minutes(),
            self.entities.len() as f64,
        );
    }

    fn update_entities_waiting(&mut self) {
        let waiting: usize = self.resources.values().map(Resource::queue_length).sum();
        self.stats
            .update(ENTITIES_WAITING, self.now.as_minutes(), waiting as f64);
    }

    /// When the clock first crosses the warm-up boundary, restart every
    /// time-persistent accumulator so time averages cover only the
    /// measurement window. Tallies simply skip pre-warm-up observations.
    fn apply_warmup_boundary(&mut self, event_time: SimTime) {
        if !self.warmup_applied && self.warmup > SimTime::ZERO && event_time >= self.warmup {
            self.stats
                .restart_time_persistent_at(self.warmup.as_minutes());
            self.warmup_applied = true;
        }
    }

    /// Closes open time-persistent segments and publishes per-resource
    /// utilization. Idempotent at a fixed clock; a later finalization
    /// refreshes the published values.
    fn finalize(&mut self) {
        self.stats.finalize_at(self.now.as_minutes());
        let now = self.now;
        let published: Vec<(String, f64)> = self
            .resources
            .values()
            .map(|r| (utilization_stat(&r.id), r.utilization(now)))
            .collect();
        for (name, utilization) in published {
            self.stats
                .publish_time_persistent(&name, now.as_minutes(), utilization);
        }
    }

    /// The statistics summary record for the current state.
    pub fn get_statistics(&self) -> StatisticsSummary {
        let resources = self
            .resources
            .values()
            .map(|r| {
                (
                    r.id.to_string(),
                    ResourceSummary {
                        name: r.name.clone(),
                        capacity: r.capacity,
                        current_load: r.current_load,
                        queue_length: r.queue.len() as u64,
                        utilization_percent: r.utilization(self.now) * 100.0,
                        total_busy_time: r.busy_time,
                    },
                )
            })
            .collect();

        StatisticsSummary {
            simulation: SimulationSummary {
                current_time: self.now.as_minutes(),
                event_count: self.event_count,
                entities_created: self.entities_created,
                entities_departed: self.entities_departed,
                entities_in_system: self.entities.len() as u64,
            },
            tally: self.stats.tally_summaries(),
            time_persistent: self.stats.time_persistent_summaries(),
            resources,
            diagnostics: self.diagnostics.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    /// Conservation: every created entity is either live or departed.
    pub fn validate_conservation(&self) -> bool {
        self.entities_created == self.entities_departed + self.entities.len() as u64
    }

    fn check_invariants(&self) -> Result<(), SimError> {
        if !self.validate_conservation() {
            return self.invariant_failure(
                "conservation",
                format!(
                    "created {} != departed {} + live {}",
                    self.entities_created,
                    self.entities_departed,
                    self.entities.len()
                ),
            );
        }
        for resource in self.resources.values() {
            if let Some(message) = resource.invariant_violation() {
                return self.invariant_failure("resource_state", message);
            }
        }
        for entity in self.entities.values() {
            if !entity.timing_consistent(self.now, TIMING_TOLERANCE) {
                return self.invariant_failure(
                    "entity_timing",
                    format!(
                        "entity {}: wait {} + processing {} + travel {} exceeds elapsed {}",
                        entity.id,
                        entity.total_wait,
                        entity.total_processing,
                        entity.total_travel,
                        self.now - entity.created_at
                    ),
                );
            }
        }
        if let Some(event) = self.calendar.peek() {
            if event.time < self.now {
                return self.invariant_failure(
                    "calendar_horizon",
                    format!("pending {} at {} behind clock", event.kind, event.time),
                );
            }
        }
        Ok(())
    }

    fn invariant_failure(&self, invariant: &'static str, message: String) -> Result<(), SimError> {
        tracing::error!(invariant, time = %self.now, message = %message, "invariant violated");
        Err(SimError::InvariantViolation {
            invariant,
            time: self.now,
            message,
        })
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("now", &self.now)
            .field("pending_events", &self.calendar.len())
            .field("entities", &self.entities.len())
            .field("resources", &self.resources.len())
            .field("event_count", &self.event_count)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
