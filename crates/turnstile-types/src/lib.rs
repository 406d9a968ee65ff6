//! # turnstile-types: Core types for Turnstile
//!
//! This crate contains shared types used across the Turnstile simulation
//! engine:
//! - Simulation time ([`SimTime`])
//! - Identity types ([`EntityId`], [`ResourceId`], [`StageId`], [`EventSeq`])
//! - Entity lifecycle ([`EntityState`])
//!
//! All identifiers are relational keys into flat tables owned by the kernel;
//! nothing in this crate holds a reference to anything else.

use std::fmt::{self, Display};
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

// ============================================================================
// Simulation Time
// ============================================================================

/// A point on the simulation clock, in minutes.
///
/// Time is a non-negative real. `SimTime` is ordered by `f64::total_cmp`,
/// which gives a total order without ever testing floats for equality; the
/// event calendar breaks ties with an insertion sequence, never with the
/// time value itself.
///
/// # Examples
///
/// ```
/// # use turnstile_types::SimTime;
/// let t = SimTime::from_hours(2.0);
/// assert_eq!(t.as_minutes(), 120.0);
/// assert!(t > SimTime::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct SimTime(f64);

impl SimTime {
    /// The start of every simulation.
    pub const ZERO: SimTime = SimTime(0.0);

    /// Creates a time from simulation minutes.
    pub fn from_minutes(minutes: f64) -> Self {
        Self(minutes)
    }

    /// Creates a time from simulation hours.
    pub fn from_hours(hours: f64) -> Self {
        Self(hours * 60.0)
    }

    /// This time in minutes.
    pub fn as_minutes(self) -> f64 {
        self.0
    }

    /// This time in hours.
    pub fn as_hours(self) -> f64 {
        self.0 / 60.0
    }

    /// True for times that can legally appear on a calendar.
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }

    /// Total-order comparison, usable where `Ord` is required.
    pub fn total_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add<f64> for SimTime {
    type Output = SimTime;

    fn add(self, minutes: f64) -> SimTime {
        SimTime(self.0 + minutes)
    }
}

impl AddAssign<f64> for SimTime {
    fn add_assign(&mut self, minutes: f64) {
        self.0 += minutes;
    }
}

impl Sub for SimTime {
    type Output = f64;

    /// Elapsed minutes between two times.
    fn sub(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }
}

impl Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}min", self.0)
    }
}

impl From<f64> for SimTime {
    fn from(minutes: f64) -> Self {
        Self(minutes)
    }
}

impl From<SimTime> for f64 {
    fn from(t: SimTime) -> Self {
        t.0
    }
}

// ============================================================================
// Event Sequence
// ============================================================================

/// Monotonically increasing insertion counter assigned by the kernel.
///
/// Two events scheduled for the same instant are dispatched in the order
/// they were inserted; `EventSeq` is the tie-breaker that makes the event
/// total order total.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EventSeq(u64);

impl EventSeq {
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Returns this sequence number and advances to the next one.
    pub fn post_increment(&mut self) -> Self {
        let current = *self;
        self.0 += 1;
        current
    }
}

impl Display for EventSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for EventSeq {
    fn from(seq: u64) -> Self {
        Self(seq)
    }
}

impl From<EventSeq> for u64 {
    fn from(seq: EventSeq) -> Self {
        seq.0
    }
}

// ============================================================================
// Identity Types
// ============================================================================

/// Unique identifier for a live entity, of the form `entity_<class>_<n>`.
///
/// # Examples
///
/// ```
/// # use turnstile_types::EntityId;
/// let id = EntityId::generate("customer", 7);
/// assert_eq!(id.as_str(), "entity_customer_7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the canonical id for the `n`-th entity of a class.
    pub fn generate(class: &str, n: u64) -> Self {
        Self(format!("entity_{class}_{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Stable identifier for a resource (a service station).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier for one stage of a process flow.
///
/// A stage is a seize-delay-release triple; its id is the id of the seize
/// step it was compiled from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(String);

impl StageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ============================================================================
// Entity Lifecycle
// ============================================================================

/// Where an entity currently is in its lifecycle.
///
/// Transitions are driven entirely by the kernel's event dispatch:
///
/// ```text
/// Created ──> Waiting ──> Processing ──┬──> Waiting (next stage)
///                                      └──> Departed
/// ```
///
/// `Traveling` and `Blocked` are reachable through model extensions
/// (travel delays, blocking disciplines) and carried here so entity
/// snapshots stay forward-compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    Created,
    Waiting,
    Processing,
    Traveling,
    Departed,
    Blocked,
}

impl Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityState::Created => "created",
            EntityState::Waiting => "waiting",
            EntityState::Processing => "processing",
            EntityState::Traveling => "traveling",
            EntityState::Departed => "departed",
            EntityState::Blocked => "blocked",
        };
        write!(f, "{s}")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_time_unit_conversions() {
        assert_eq!(SimTime::from_hours(1.5).as_minutes(), 90.0);
        assert_eq!(SimTime::from_minutes(30.0).as_hours(), 0.5);
    }

    #[test]
    fn sim_time_ordering_is_total() {
        let a = SimTime::from_minutes(1.0);
        let b = SimTime::from_minutes(2.0);
        assert!(a < b);
        assert!(b > a);
        assert_eq!(a.cmp(&a), std::cmp::Ordering::Equal);
    }

    #[test]
    fn sim_time_arithmetic() {
        let mut t = SimTime::from_minutes(10.0);
        t += 5.0;
        assert_eq!(t.as_minutes(), 15.0);
        assert_eq!(t - SimTime::from_minutes(4.0), 11.0);
    }

    #[test]
    fn sim_time_validity() {
        assert!(SimTime::ZERO.is_valid());
        assert!(!SimTime::from_minutes(-1.0).is_valid());
        assert!(!SimTime::from_minutes(f64::NAN).is_valid());
    }

    #[test]
    fn event_seq_post_increment() {
        let mut seq = EventSeq::default();
        assert_eq!(seq.post_increment(), EventSeq::new(0));
        assert_eq!(seq.post_increment(), EventSeq::new(1));
        assert_eq!(u64::from(seq), 2);
    }

    #[test]
    fn entity_id_canonical_form() {
        let id = EntityId::generate("part", 42);
        assert_eq!(id.as_str(), "entity_part_42");
        assert_eq!(id.to_string(), "entity_part_42");
    }

    #[test]
    fn entity_state_serde_names() {
        let json = serde_json::to_string(&EntityState::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }
}
