//! Arrival generation.
//!
//! Each entity class gets one [`ArrivalSource`]: a state machine the
//! kernel asks for the next arrival after dispatching the previous one.
//! The calendar therefore holds at most one pending arrival per class at
//! a time, and the stream of arrivals is bounded only by the run horizon.
//! Scheduled lists behave identically: the source hands out the absolute
//! times one by one.

use turnstile_model::{ArrivalPattern, ArrivalPlan, AttributeSeed, Flow, RateWindow};
use turnstile_rng::{Distribution, Mt19937};
use turnstile_types::{ResourceId, SimTime, StageId};

use crate::event::Event;

/// Per-class arrival state machine.
#[derive(Debug, Clone)]
pub struct ArrivalSource {
    class: String,
    class_index: usize,
    first_stage: Option<StageId>,
    first_resource: Option<ResourceId>,
    first_service: Option<Distribution>,
    attributes: Vec<(String, AttributeSeed)>,
    pattern: Pattern,
}

#[derive(Debug, Clone)]
enum Pattern {
    Poisson {
        rate_per_minute: f64,
        max_arrivals: Option<u64>,
        generated: u64,
    },
    NonHomogeneous {
        windows: Vec<RateWindow>,
        cursor: f64,
    },
    Scheduled {
        times_min: Vec<f64>,
        next_index: usize,
    },
    /// Unrecognized pattern kind; produces no arrivals.
    Unsupported { kind: String },
}

impl ArrivalSource {
    /// Builds the source for one class, wiring in the entry stage of the
    /// class's flow so every arrival event is self-sufficient.
    pub fn from_plan(plan: &ArrivalPlan, flow: Option<&Flow>) -> Self {
        let entry = flow.and_then(|f| f.stage(&f.first_stage));
        Self {
            class: plan.class.clone(),
            class_index: plan.class_index,
            first_stage: entry.map(|stage| stage.id.clone()),
            first_resource: entry.map(|stage| stage.resource.clone()),
            first_service: entry.and_then(|stage| stage.service.clone()),
            attributes: plan.attributes.clone(),
            pattern: match &plan.pattern {
                ArrivalPattern::Poisson {
                    rate_per_minute,
                    max_arrivals,
                } => Pattern::Poisson {
                    rate_per_minute: *rate_per_minute,
                    max_arrivals: *max_arrivals,
                    generated: 0,
                },
                ArrivalPattern::NonHomogeneousPoisson { windows } => Pattern::NonHomogeneous {
                    windows: windows.clone(),
                    cursor: 0.0,
                },
                ArrivalPattern::Scheduled { times_min } => Pattern::Scheduled {
                    times_min: times_min.clone(),
                    next_index: 0,
                },
                ArrivalPattern::Unsupported { kind } => Pattern::Unsupported { kind: kind.clone() },
            },
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    /// The class's declared user attributes.
    pub fn attributes(&self) -> &[(String, AttributeSeed)] {
        &self.attributes
    }

    /// The unsupported pattern kind, when this source can never produce.
    pub fn unsupported_kind(&self) -> Option<&str> {
        match &self.pattern {
            Pattern::Unsupported { kind } => Some(kind),
            _ => None,
        }
    }

    /// The time of the next arrival at or after `from`, advancing the
    /// source's internal state. `None` when the pattern is exhausted.
    pub fn next_arrival(&mut self, from: SimTime, rng: &mut Mt19937) -> Option<SimTime> {
        match &mut self.pattern {
            Pattern::Poisson {
                rate_per_minute,
                max_arrivals,
                generated,
            } => {
                if *rate_per_minute <= 0.0 {
                    return None;
                }
                if let Some(cap) = max_arrivals {
                    if *generated >= *cap {
                        return None;
                    }
                }
                let u = rng.next_f64();
                let gap = -(1.0 - u).ln() / *rate_per_minute;
                *generated += 1;
                Some(from + gap)
            }
            Pattern::NonHomogeneous { windows, cursor } => {
                *cursor = cursor.max(from.as_minutes());
                loop {
                    let active = windows
                        .iter()
                        .find(|w| w.start_min <= *cursor && *cursor < w.end_min);
                    let window = match active {
                        Some(w) => *w,
                        None => {
                            // Jump to the next window, or halt if none remain.
                            let upcoming = windows
                                .iter()
                                .filter(|w| w.start_min > *cursor)
                                .min_by(|a, b| a.start_min.total_cmp(&b.start_min))?;
                            *cursor = upcoming.start_min;
                            *upcoming
                        }
                    };
                    let rate_per_minute = window.rate_per_hour / 60.0;
                    if rate_per_minute <= 0.0 {
                        *cursor = window.end_min;
                        continue;
                    }
                    let u = rng.next_f64();
                    let candidate = *cursor + (-(1.0 - u).ln() / rate_per_minute);
                    if candidate < window.end_min {
                        *cursor = candidate;
                        return Some(SimTime::from_minutes(candidate));
                    }
                    // The draw overshot this window; memorylessness lets
                    // the next window start fresh.
                    *cursor = window.end_min;
                }
            }
            Pattern::Scheduled {
                times_min,
                next_index,
            } => {
                let time = *times_min.get(*next_index)?;
                *next_index += 1;
                Some(SimTime::from_minutes(time))
            }
            Pattern::Unsupported { .. } => None,
        }
    }

    /// The arrival event for this class at `time`.
    pub fn arrival_event(&self, time: SimTime) -> Event {
        Event::arrival(
            time,
            self.class.clone(),
            Some(self.class_index),
            self.first_stage.clone(),
            self.first_resource.clone(),
            self.first_service.clone(),
        )
    }

    /// Rewinds the source to its initial state.
    pub fn reset(&mut self) {
        match &mut self.pattern {
            Pattern::Poisson { generated, .. } => *generated = 0,
            Pattern::NonHomogeneous { cursor, .. } => *cursor = 0.0,
            Pattern::Scheduled { next_index, .. } => *next_index = 0,
            Pattern::Unsupported { .. } => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
