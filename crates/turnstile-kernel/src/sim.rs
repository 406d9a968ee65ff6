//! The simulation driver: compiled model → configured kernel → summary.

use std::collections::BTreeMap;

use turnstile_model::{compile, CompiledModel, ModelDescription, ModelError};
use turnstile_stats::{Tally, TallySummary};
use turnstile_types::SimTime;

use crate::arrivals::ArrivalSource;
use crate::error::SimError;
use crate::kernel::Kernel;
use crate::routing::FlowEngine;
use crate::summary::StatisticsSummary;

// ============================================================================
// Simulation
// ============================================================================

/// One kernel wired up from a compiled model: resources declared, the
/// flow engine installed, arrival sources primed.
pub struct Simulation {
    kernel: Kernel,
    run_length: SimTime,
    warmup: SimTime,
}

impl Simulation {
    /// Compiles the model and builds a simulation from it.
    pub fn from_model(model: &ModelDescription) -> Result<Self, ModelError> {
        let compiled = compile(model)?;
        Ok(Self::from_compiled(&compiled))
    }

    /// Builds a simulation with the model's own seed.
    pub fn from_compiled(compiled: &CompiledModel) -> Self {
        Self::with_seed(compiled, compiled.base_seed)
    }

    /// Builds a simulation with an explicit seed (replications derive
    /// theirs from the base seed).
    pub fn with_seed(compiled: &CompiledModel, seed: u32) -> Self {
        let mut kernel = Kernel::new(seed);
        for resource in &compiled.resources {
            kernel.add_resource_with_default(
                resource.id.clone(),
                resource.name.clone(),
                resource.capacity,
                resource.processing_time.clone(),
            );
        }
        FlowEngine::new(compiled.flows.clone()).install(&mut kernel);

        let sources: Vec<ArrivalSource> = compiled
            .arrivals
            .iter()
            .map(|plan| ArrivalSource::from_plan(plan, compiled.flows.get(&plan.class)))
            .collect();
        kernel
            .install_arrival_sources(sources)
            .expect("priming arrivals at time zero cannot schedule into the past");

        Self {
            kernel,
            run_length: SimTime::from_minutes(compiled.run_length_minutes),
            warmup: SimTime::from_minutes(compiled.warmup_minutes),
        }
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut Kernel {
        &mut self.kernel
    }

    pub fn run_length(&self) -> SimTime {
        self.run_length
    }

    pub fn warmup(&self) -> SimTime {
        self.warmup
    }

    /// Runs to the model's horizon and returns the summary.
    pub fn run_to_completion(&mut self) -> Result<StatisticsSummary, SimError> {
        self.kernel.run(self.run_length, self.warmup)?;
        Ok(self.kernel.get_statistics())
    }
}

// ============================================================================
// Replications
// ============================================================================

/// A replication that aborted, with the seed to reproduce it.
#[derive(Debug)]
pub struct ReplicationFailure {
    pub replication: usize,
    pub seed: u32,
    pub error: SimError,
}

/// Cross-replication output: per-run summaries plus across-run
/// aggregates of the key point estimates.
#[derive(Debug)]
pub struct ReplicationSummary {
    pub runs: Vec<StatisticsSummary>,
    pub failures: Vec<ReplicationFailure>,
    /// Across-replication statistics of each tally's per-run mean.
    pub tally_means: BTreeMap<String, TallySummary>,
    /// Across-replication statistics of each signal's per-run time
    /// average.
    pub time_average_means: BTreeMap<String, TallySummary>,
}

impl ReplicationSummary {
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs independent replications of one model.
///
/// Replication `n` is seeded `base ⊕ fnv1a("replication-<n>")`, shares
/// no mutable state with any other, and its statistics are merged only
/// after every replication has completed.
pub struct ReplicationRunner {
    compiled: CompiledModel,
    replications: u32,
}

impl ReplicationRunner {
    pub fn new(compiled: CompiledModel) -> Self {
        let replications = compiled.replications;
        Self {
            compiled,
            replications,
        }
    }

    pub fn with_replications(mut self, replications: u32) -> Self {
        self.replications = replications.max(1);
        self
    }

    /// The seed replication `n` runs under.
    pub fn replication_seed(&self, n: usize) -> u32 {
        turnstile_rng::StreamManager::new(self.compiled.base_seed).replication_seed(n)
    }

    pub fn run(&self) -> ReplicationSummary {
        let mut runs = Vec::new();
        let mut failures = Vec::new();

        for n in 0..self.replications as usize {
            let seed = self.replication_seed(n);
            let mut simulation = Simulation::with_seed(&self.compiled, seed);
            match simulation.run_to_completion() {
                Ok(summary) => runs.push(summary),
                // A failed replication surfaces its error without
                // poisoning the others.
                Err(error) => failures.push(ReplicationFailure {
                    replication: n,
                    seed,
                    error,
                }),
            }
        }

        let mut tally_means: BTreeMap<String, Tally> = BTreeMap::new();
        let mut time_average_means: BTreeMap<String, Tally> = BTreeMap::new();
        for run in &runs {
            for (name, tally) in &run.tally {
                tally_means.entry(name.clone()).or_default().record(tally.mean);
            }
            for (name, stat) in &run.time_persistent {
                time_average_means
                    .entry(name.clone())
                    .or_default()
                    .record(stat.time_average);
            }
        }

        ReplicationSummary {
            runs,
            failures,
            tally_means: tally_means
                .into_iter()
                .map(|(name, tally)| (name, tally.summary()))
                .collect(),
            time_average_means: time_average_means
                .into_iter()
                .map(|(name, tally)| (name, tally.summary()))
                .collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
