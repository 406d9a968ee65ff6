//! Named independent random-number streams.
//!
//! A [`StreamManager`] owns one [`Mt19937`] per stream id, each seeded
//! `fnv1a_32(stream_id) XOR base_seed`. FNV-1a is fixed here as the
//! portable hash: `std`'s `DefaultHasher` is documented to change between
//! releases, which would silently break cross-version reproducibility.
//!
//! # Stream naming
//!
//! The kernel draws from `"main"`; each entity class has its own
//! `"arrivals_<class_index>"` stream; replications derive their base seed
//! from `"replication-<n>"`; model processes may claim `"process-<name>"`.
//! Keeping draws on separate streams means changing the arrival pattern of
//! one class never perturbs another class's sample path.
//!
//! # Variance reduction
//!
//! Two managers built with the same base seed produce identical sequences
//! for identical stream ids, which is the common-random-numbers setup for
//! comparing system configurations against the same stochastic load. For
//! antithetic pairs, wrap a stream in [`Antithetic`] to receive `1 − u`
//! for every `u` the paired run consumed.

use std::collections::HashMap;

use crate::Mt19937;

/// Stream used by the kernel for distribution sampling and routing draws.
pub const MAIN_STREAM: &str = "main";

/// Stream id for the arrival generator of the class at `class_index`.
pub fn arrivals_stream(class_index: usize) -> String {
    format!("arrivals_{class_index}")
}

/// Stream id from which replication `n` derives its base seed.
pub fn replication_stream(n: usize) -> String {
    format!("replication-{n}")
}

/// Stream id reserved for the named model process.
pub fn process_stream(name: &str) -> String {
    format!("process-{name}")
}

/// 32-bit FNV-1a over the UTF-8 bytes of `s`.
pub fn fnv1a_32(s: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in s.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

// ============================================================================
// Stream Manager
// ============================================================================

/// Maps stream ids to independent, reproducibly seeded generators.
#[derive(Debug)]
pub struct StreamManager {
    base_seed: u32,
    streams: HashMap<String, Mt19937>,
}

impl StreamManager {
    /// Creates a manager; streams are materialized lazily on first use.
    pub fn new(base_seed: u32) -> Self {
        Self {
            base_seed,
            streams: HashMap::new(),
        }
    }

    /// The base seed all stream seeds are derived from.
    pub fn base_seed(&self) -> u32 {
        self.base_seed
    }

    /// The seed a stream id resolves to under `base_seed`.
    pub fn seed_for(base_seed: u32, stream_id: &str) -> u32 {
        fnv1a_32(stream_id) ^ base_seed
    }

    /// Borrows the generator for `stream_id`, creating it on first use.
    pub fn stream(&mut self, stream_id: &str) -> &mut Mt19937 {
        let base_seed = self.base_seed;
        self.streams
            .entry(stream_id.to_string())
            .or_insert_with(|| Mt19937::new(Self::seed_for(base_seed, stream_id)))
    }

    /// Re-seeds every materialized stream back to its first output.
    pub fn reset(&mut self) {
        let base_seed = self.base_seed;
        for (id, stream) in &mut self.streams {
            *stream = Mt19937::new(Self::seed_for(base_seed, id));
        }
    }

    /// A fresh manager with the same base seed.
    ///
    /// For common random numbers across system configurations: give each
    /// configuration its own companion manager and draw the same stream
    /// ids for the same purposes, and every configuration faces the same
    /// stochastic load.
    pub fn crn_companion(&self) -> StreamManager {
        StreamManager::new(self.base_seed)
    }

    /// The base seed for replication `n`: `base ⊕ fnv1a("replication-<n>")`.
    pub fn replication_seed(&self, n: usize) -> u32 {
        Self::seed_for(self.base_seed, &replication_stream(n))
    }
}

// ============================================================================
// Antithetic Draws
// ============================================================================

/// Yields `1 − u` for every uniform `u` the wrapped stream produces.
///
/// Running one replication on a stream and a second on its antithetic
/// wrapper induces negative correlation between the pair, which shrinks
/// the variance of the pair's mean.
#[derive(Debug)]
pub struct Antithetic<'a> {
    inner: &'a mut Mt19937,
}

impl<'a> Antithetic<'a> {
    pub fn new(inner: &'a mut Mt19937) -> Self {
        Self { inner }
    }

    /// Antithetic uniform in `(0, 1]`.
    pub fn next_f64(&mut self) -> f64 {
        1.0 - self.inner.next_f64()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_reference_values() {
        // Offset basis and the classic single-byte vector.
        assert_eq!(fnv1a_32(""), 0x811c_9dc5);
        assert_eq!(fnv1a_32("a"), 0xe40c_292c);
    }

    #[test]
    fn same_base_seed_and_id_reproduce_the_sequence() {
        let mut first = StreamManager::new(9001);
        let mut second = StreamManager::new(9001);
        for _ in 0..500 {
            assert_eq!(
                first.stream("arrivals_0").next_u32(),
                second.stream("arrivals_0").next_u32()
            );
        }
    }

    #[test]
    fn distinct_ids_are_independent() {
        let mut streams = StreamManager::new(9001);
        let main: Vec<u32> = (0..100).map(|_| streams.stream(MAIN_STREAM).next_u32()).collect();
        let arrivals: Vec<u32> = (0..100)
            .map(|_| streams.stream(&arrivals_stream(0)).next_u32())
            .collect();
        assert_ne!(main, arrivals);
    }

    #[test]
    fn interleaving_does_not_perturb_either_stream() {
        let mut interleaved = StreamManager::new(7);
        let mut isolated = StreamManager::new(7);

        let mut main_draws = Vec::new();
        for i in 0..200 {
            main_draws.push(interleaved.stream(MAIN_STREAM).next_u32());
            if i % 3 == 0 {
                interleaved.stream(&arrivals_stream(1)).next_u32();
            }
        }

        for want in main_draws {
            assert_eq!(isolated.stream(MAIN_STREAM).next_u32(), want);
        }
    }

    #[test]
    fn reset_restores_every_stream() {
        let mut streams = StreamManager::new(321);
        let a0 = streams.stream("a").next_u32();
        let b0 = streams.stream("b").next_u32();
        streams.stream("a").next_u32();

        streams.reset();
        assert_eq!(streams.stream("a").next_u32(), a0);
        assert_eq!(streams.stream("b").next_u32(), b0);
    }

    #[test]
    fn crn_companion_faces_identical_load() {
        let mut config_a = StreamManager::new(555);
        let mut config_b = config_a.crn_companion();
        for _ in 0..100 {
            assert_eq!(
                config_a.stream(&arrivals_stream(0)).next_f64(),
                config_b.stream(&arrivals_stream(0)).next_f64()
            );
        }
    }

    #[test]
    fn replication_seeds_differ_per_index() {
        let streams = StreamManager::new(100);
        let seeds: Vec<u32> = (0..10).map(|n| streams.replication_seed(n)).collect();
        let mut deduped = seeds.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(seeds.len(), deduped.len());
    }

    #[test]
    fn antithetic_pairs_sum_to_one() {
        let mut stream = Mt19937::new(42);
        let plain: Vec<f64> = (0..50).map(|_| stream.next_f64()).collect();

        let mut stream = Mt19937::new(42);
        let mut anti = Antithetic::new(&mut stream);
        for u in plain {
            let complement = anti.next_f64();
            assert!((u + complement - 1.0).abs() < 1e-12);
        }
    }
}
