//! Random sources for the simulation core
//!
//! Every random decision in the engine is drawn from a single injected
//! [`RandomSource`]. Two implementations ship here: [`ChaChaSource`], a seeded
//! stream used by real games, and [`ScriptedSource`], which replays a fixed list
//! of draws so tests can pin down exact outcomes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A provider of uniform integer draws.
pub trait RandomSource: core::fmt::Debug {
    /// Uniform draw in `0..n`. Implementations must return 0 when `n == 0`.
    fn below(&mut self, n: u32) -> u32;

    /// Seed this source was created from, if it has one.
    fn seed(&self) -> Option<u64> {
        None
    }
}

/// An RNG call trace entry for debugging divergences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngTraceEntry {
    /// Sequence number (0-indexed)
    pub seq: u64,
    /// Modulus requested
    pub arg: u32,
    /// Value returned
    pub result: u32,
}

/// Seeded ChaCha8 stream
#[derive(Debug, Clone)]
pub struct ChaChaSource {
    rng: ChaCha8Rng,
    seed: u64,
    calls: u64,
    trace: Option<Vec<RngTraceEntry>>,
}

impl ChaChaSource {
    /// Create a new source with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            calls: 0,
            trace: None,
        }
    }

    /// Create a new source with a random seed
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Start recording every draw
    pub fn enable_tracing(&mut self) {
        self.trace = Some(Vec::new());
    }

    /// Recorded draws since tracing was enabled
    pub fn trace(&self) -> &[RngTraceEntry] {
        self.trace.as_deref().unwrap_or(&[])
    }

    /// Number of draws made so far
    pub fn call_count(&self) -> u64 {
        self.calls
    }
}

impl RandomSource for ChaChaSource {
    fn below(&mut self, n: u32) -> u32 {
        let result = if n == 0 { 0 } else { self.rng.gen_range(0..n) };
        if let Some(trace) = self.trace.as_mut() {
            trace.push(RngTraceEntry {
                seq: self.calls,
                arg: n,
                result,
            });
        }
        self.calls += 1;
        result
    }

    fn seed(&self) -> Option<u64> {
        Some(self.seed)
    }
}

/// Replays a fixed sequence of raw draws.
///
/// Each call consumes the next scripted value and reduces it modulo `n`, so a
/// scripted `v` yields `v` from `below(n)` whenever `v < n`. Once the script is
/// exhausted the source falls back to a seeded ChaCha stream, which keeps long
/// simulations running after the interesting prefix has been pinned.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<u32>,
    pos: usize,
    fallback: ChaChaSource,
}

impl ScriptedSource {
    /// Create a source that replays `values` and then continues from seed 0
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            pos: 0,
            fallback: ChaChaSource::new(0),
        }
    }

    /// Number of scripted values not consumed yet
    pub fn remaining(&self) -> usize {
        self.values.len().saturating_sub(self.pos)
    }
}

impl RandomSource for ScriptedSource {
    fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        match self.values.get(self.pos) {
            Some(&v) => {
                self.pos += 1;
                v % n
            }
            None => {
                log::trace!("scripted rng exhausted after {} draws", self.pos);
                self.fallback.below(n)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chacha_is_reproducible() {
        let mut a = ChaChaSource::new(7);
        let mut b = ChaChaSource::new(7);
        for _ in 0..100 {
            assert_eq!(a.below(1000), b.below(1000));
        }
    }

    #[test]
    fn test_below_bounds() {
        let mut src = ChaChaSource::new(42);
        for n in 1..200 {
            assert!(src.below(n) < n);
        }
        assert_eq!(src.below(0), 0);
    }

    #[test]
    fn test_scripted_replays_then_falls_back() {
        let mut src = ScriptedSource::new(vec![3, 10, 0]);
        assert_eq!(src.below(5), 3);
        assert_eq!(src.below(4), 2);
        assert_eq!(src.below(9), 0);
        assert_eq!(src.remaining(), 0);
        assert!(src.below(6) < 6);
    }

    #[test]
    fn test_tracing_records_draws() {
        let mut src = ChaChaSource::new(1);
        src.enable_tracing();
        let v = src.below(20);
        assert_eq!(src.trace().len(), 1);
        assert_eq!(src.trace()[0].result, v);
        assert_eq!(src.trace()[0].arg, 20);
        assert_eq!(src.call_count(), 1);
    }
}
