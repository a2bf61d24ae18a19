//! Random number generation
//!
//! [`GameRng`] wraps whichever [`RandomSource`] the game was started with, so
//! tests can replace the seeded stream with a scripted one.

use delve_rng::{ChaChaSource, RandomSource, ScriptedSource};

/// Game random number generator
#[derive(Debug)]
pub struct GameRng {
    source: Box<dyn RandomSource>,
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self::from_source(ChaChaSource::new(seed))
    }

    /// Create an RNG that replays `values` as raw draws (see [`ScriptedSource`])
    pub fn scripted(values: impl Into<Vec<u32>>) -> Self {
        Self::from_source(ScriptedSource::new(values))
    }

    /// Wrap any random source
    pub fn from_source(source: impl RandomSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Seed of the underlying source, when it has one
    pub fn seed(&self) -> Option<u64> {
        self.source.seed()
    }

    /// Returns 0..n-1, or 0 when `n <= 0`
    pub fn randint0(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        self.source.below(n as u32) as i32
    }

    /// Returns 1..=n, or 0 when `n <= 0`
    pub fn randint1(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        self.randint0(n) + 1
    }

    /// Sum of `num` rolls of 1..=sides
    pub fn dice(&mut self, num: i32, sides: i32) -> i32 {
        (0..num.max(0)).map(|_| self.randint1(sides)).sum()
    }

    /// True with probability 1/n; `n` must be positive
    pub fn one_in(&mut self, n: i32) -> bool {
        debug_assert!(n > 0, "one_in({n})");
        self.randint0(n) == 0
    }

    /// True with probability percent/100
    pub fn percent(&mut self, percent: i32) -> bool {
        self.randint0(100) < percent
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.randint0(items.len() as i32) as usize)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_source(ChaChaSource::from_entropy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_randint_bounds() {
        let mut rng = GameRng::new(42);
        for _ in 0..1000 {
            let n = rng.randint0(10);
            assert!((0..10).contains(&n));
            let m = rng.randint1(6);
            assert!((1..=6).contains(&m));
        }
        assert_eq!(rng.randint0(0), 0);
        assert_eq!(rng.randint1(-3), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "one_in(0)")]
    fn test_one_in_rejects_zero() {
        GameRng::new(1).one_in(0);
    }

    #[test]
    fn test_dice_range() {
        let mut rng = GameRng::new(7);
        for _ in 0..200 {
            let d = rng.dice(3, 6);
            assert!((3..=18).contains(&d));
        }
    }

    #[test]
    fn test_scripted_draws() {
        let mut rng = GameRng::scripted(vec![4, 0, 99]);
        assert_eq!(rng.randint1(10), 5);
        assert!(rng.one_in(3));
        assert!(!rng.percent(50));
    }

    #[test]
    fn test_choose_empty() {
        let mut rng = GameRng::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[9]), Some(&9));
    }
}
