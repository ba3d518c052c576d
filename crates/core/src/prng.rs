//! Deterministic PRNG based on the Mulberry32 algorithm.
//!
//! A 32-bit state generator: tiny, fast, and reproducible across platforms
//! because the core is pure wrapping integer arithmetic. The same seed always
//! produces the same universe layout.

use serde::{Deserialize, Serialize};

use crate::seed::Seed;

/// Mulberry32 deterministic PRNG. Same state always produces the same sequence.
///
/// Every draw used by the composer, builder, and stepper goes through one
/// explicitly passed instance, so there is no hidden global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Additive constant of the Mulberry32 state walk.
    const INCREMENT: u32 = 0x6D2B_79F5;

    /// Creates a new PRNG from a raw 32-bit state.
    pub fn new(state: u32) -> Self {
        Self { state }
    }

    /// Creates a PRNG whose state is the 32-bit hash of `seed`.
    pub fn from_seed(seed: &Seed) -> Self {
        Self::new(seed.hash32())
    }

    /// Creates a seeded PRNG when a seed is given, otherwise one whose state
    /// comes from `entropy`.
    pub fn from_seed_or(seed: Option<&Seed>, entropy: impl FnOnce() -> u32) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::new(entropy()),
        }
    }

    /// Creates a seeded PRNG when a seed is given, or an entropy-seeded one otherwise.
    #[cfg(feature = "entropy")]
    pub fn from_optional_seed(seed: Option<&Seed>) -> Self {
        Self::from_seed_or(seed, os_entropy)
    }

    /// Advances the state and returns the next 32-bit value.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(Self::INCREMENT);
        let a = self.state;
        let mut t = (a ^ (a >> 15)).wrapping_mul(1 | a);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t));
        t ^ (t >> 14)
    }

    /// Returns a uniformly distributed f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Returns a uniformly distributed f64 between `min` and `max`.
    ///
    /// Reversed bounds are allowed and simply swap the roles of the ends.
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        self.next_f64() * (max - min) + min
    }

    /// Returns a uniformly distributed index in [0, len).
    ///
    /// # Panics
    ///
    /// Panics if `len` is 0.
    pub fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "index() requires a non-empty range");
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    /// Returns a uniformly chosen element of `items`.
    ///
    /// # Panics
    ///
    /// Panics if `items` is empty.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.index(items.len())]
    }

    /// Returns `1.0` or `-1.0` with equal probability.
    pub fn sign(&mut self) -> f64 {
        *self.choice(&[1.0, -1.0])
    }

    /// Returns `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// A random 32-bit value from the operating system's entropy source.
#[cfg(feature = "entropy")]
pub fn os_entropy() -> u32 {
    rand::random::<u32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u32_produces_known_golden_values_for_state_42() {
        // If this test breaks, the PRNG algorithm changed and every seeded
        // layout is different.
        let mut rng = Mulberry32::new(42);
        assert_eq!(rng.next_u32(), 2_581_720_956);
        assert_eq!(rng.next_u32(), 1_925_393_290);
        assert_eq!(rng.next_u32(), 3_661_312_704);
    }

    #[test]
    fn next_f64_matches_golden_fraction() {
        let mut rng = Mulberry32::new(42);
        assert!((rng.next_f64() - 0.601_103_751_920_163_6).abs() < 1e-15);
    }

    #[test]
    fn from_seed_uses_string_hash() {
        let mut rng = Mulberry32::from_seed(&Seed::from("demo"));
        assert_eq!(rng.next_u32(), 3_410_487_298);
    }

    #[test]
    fn two_instances_with_same_state_produce_identical_sequences() {
        let mut rng_a = Mulberry32::new(7);
        let mut rng_b = Mulberry32::new(7);
        for i in 0..1000 {
            assert_eq!(
                rng_a.next_u32(),
                rng_b.next_u32(),
                "sequences diverged at index {i}"
            );
        }
    }

    #[test]
    fn state_zero_is_usable() {
        let mut rng = Mulberry32::new(0);
        let values: Vec<u32> = (0..4).map(|_| rng.next_u32()).collect();
        assert!(values.iter().any(|&v| v != 0));
        assert_ne!(values[0], values[1]);
    }

    #[test]
    fn range_stays_within_specified_bounds() {
        let mut rng = Mulberry32::new(9999);
        for i in 0..10_000 {
            let v = rng.range(10.0, 20.0);
            assert!(
                (10.0..20.0).contains(&v),
                "range(10, 20) = {v} out of bounds at iteration {i}"
            );
        }
    }

    #[test]
    fn choice_returns_member_of_slice() {
        let mut rng = Mulberry32::new(5);
        let arms = [2u32, 3, 4];
        for _ in 0..1000 {
            assert!(arms.contains(rng.choice(&arms)));
        }
    }

    #[test]
    fn sign_produces_both_signs() {
        let mut rng = Mulberry32::new(11);
        let signs: Vec<f64> = (0..200).map(|_| rng.sign()).collect();
        assert!(signs.contains(&1.0));
        assert!(signs.contains(&-1.0));
        assert!(signs.iter().all(|s| s.abs() == 1.0));
    }

    #[test]
    #[should_panic]
    fn index_of_empty_range_panics() {
        Mulberry32::new(1).index(0);
    }

    #[test]
    fn serialization_roundtrip_preserves_state() {
        let mut rng = Mulberry32::new(42);
        for _ in 0..50 {
            rng.next_u32();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: Mulberry32 = serde_json::from_str(&json).unwrap();
        for i in 0..100 {
            assert_eq!(
                rng.next_u32(),
                restored.next_u32(),
                "sequences diverged after deserialization at index {i}"
            );
        }
    }

    #[test]
    fn from_seed_or_ignores_entropy_when_seeded() {
        let seed = Seed::from("demo");
        let seeded = Mulberry32::from_seed_or(Some(&seed), || unreachable!());
        assert_eq!(seeded, Mulberry32::from_seed(&seed));
        let mut fallback = Mulberry32::from_seed_or(None, || 42);
        assert_eq!(fallback.next_u32(), 2_581_720_956);
    }

    #[cfg(feature = "entropy")]
    #[test]
    fn from_optional_seed_is_deterministic_only_with_seed() {
        let seed = Seed::from("demo");
        let mut a = Mulberry32::from_optional_seed(Some(&seed));
        let mut b = Mulberry32::from_optional_seed(Some(&seed));
        assert_eq!(a.next_u32(), b.next_u32());
        let mut c = Mulberry32::from_optional_seed(None);
        assert!((0.0..1.0).contains(&c.next_f64()));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_f64_in_unit_interval_for_any_state(state: u32) {
                let mut rng = Mulberry32::new(state);
                for _ in 0..100 {
                    let v = rng.next_f64();
                    prop_assert!(
                        (0.0..1.0).contains(&v),
                        "next_f64() = {v} out of [0, 1) for state {state}"
                    );
                }
            }

            #[test]
            fn index_in_bounds_for_any_state_and_len(
                state: u32,
                len in 1_usize..10_000,
            ) {
                let mut rng = Mulberry32::new(state);
                for _ in 0..100 {
                    let v = rng.index(len);
                    prop_assert!(v < len, "index({len}) = {v} for state {state}");
                }
            }

            #[test]
            fn next_f64_approximate_uniformity(state: u32) {
                let mut rng = Mulberry32::new(state);
                let mut buckets = [0u32; 10];
                for _ in 0..10_000 {
                    let idx = (rng.next_f64() * 10.0).min(9.0) as usize;
                    buckets[idx] += 1;
                }
                for (i, &count) in buckets.iter().enumerate() {
                    prop_assert!(
                        count >= 500,
                        "bucket {i} has only {count} values (expected ~1000) for state {state}"
                    );
                }
            }
        }
    }
}
