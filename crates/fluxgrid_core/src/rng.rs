//! Seeded pseudo-random number generation.
//!
//! Network determinism hinges on this module: both peers replay a move with
//! the same 32-bit seed and must draw the identical float sequence to the
//! last representable bit. [`Mulberry32`] therefore uses only fixed-width
//! unsigned integer multiply/xor-shift operations - no platform entropy, no
//! trigonometry.
//!
//! The rule engine never reaches for ambient randomness on its own; it takes
//! a [`ChanceSource`] at the call site. Local play injects [`AmbientChance`],
//! networked play injects a seeded [`Mulberry32`], and both paths are
//! structurally identical.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A stream of chance values in `[0, 1)`, drawn exactly once per chance
/// event in a fixed order. Call-count divergence between peers is the
/// primary correctness hazard of the whole protocol.
pub trait ChanceSource {
    fn next(&mut self) -> f64;
}

/// The mulberry32 generator: one `u32` of state, one draw per call.
///
/// Given the same seed and the same call sequence, two independent
/// implementations produce identical `f64` streams bit-for-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }
}

impl ChanceSource for Mulberry32 {
    fn next(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        f64::from(t ^ (t >> 14)) / 4_294_967_296.0
    }
}

/// Non-deterministic chance for seedless local play.
///
/// Never use this on a networked path: two peers drawing from ambient
/// entropy will diverge on the first diagonal collide.
#[derive(Debug, Clone)]
pub struct AmbientChance {
    rng: SmallRng,
}

impl AmbientChance {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl Default for AmbientChance {
    fn default() -> Self {
        Self::new()
    }
}

impl ChanceSource for AmbientChance {
    fn next(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_stream_seed_1() {
        // Reference values from the mulberry32 recurrence; any drift here
        // breaks cross-peer sync.
        let mut rng = Mulberry32::new(1);
        assert_eq!(rng.next(), 0.6270739405881613);
        assert_eq!(rng.next(), 0.002735721180215478);
        assert_eq!(rng.next(), 0.5274470399599522);
        assert_eq!(rng.next(), 0.9810509674716741);
    }

    #[test]
    fn test_known_stream_seed_42() {
        let mut rng = Mulberry32::new(42);
        assert_eq!(rng.next(), 0.6011037519201636);
        assert_eq!(rng.next(), 0.44829055899754167);
        assert_eq!(rng.next(), 0.8524657934904099);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = Mulberry32::new(7);
        let mut b = Mulberry32::new(7);
        for _ in 0..1000 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = Mulberry32::new(1);
        let mut b = Mulberry32::new(2);
        assert_ne!(a.next(), b.next());
    }

    #[test]
    fn test_output_range() {
        let mut rng = Mulberry32::new(123);
        for _ in 0..10_000 {
            let v = rng.next();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_ambient_chance_range() {
        let mut chance = AmbientChance::new();
        for _ in 0..100 {
            let v = chance.next();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
