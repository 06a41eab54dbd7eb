//! Injectable random source for combat mechanics.
//!
//! Every random draw made during an encounter (evasion, flee attempts) goes
//! through the single [`RandomSource`] owned by the engine instance. Given the
//! same seed and the same player choices the engine reproduces the same log.

/// Random number source used by the combat engine.
///
/// Implementations must be deterministic for a given starting state.
pub trait RandomSource {
    /// Generate the next random u32 value.
    fn next_u32(&mut self) -> u32;

    /// Draw a value in `[0, 1)`.
    ///
    /// Used for probability checks like flee chance and evasion.
    fn next_unit(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Generate a random value in range [min, max] inclusive.
    fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = (max - min) as u64 + 1;
        min + (self.next_u32() as u64 % span) as u32
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR variant: 64 bits of state, 32-bit output. Deterministic, fast
/// and small enough to snapshot alongside combat state.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Creates a generator from a seed.
    pub fn seeded(seed: u64) -> Self {
        // Run the seed through one step so that small seeds do not start
        // with a near-zero state.
        let state = Self::pcg_step(seed.wrapping_add(Self::INCREMENT));
        Self { state }
    }

    /// Advance the PCG state by one step.
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RandomSource for PcgRng {
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::pcg_step(old);
        Self::pcg_output(old)
    }
}

/// Replays a scripted list of unit draws.
///
/// Intended for tests: each call to [`RandomSource::next_unit`] returns the
/// next scripted value. Once exhausted the last value repeats; an empty script
/// always yields `0.0`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FixedRolls {
    rolls: Vec<f64>,
    cursor: usize,
}

impl FixedRolls {
    pub fn new(rolls: impl Into<Vec<f64>>) -> Self {
        Self {
            rolls: rolls.into(),
            cursor: 0,
        }
    }

    /// Number of draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for FixedRolls {
    fn next_u32(&mut self) -> u32 {
        (self.next_unit() * (u32::MAX as f64 + 1.0)) as u32
    }

    fn next_unit(&mut self) -> f64 {
        let value = self
            .rolls
            .get(self.cursor)
            .or_else(|| self.rolls.last())
            .copied()
            .unwrap_or(0.0);
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
