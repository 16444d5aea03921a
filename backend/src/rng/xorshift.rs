//! xorshift64* random number generator
//!
//! Same seed gives the same sequence of event picks. The state is a single
//! `u64`, which is what checkpoints store.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use campus_narrative_core_rs::RngManager;
///
/// let mut a = RngManager::new(7);
/// let mut b = RngManager::new(7);
/// assert_eq!(a.next_u64(), b.next_u64());
///
/// let roll = a.next_f64();
/// assert!((0.0..1.0).contains(&roll));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with the given seed
    ///
    /// A zero seed is replaced by 1 because xorshift never leaves state 0.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Rebuild a generator from a checkpointed state
    pub fn from_state(state: u64) -> Self {
        Self::new(state)
    }

    /// Current internal state (for checkpoints)
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Next raw 64-bit value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform f64 in `[0.0, 1.0)`
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform index in `[0, len)`
    ///
    /// # Panics
    /// Panics if `len` is zero.
    pub fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick an index from an empty range");
        (self.next_u64() % len as u64) as usize
    }
}
