//! Deterministic random number generation
//!
//! Weighted event selection draws from an xorshift64* stream seeded by the
//! scheduler configuration. Nothing in the engine touches a thread RNG, so a
//! seed plus a sequence of player choices replays exactly.

mod xorshift;

pub use xorshift::RngManager;
