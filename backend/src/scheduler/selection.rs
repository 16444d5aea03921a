//! Weighted random selection
//!
//! Negative weights count as zero. When every weight is zero the pick is
//! uniform. Otherwise a roll in `[0, total)` is matched against the running
//! sum with `roll <= cumulative`, scanning left to right, so at an exact
//! boundary the earlier candidate wins. The last candidate absorbs any
//! floating-point shortfall.

use crate::rng::RngManager;

/// Pick one candidate by weight, `None` only for an empty slice
pub fn select_weighted<'a, T>(
    candidates: &'a [T],
    weight: impl Fn(&T) -> f64,
    rng: &mut RngManager,
) -> Option<&'a T> {
    if candidates.is_empty() {
        return None;
    }

    let total: f64 = candidates.iter().map(|c| weight(c).max(0.0)).sum();
    if total <= 0.0 {
        return candidates.get(rng.index(candidates.len()));
    }

    let roll = rng.next_f64() * total;
    let mut cumulative = 0.0;
    for candidate in candidates {
        cumulative += weight(candidate).max(0.0);
        if roll <= cumulative {
            return Some(candidate);
        }
    }

    candidates.last()
}
