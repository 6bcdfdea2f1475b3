//! Fractional sort keys for drag-and-drop reordering.
//!
//! Moving an item between two neighbors assigns it the midpoint of their
//! keys; nothing else has to be rewritten. Repeated midpointing eventually
//! exhausts f64 granularity, at which point `between` returns `None` and the
//! caller renormalizes the sibling list with `sequence`.

/// Key for appending after `last` (or for the first item).
pub fn after(last: Option<f64>) -> f64 {
    match last {
        Some(v) => v + 1.0,
        None => 1.0,
    }
}

/// Key strictly between two neighbors.
///
/// `None` on either side means "no neighbor" (start/end of the list).
/// Returns `None` when the midpoint is not strictly between its neighbors
/// (keys too close together); the caller should renormalize.
pub fn between(lo: Option<f64>, hi: Option<f64>) -> Option<f64> {
    match (lo, hi) {
        (None, None) => Some(1.0),
        (Some(lo), None) => Some(lo + 1.0),
        (None, Some(hi)) => Some(hi - 1.0),
        (Some(lo), Some(hi)) => {
            if lo >= hi {
                return None;
            }
            let mid = lo + (hi - lo) / 2.0;
            (mid > lo && mid < hi).then_some(mid)
        }
    }
}

/// Fresh evenly-spaced keys (`1.0, 2.0, ...`) for `n` siblings.
pub fn sequence(n: usize) -> impl Iterator<Item = f64> {
    (1..=n).map(|i| i as f64)
}
