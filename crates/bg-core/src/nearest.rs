//! Bounded-tolerance nearest-neighbor lookup over sorted timestamps.

use chrono::{Duration, NaiveDateTime};

/// Finds the candidate whose timestamp is nearest to `at`, within
/// `tolerance` inclusive.
///
/// `candidates` must be sorted ascending by the timestamp `key` extracts.
/// Ties between an earlier and a later candidate at equal distance resolve
/// to the earlier one.
pub fn nearest_within<'a, T, F>(
    candidates: &'a [T],
    at: NaiveDateTime,
    tolerance: Duration,
    key: F,
) -> Option<&'a T>
where
    F: Fn(&T) -> NaiveDateTime,
{
    let idx = candidates.partition_point(|c| key(c) < at);
    let delta = |c: &T| (key(c) - at).abs();

    let before = idx.checked_sub(1).map(|i| &candidates[i]);
    let after = candidates.get(idx);

    let nearest = match (before, after) {
        (Some(b), Some(a)) => {
            if delta(b) <= delta(a) {
                Some(b)
            } else {
                Some(a)
            }
        }
        (Some(b), None) => Some(b),
        (None, Some(a)) => Some(a),
        (None, None) => None,
    };

    nearest.filter(|c| delta(c) <= tolerance)
}
