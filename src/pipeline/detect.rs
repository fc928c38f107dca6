//! Update detection.
//!
//! Decides, from the history of known modification times and one freshly
//! observed time, whether a page changed. A candidate counts as an update
//! only if it is strictly after every recorded time for that URL.
//!
//! Histories are not re-sorted: an out-of-order candidate that passes the
//! rule is simply appended.

use crate::models::{History, RecentObservation, Records, Timestamp, UpdateDelta};

/// Check whether `candidate` is newer than every entry in `history`.
///
/// Always true for an empty history.
pub fn is_newer(history: &[Timestamp], candidate: Timestamp) -> bool {
    history.iter().all(|known| *known < candidate)
}

/// Return `history` with `candidate` appended if it is newer, unchanged otherwise.
pub fn apply_update(history: &[Timestamp], candidate: Timestamp) -> History {
    let mut updated = history.to_vec();
    if is_newer(history, candidate) {
        updated.push(candidate);
    }
    updated
}

/// Compute the histories that grow from one batch of observations.
///
/// URLs missing from `records` are treated as having an empty history.
/// Only URLs whose history grew appear in the result, mapped to their
/// full post-update history.
pub fn compute_delta(records: &Records, observations: &RecentObservation) -> UpdateDelta {
    observations
        .iter()
        .filter_map(|(url, observed)| {
            let history = records.get(url).map(Vec::as_slice).unwrap_or_default();
            is_newer(history, *observed).then(|| (url.clone(), apply_update(history, *observed)))
        })
        .collect()
}
