//! # Due-Set Scheduler
//!
//! The once-per-tick selection scan: given the current simulation time and
//! a view of the registered rendering sensors, decide which of them enter
//! the next render batch.
//!
//! The scan is a pure function over its inputs plus the mask table. The
//! caller holds the mask lock for exactly the duration of one call - never
//! across the hand-off to the render worker.

use crate::mask::{MaskPolicy, MaskScope, MaskTable};
use crate::sensor::SensorId;
use crate::time::SimTime;

/// Scheduler view of one registered rendering sensor.
#[derive(Debug, Clone, Copy)]
pub struct DueCandidate {
    /// Sensor identity.
    pub id: SensorId,
    /// Earliest simulation time the sensor's own interval permits.
    pub next_due: SimTime,
    /// Declared update rate in Hz (validated positive at creation).
    pub rate_hz: f64,
}

/// Selects the sensors due to render at `now` and masks them.
///
/// For each candidate, in iteration order:
/// - an expired mask entry is dropped (lazy sweep),
/// - an active mask skips the sensor,
/// - otherwise the sensor is selected if `next_due <= now`.
///
/// Every selected sensor is masked *before this function returns*, under
/// the same lock scope the caller used for the scan. That makes selection
/// idempotent within a tick: a second scan at the same `now` finds the
/// first scan's masks and returns an empty set.
///
/// Selection order is candidate iteration order; publish order across
/// independent sensors carries no guarantee to external consumers.
pub fn select_due<I>(
    now: SimTime,
    candidates: I,
    mask: &mut MaskTable,
    policy: &MaskPolicy,
) -> Vec<SensorId>
where
    I: IntoIterator<Item = DueCandidate>,
{
    let mut selected: Vec<DueCandidate> = Vec::new();

    for candidate in candidates {
        if mask.check_and_expire(candidate.id, now) {
            continue;
        }
        if candidate.next_due <= now {
            selected.push(candidate);
        }
    }

    match policy.scope {
        MaskScope::PerSensor => {
            for candidate in &selected {
                mask.mask(candidate.id, now + policy.window(candidate.rate_hz));
            }
        }
        MaskScope::PerBatch => {
            // Shortest period in the batch, i.e. the fastest rate.
            let fastest = selected
                .iter()
                .map(|c| c.rate_hz)
                .fold(f64::NEG_INFINITY, f64::max);
            if fastest > 0.0 {
                let until = now + policy.window(fastest);
                for candidate in &selected {
                    mask.mask(candidate.id, until);
                }
            }
        }
    }

    selected.into_iter().map(|c| c.id).collect()
}
