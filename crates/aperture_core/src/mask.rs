//! # Sensor Masking
//!
//! A *mask* makes a sensor temporarily ineligible for re-selection even if
//! its own update interval has elapsed. Masks are the throttle that keeps a
//! slow render pass from piling up work: a sensor entering a batch is
//! masked for a fraction of its nominal period, so it cannot be rescheduled
//! before its previous pass has had a chance to complete.
//!
//! The table itself is a plain map; the owning crate wraps it in its own
//! lock, independent of the batch hand-off lock, so the scheduling scan
//! never serializes behind a render wait.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::sensor::SensorId;
use crate::time::SimTime;

/// Whether the mask window is derived per sensor or once per batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskScope {
    /// Each selected sensor is masked for a fraction of *its own* period.
    #[default]
    PerSensor,
    /// Every sensor in the batch is masked for a fraction of the shortest
    /// period in that batch. Reproduces the historical behavior where one
    /// fast sensor's window was applied to the whole batch.
    PerBatch,
}

/// Throttle policy applied when sensors enter a render batch.
///
/// `fraction` is deliberately below 1.0 by default: masking for the full
/// period would make mask expiry race the sensor's own next-due time and
/// skip updates on jittery tick boundaries. 0.9 keeps the mask strictly
/// inside the period.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MaskPolicy {
    /// Fraction of the nominal period a selected sensor stays masked.
    /// Must be within `(0, 1]`.
    pub fraction: f64,
    /// Window derivation scope.
    #[serde(default)]
    pub scope: MaskScope,
}

impl Default for MaskPolicy {
    fn default() -> Self {
        Self {
            fraction: 0.9,
            scope: MaskScope::default(),
        }
    }
}

impl MaskPolicy {
    /// Mask window length for a sensor declaring `rate_hz`.
    ///
    /// `rate_hz` has been validated positive at sensor creation.
    #[must_use]
    pub fn window(&self, rate_hz: f64) -> Duration {
        Duration::from_secs_f64(self.fraction / rate_hz)
    }
}

/// Per-sensor earliest-next-schedule times.
///
/// An entry `(id, until)` means: do not re-select `id` before simulation
/// time `until`. Entries are removed lazily - the scheduling scan drops an
/// entry the first time it observes it expired.
#[derive(Debug, Default)]
pub struct MaskTable {
    entries: HashMap<SensorId, SimTime>,
}

impl MaskTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or overwrites the mask expiry for `id`.
    pub fn mask(&mut self, id: SensorId, until: SimTime) {
        self.entries.insert(id, until);
    }

    /// Returns true if `id` is masked at time `now`.
    ///
    /// A mask set until `u` covers the half-open window `[set_time, u)`:
    /// the sensor becomes eligible again *at* `u`.
    #[must_use]
    pub fn is_masked(&self, id: SensorId, now: SimTime) -> bool {
        self.entries.get(&id).is_some_and(|&until| now < until)
    }

    /// Checks `id` at `now`, dropping the entry if it has expired.
    ///
    /// This is the lazy-sweep variant the scheduling scan uses: expired
    /// entries are cleaned up during the same pass that observes them.
    pub fn check_and_expire(&mut self, id: SensorId, now: SimTime) -> bool {
        match self.entries.get(&id) {
            Some(&until) if now < until => true,
            Some(_) => {
                self.entries.remove(&id);
                false
            }
            None => false,
        }
    }

    /// Drops every entry with expiry at or before `now`.
    pub fn sweep(&mut self, now: SimTime) {
        self.entries.retain(|_, &mut until| now < until);
    }

    /// Removes any entry for `id`, e.g. when a sensor is (re)registered.
    pub fn remove(&mut self, id: SensorId) {
        self.entries.remove(&id);
    }

    /// Number of live entries (expired-but-unswept entries count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
