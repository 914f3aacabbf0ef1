//! Simulation clock types.
//!
//! Simulation time is decoupled from wall-clock time: it advances only when
//! the host steps a tick, and it may run faster or slower than real time.
//! All waits in the scheduler are predicate-based, never deadline-based, so
//! this module deliberately offers no conversion to `Instant`.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

/// A point on the simulation clock.
///
/// Internally a [`Duration`] since simulation start. Monotonically
/// non-decreasing across ticks. Converts losslessly to and from `u64`
/// nanoseconds so it can live in an `AtomicU64` (the registry stores each
/// sensor's next-due time that way).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimTime(Duration);

impl SimTime {
    /// Simulation start.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Creates a simulation time from a duration since simulation start.
    #[must_use]
    pub const fn new(since_start: Duration) -> Self {
        Self(since_start)
    }

    /// Creates a simulation time from fractional seconds.
    ///
    /// # Panics
    ///
    /// Panics if `secs` is negative, not finite, or overflows `Duration`,
    /// mirroring [`Duration::from_secs_f64`].
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self(Duration::from_secs_f64(secs))
    }

    /// Creates a simulation time from whole nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(Duration::from_nanos(nanos))
    }

    /// Returns the time as fractional seconds.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Returns the time as whole nanoseconds, saturating at `u64::MAX`.
    ///
    /// `u64` nanoseconds cover ~584 years of simulation, so saturation is
    /// theoretical; the clamp exists to keep the atomic bridge total.
    #[must_use]
    pub fn as_nanos(self) -> u64 {
        u64::try_from(self.0.as_nanos()).unwrap_or(u64::MAX)
    }

    /// Returns the underlying duration since simulation start.
    #[must_use]
    pub const fn since_start(self) -> Duration {
        self.0
    }

    /// Adds a duration, saturating at the maximum representable time.
    #[must_use]
    pub fn saturating_add(self, delta: Duration) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

impl Add<Duration> for SimTime {
    type Output = Self;

    fn add(self, delta: Duration) -> Self {
        Self(self.0 + delta)
    }
}

impl Sub<SimTime> for SimTime {
    type Output = Duration;

    /// Elapsed simulation time between two points.
    ///
    /// Saturates to zero if `other` is later than `self`; callers compare
    /// times across ticks and the clock never runs backwards.
    fn sub(self, other: SimTime) -> Duration {
        self.0.saturating_sub(other.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.9}s", self.0.as_secs_f64())
    }
}
