//! # APERTURE Core
//!
//! Pure decision logic for the APERTURE sensor-rendering scheduler.
//!
//! ## Design Principles
//!
//! 1. **No threads, no I/O** - everything in this crate is a deterministic
//!    function of its inputs and is unit testable without a render worker
//! 2. **Capability at creation time** - whether a sensor needs the render
//!    pass is a property of its [`SensorKind`], resolved once, never probed
//!    per tick
//! 3. **Explicit throttle policy** - the masking fraction and its scope are
//!    a [`MaskPolicy`] value, not a constant buried in the drain loop
//!
//! ## The scheduling pass
//!
//! Once per simulation tick the host runs one scan over the registered
//! sensors:
//!
//! ```text
//! for each sensor (registry order):
//!     mask expired?   -> drop the entry (lazy sweep)
//!     mask active?    -> skip
//!     next due <= now -> select, and mask until now + fraction * period
//! ```
//!
//! Selected sensors are masked inside the same scan, so running the scan
//! twice at the same simulation time never selects a sensor twice.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod mask;
pub mod schedule;
pub mod sensor;
pub mod time;

pub use error::{SensorError, SensorResult};
pub use mask::{MaskPolicy, MaskScope, MaskTable};
pub use schedule::{select_due, DueCandidate};
pub use sensor::{SensorId, SensorKind, SensorSpec};
pub use time::SimTime;
