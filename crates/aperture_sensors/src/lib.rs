//! # APERTURE Sensors
//!
//! The sensor rendering subsystem: registry, render synchronizer, and the
//! dedicated render worker thread, driven once per tick by the host
//! simulation.
//!
//! ## Threads
//!
//! ```text
//! simulation thread                      render worker thread
//! ─────────────────                      ────────────────────
//! create_sensor ──▶ registry             await init request
//! advance:                               create scene (once)
//!   init gate ─────────────────────────▶ attach pending sensors
//!   due-set scan (lock-free reads)       loop:
//!   deposit batch ──────[one slot]─────▶   drain batch, render each,
//!   (blocks only while slot is full)       refresh next-due, acknowledge
//! stop ──▶ broadcast, join ◀──────────── exit
//! ```
//!
//! The simulation thread never waits for a render to finish; it waits only
//! for the previous hand-off slot to drain. The scene handle never leaves
//! the worker thread. The worker is joined on every exit path.
//!
//! ## Wiring it up
//!
//! The host implements [`RenderEngine`], [`SensorFactory`], and
//! [`WorldView`], then drives [`SensorSystem::advance`] from its tick loop
//! and [`SensorSystem::create_sensor`] whenever a sensor component appears.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod integration;
pub mod registry;
pub mod sync;
pub mod system;
pub mod worker;

pub use config::SensorsConfig;
pub use integration::{
    NodeId, RenderEngine, RenderingSensor, SceneGraph, SensorFactory, WorldView,
};
pub use registry::{SensorRecord, SensorRegistry};
pub use sync::{Batch, RenderState, RenderSynchronizer};
pub use system::SensorSystem;
pub use worker::RenderWorker;
