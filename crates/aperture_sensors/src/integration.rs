//! # Integration Traits
//!
//! Seams to the external collaborators. This crate does not implement a
//! simulation engine, a render engine, or concrete sensors - it defines
//! the contracts here and the host provides the implementations.
//!
//! ```text
//! aperture_sensors defines:     host implements:
//! ┌──────────────────┐          ┌──────────────────┐
//! │ trait WorldView  │  ←────   │ ECS / tick loop  │
//! │ trait RenderEngine│ ←────   │ GPU scene backend│
//! │ trait SensorFactory│ ←───   │ camera / lidar   │
//! └──────────────────┘          └──────────────────┘
//! ```
//!
//! Thread affinity matters more than the signatures here:
//! [`RenderEngine::create_scene`] and everything on [`SceneGraph`] run on
//! the render worker thread only; [`WorldView`] is read on the simulation
//! thread; [`SensorFactory`] runs wherever sensor creation is driven from.

use std::fmt;
use std::sync::Arc;

use aperture_core::{SensorResult, SensorSpec, SimTime};

/// Opaque handle to an object in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A scene owned by the render engine.
///
/// Created by [`RenderEngine::create_scene`] on the render worker thread
/// and used exclusively there; no other thread may touch the scene once it
/// exists.
pub trait SceneGraph: Send + Sync {
    /// Returns true once the scene's GPU resources exist.
    fn is_initialized(&self) -> bool;

    /// Updates the scene graph once before a batch of sensor renders.
    ///
    /// Called once per render pass so each sensor does not pay for its own
    /// full scene-graph update.
    fn pre_render(&self);

    /// Looks up a scene object by identifier, e.g. a sensor's parent link.
    fn find_node(&self, name: &str) -> Option<NodeId>;
}

/// The render engine collaborator.
///
/// Moved onto the render worker thread at spawn; `create_scene` is the only
/// operation in the whole subsystem allowed to block on external resource
/// acquisition (GPU context, window system, ...).
pub trait RenderEngine: Send {
    /// Human-readable engine name, for diagnostics.
    fn engine_name(&self) -> &str;

    /// Creates (or acquires) the scene for the named world.
    ///
    /// # Errors
    ///
    /// [`aperture_core::SensorError::SceneCreation`] if the engine cannot
    /// provide a scene. The worker reports this once and parks; it does not
    /// retry and it does not crash the process.
    fn create_scene(&mut self, world_name: &str) -> SensorResult<Arc<dyn SceneGraph>>;
}

/// A sensor instance that produces its output through the render pass.
///
/// Implementations render *and publish* in [`RenderingSensor::render`]; the
/// scheduler does not observe the published data.
pub trait RenderingSensor: Send {
    /// Sensor name from its specification.
    fn name(&self) -> &str;

    /// Declared update rate in Hz.
    fn update_rate_hz(&self) -> f64;

    /// Attaches the sensor to the scene under its parent object.
    ///
    /// Called on the render worker thread, exactly once per sensor, after
    /// the scene exists - creation itself must tolerate having no scene.
    fn attach(&mut self, scene: &Arc<dyn SceneGraph>, parent: &str);

    /// Renders and publishes one frame for simulation time `now`.
    fn render(&mut self, now: SimTime);
}

/// Per-tick read access to the host simulation.
///
/// The scheduler uses this only to detect that a render-requiring sensor
/// component exists (which gates scene initialization) and to obtain the
/// world name the scene is created for.
pub trait WorldView {
    /// Name of the simulated world.
    fn world_name(&self) -> &str;

    /// Returns true if any render-requiring sensor component exists.
    fn has_rendering_sensors(&self) -> bool;
}

/// Factory turning specifications into live sensor instances.
///
/// Returning `None` signals the specification could not be realized; the
/// registry reports it as a creation failure without affecting other
/// sensors.
pub trait SensorFactory: Send + Sync {
    /// Creates a sensor instance for `spec`, or `None` if the factory
    /// cannot realize it.
    fn create(&self, spec: &SensorSpec) -> Option<Box<dyn RenderingSensor>>;
}
