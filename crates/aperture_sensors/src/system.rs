//! # Sensor System Facade
//!
//! Ties the registry, scheduler, synchronizer, and worker together behind
//! the two calls a host makes: `create_sensor` when a sensor component
//! appears, and `advance` once per simulation tick.

use parking_lot::Mutex;
use std::sync::Arc;

use tracing::debug;

use aperture_core::{select_due, MaskPolicy, MaskTable, SensorResult, SensorSpec, SimTime};

use crate::config::SensorsConfig;
use crate::integration::{RenderEngine, SensorFactory, WorldView};
use crate::registry::SensorRegistry;
use crate::sync::{Batch, RenderSynchronizer};
use crate::worker::RenderWorker;

/// The sensor rendering subsystem.
///
/// Construction spawns the render worker; the worker is stopped and joined
/// by [`SensorSystem::stop`] or on drop, whichever comes first.
pub struct SensorSystem {
    registry: Arc<SensorRegistry>,
    sync: Arc<RenderSynchronizer>,
    worker: RenderWorker,
    factory: Box<dyn SensorFactory>,
    /// Earliest-next-schedule table, written during the per-tick scan and
    /// by nothing else. Its own lock because sensor creation and the scan
    /// may race.
    mask: Mutex<MaskTable>,
    policy: MaskPolicy,
}

impl SensorSystem {
    /// Builds the subsystem and spawns the render worker.
    ///
    /// Scene creation does not happen yet; it waits for the first tick in
    /// which the host world contains a render-requiring sensor.
    #[must_use]
    pub fn new(
        config: &SensorsConfig,
        engine: Box<dyn RenderEngine>,
        factory: Box<dyn SensorFactory>,
    ) -> Self {
        let registry = Arc::new(SensorRegistry::new());
        let sync = Arc::new(RenderSynchronizer::new());
        let worker = RenderWorker::spawn(engine, Arc::clone(&registry), Arc::clone(&sync));
        Self {
            registry,
            sync,
            worker,
            factory,
            mask: Mutex::new(MaskTable::new()),
            policy: config.mask_policy(),
        }
    }

    /// Creates a sensor from `spec` under the named parent scene object.
    ///
    /// Works whether or not the scene exists yet; rendering-capable sensors
    /// are attached by the worker once it can. Returns the sensor's name.
    ///
    /// # Errors
    ///
    /// See [`SensorRegistry::create`]. A failed creation affects nothing
    /// else; the system keeps running.
    pub fn create_sensor(&self, spec: &SensorSpec, parent: &str) -> SensorResult<String> {
        let record = self.registry.create(spec, parent, self.factory.as_ref())?;
        debug!(sensor = %record.id(), name = record.name(), "sensor created");
        Ok(record.name().to_string())
    }

    /// Advances the subsystem to simulation time `now`. Called once per
    /// tick on the simulation thread.
    ///
    /// Before initialization this only watches the world for the first
    /// render-requiring sensor and fires the one-shot scene request. After
    /// initialization it scans for due sensors, masks what it selects, and
    /// hands the batch to the worker. A pass is also handed off when
    /// nothing is due but sensors are waiting to join the scene.
    ///
    /// Returns the number of sensors handed off for rendering. Blocks only
    /// while a previous batch is still in flight.
    pub fn advance(&self, now: SimTime, world: &dyn WorldView) -> usize {
        if !self.sync.is_running() {
            return 0;
        }

        if !self.sync.is_initialized() {
            if world.has_rendering_sensors() && self.sync.request_init(world.world_name()) {
                debug!(world = world.world_name(), "scene initialization requested");
            }
            return 0;
        }

        let due = {
            let mut mask = self.mask.lock();
            select_due(now, self.registry.due_snapshot(), &mut mask, &self.policy)
        };
        if due.is_empty() && self.registry.pending_attachments() == 0 {
            return 0;
        }

        let records = self.registry.records_for(&due);
        let handed_off = records.len();
        if self.sync.deposit(Batch {
            records,
            sim_time: now,
        }) {
            handed_off
        } else {
            0
        }
    }

    /// Shared access to the registry, e.g. for inspection by host tooling.
    #[must_use]
    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    /// Returns true until [`SensorSystem::stop`] (or drop) runs.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.sync.is_running()
    }

    /// Stops the subsystem and joins the render worker. Idempotent.
    pub fn stop(&self) {
        self.worker.stop();
    }
}
