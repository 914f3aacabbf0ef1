//! # Sensor Registry
//!
//! Owns the set of live sensor instances. Creation happens on whatever
//! thread drives it; scene attachment is queued and drained only on the
//! render worker thread, because the scene never leaves that thread.

use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aperture_core::{DueCandidate, SensorError, SensorId, SensorKind, SensorResult, SensorSpec, SimTime};

use crate::integration::{RenderingSensor, SceneGraph, SensorFactory};

/// One registered sensor.
///
/// Thread affinity per field:
/// - `id`, `name`, `kind`, `rate_hz`, `parent`: immutable after creation,
///   readable anywhere.
/// - `next_due_nanos`: read lock-free by the scheduling scan, written by
///   the render worker after each render.
/// - `sensor`: locked only around attach/render, both on the worker thread;
///   the scan never touches it.
pub struct SensorRecord {
    id: SensorId,
    name: String,
    kind: SensorKind,
    rate_hz: f64,
    parent: String,
    next_due_nanos: AtomicU64,
    sensor: Mutex<Box<dyn RenderingSensor>>,
}

impl std::fmt::Debug for SensorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("rate_hz", &self.rate_hz)
            .field("parent", &self.parent)
            .field("next_due_nanos", &self.next_due_nanos)
            .finish_non_exhaustive()
    }
}

impl SensorRecord {
    /// Sensor identity.
    #[must_use]
    pub fn id(&self) -> SensorId {
        self.id
    }

    /// Sensor name from its specification.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Concrete sensor kind.
    #[must_use]
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Declared update rate in Hz.
    #[must_use]
    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }

    /// Name of the scene object the sensor hangs under.
    #[must_use]
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Nominal period between updates.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz)
    }

    /// Earliest simulation time the sensor's own interval permits.
    #[must_use]
    pub fn next_due(&self) -> SimTime {
        SimTime::from_nanos(self.next_due_nanos.load(Ordering::Acquire))
    }

    /// Refreshes the next-due time. Worker thread, after a render.
    pub(crate) fn set_next_due(&self, t: SimTime) {
        self.next_due_nanos.store(t.as_nanos(), Ordering::Release);
    }

    /// Attaches the underlying sensor to the scene. Worker thread only.
    pub(crate) fn attach(&self, scene: &Arc<dyn SceneGraph>) {
        self.sensor.lock().attach(scene, &self.parent);
    }

    /// Renders and publishes one frame. Worker thread only.
    pub(crate) fn render(&self, now: SimTime) {
        self.sensor.lock().render(now);
    }
}

/// The set of live sensors, keyed by [`SensorId`].
///
/// Iteration order (and therefore selection order) is ascending id, which
/// is creation order since ids are never recycled.
pub struct SensorRegistry {
    records: RwLock<BTreeMap<SensorId, Arc<SensorRecord>>>,
    /// Rendering sensors created but not yet attached to the scene.
    /// Drained on the worker thread: at initialization, then at the start
    /// of every render pass.
    pending_attach: Mutex<Vec<Arc<SensorRecord>>>,
    next_id: AtomicU64,
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            pending_attach: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a sensor from `spec` and registers it.
    ///
    /// Rendering-capable sensors are queued for scene attachment; the queue
    /// is drained on the render worker, so creation works whether or not a
    /// scene exists yet.
    ///
    /// # Errors
    ///
    /// [`SensorError::UnknownSensorType`] if the specification names no
    /// kind, [`SensorError::CreationFailed`] if the rate is unusable or the
    /// factory returns no instance. Failures leave the registry unchanged.
    pub fn create(
        &self,
        spec: &SensorSpec,
        parent: &str,
        factory: &dyn SensorFactory,
    ) -> SensorResult<Arc<SensorRecord>> {
        let kind = spec.validate()?;
        let sensor = factory
            .create(spec)
            .ok_or_else(|| SensorError::CreationFailed {
                name: spec.name.clone(),
                reason: "factory returned no instance".into(),
            })?;

        let id = SensorId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let record = Arc::new(SensorRecord {
            id,
            name: spec.name.clone(),
            kind,
            rate_hz: spec.update_rate_hz,
            parent: parent.to_string(),
            // Due immediately: a fresh sensor renders on the next pass.
            next_due_nanos: AtomicU64::new(0),
            sensor: Mutex::new(sensor),
        });

        self.records.write().insert(id, Arc::clone(&record));
        if kind.is_rendering() {
            self.pending_attach.lock().push(Arc::clone(&record));
        }
        Ok(record)
    }

    /// Scheduler view of every rendering sensor, in registry order.
    #[must_use]
    pub fn due_snapshot(&self) -> Vec<DueCandidate> {
        self.records
            .read()
            .values()
            .filter(|r| r.kind.is_rendering())
            .map(|r| DueCandidate {
                id: r.id,
                next_due: r.next_due(),
                rate_hz: r.rate_hz,
            })
            .collect()
    }

    /// Resolves selected ids back to records, preserving order.
    #[must_use]
    pub fn records_for(&self, ids: &[SensorId]) -> Vec<Arc<SensorRecord>> {
        let records = self.records.read();
        ids.iter()
            .filter_map(|id| records.get(id).cloned())
            .collect()
    }

    /// Looks up a single record.
    #[must_use]
    pub fn get(&self, id: SensorId) -> Option<Arc<SensorRecord>> {
        self.records.read().get(&id).cloned()
    }

    /// Number of sensors awaiting scene attachment.
    ///
    /// Non-zero means a render pass should run even if nothing is due, so
    /// the worker gets a chance to integrate the new sensors.
    #[must_use]
    pub fn pending_attachments(&self) -> usize {
        self.pending_attach.lock().len()
    }

    /// Takes the attachment queue. Worker thread only.
    pub(crate) fn take_pending(&self) -> Vec<Arc<SensorRecord>> {
        std::mem::take(&mut *self.pending_attach.lock())
    }

    /// Number of registered sensors (rendering or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if no sensors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
