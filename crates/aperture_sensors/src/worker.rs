//! # Render Worker
//!
//! The dedicated thread that owns all scene access. The engine is moved
//! onto this thread at spawn and the scene handle it produces never leaves
//! it; every attach, scene update, and sensor render happens here.
//!
//! Lifecycle, in order:
//! 1. Block until an initialization request (or stop) arrives.
//! 2. Create the scene. On failure, report once and park until stop.
//! 3. Attach every queued sensor, mark the synchronizer initialized.
//! 4. Drain batches until stop: attach new sensors, update the scene once,
//!    render each selected sensor, refresh its next-due time, acknowledge.
//!
//! The thread is joined on every exit path, including drop.

use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, error, info};

use crate::integration::{RenderEngine, SceneGraph};
use crate::registry::SensorRegistry;
use crate::sync::RenderSynchronizer;

/// Everything the worker thread needs, moved onto it at spawn.
struct WorkerContext {
    engine: Box<dyn RenderEngine>,
    registry: Arc<SensorRegistry>,
    sync: Arc<RenderSynchronizer>,
}

/// Handle to the render worker thread.
///
/// [`RenderWorker::stop`] is idempotent and always joins the thread;
/// dropping the handle does the same, so the worker cannot outlive its
/// owner.
pub struct RenderWorker {
    sync: Arc<RenderSynchronizer>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RenderWorker {
    /// Spawns the worker thread.
    ///
    /// The engine moves onto the new thread; the registry and synchronizer
    /// are shared with the simulation side.
    #[must_use]
    pub fn spawn(
        engine: Box<dyn RenderEngine>,
        registry: Arc<SensorRegistry>,
        sync: Arc<RenderSynchronizer>,
    ) -> Self {
        let ctx = WorkerContext {
            engine,
            registry,
            sync: Arc::clone(&sync),
        };
        let handle = std::thread::spawn(move || run(ctx));
        Self {
            sync,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Returns true while the worker has not been stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.sync.is_running()
    }

    /// Stops and joins the worker. Idempotent; safe from any thread.
    pub fn stop(&self) {
        self.sync.stop();
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                error!("render worker thread panicked");
            }
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker thread body.
fn run(mut ctx: WorkerContext) {
    let Some(world_name) = ctx.sync.await_init_request() else {
        debug!("render worker stopped before initialization was requested");
        return;
    };

    let scene = match ctx.engine.create_scene(&world_name) {
        Ok(scene) => scene,
        Err(err) => {
            // Report once and park; no retry loop, no crash. The rest of
            // the simulation keeps stepping without rendered sensors.
            error!(world = %world_name, error = %err, "scene creation failed");
            ctx.sync.await_stop();
            return;
        }
    };

    attach_pending(&ctx, &scene);
    ctx.sync.mark_initialized();
    info!(
        world = %world_name,
        engine = ctx.engine.engine_name(),
        "render worker initialized"
    );

    while let Some(batch) = ctx.sync.next_batch() {
        // Sensors created since the last pass join the scene first, so a
        // pass triggered only by pending attachments still does its job.
        attach_pending(&ctx, &scene);

        // One scene-graph update serves the whole batch.
        scene.pre_render();

        for record in &batch.records {
            if !ctx.sync.is_running() {
                break;
            }
            debug!(sensor = %record.id(), time = %batch.sim_time, "rendering");
            record.render(batch.sim_time);
            record.set_next_due(batch.sim_time.saturating_add(record.period()));
        }

        ctx.sync.batch_complete();
    }
    debug!("render worker stopped");
}

fn attach_pending(ctx: &WorkerContext, scene: &Arc<dyn SceneGraph>) {
    for record in ctx.registry.take_pending() {
        debug!(sensor = %record.id(), parent = record.parent(), "attaching to scene");
        record.attach(scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use aperture_core::{SensorError, SensorKind, SensorResult, SensorSpec, SimTime};

    use crate::integration::{NodeId, RenderingSensor, SensorFactory};
    use crate::sync::Batch;

    struct MockScene {
        pre_renders: AtomicUsize,
    }

    impl SceneGraph for MockScene {
        fn is_initialized(&self) -> bool {
            true
        }
        fn pre_render(&self) {
            self.pre_renders.fetch_add(1, Ordering::SeqCst);
        }
        fn find_node(&self, _name: &str) -> Option<NodeId> {
            Some(NodeId(1))
        }
    }

    struct MockEngine {
        fail: bool,
        scene: Arc<MockScene>,
    }

    impl MockEngine {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                scene: Arc::new(MockScene {
                    pre_renders: AtomicUsize::new(0),
                }),
            }
        }
    }

    impl RenderEngine for MockEngine {
        fn engine_name(&self) -> &str {
            "mock"
        }
        fn create_scene(&mut self, world_name: &str) -> SensorResult<Arc<dyn SceneGraph>> {
            if self.fail {
                Err(SensorError::SceneCreation {
                    engine: "mock".into(),
                    reason: format!("no GPU for world {world_name}"),
                })
            } else {
                Ok(Arc::clone(&self.scene) as Arc<dyn SceneGraph>)
            }
        }
    }

    struct CountingSensor {
        name: String,
        rate_hz: f64,
        attaches: Arc<AtomicUsize>,
        renders: Arc<AtomicUsize>,
    }

    impl RenderingSensor for CountingSensor {
        fn name(&self) -> &str {
            &self.name
        }
        fn update_rate_hz(&self) -> f64 {
            self.rate_hz
        }
        fn attach(&mut self, _scene: &Arc<dyn SceneGraph>, _parent: &str) {
            self.attaches.fetch_add(1, Ordering::SeqCst);
        }
        fn render(&mut self, _now: SimTime) {
            self.renders.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct CountingFactory {
        attaches: Arc<AtomicUsize>,
        renders: Arc<AtomicUsize>,
    }

    impl SensorFactory for CountingFactory {
        fn create(&self, spec: &SensorSpec) -> Option<Box<dyn RenderingSensor>> {
            Some(Box::new(CountingSensor {
                name: spec.name.clone(),
                rate_hz: spec.update_rate_hz,
                attaches: Arc::clone(&self.attaches),
                renders: Arc::clone(&self.renders),
            }))
        }
    }

    fn camera_spec(name: &str, rate: f64) -> SensorSpec {
        SensorSpec {
            name: name.into(),
            kind: Some(SensorKind::Camera),
            update_rate_hz: rate,
            topic: None,
        }
    }

    fn wait_until(deadline_ms: u64, mut done: impl FnMut() -> bool) -> bool {
        for _ in 0..deadline_ms {
            if done() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        done()
    }

    #[test]
    fn test_worker_attaches_renders_and_refreshes_next_due() {
        let attaches = Arc::new(AtomicUsize::new(0));
        let renders = Arc::new(AtomicUsize::new(0));
        let factory = CountingFactory {
            attaches: Arc::clone(&attaches),
            renders: Arc::clone(&renders),
        };

        let registry = Arc::new(SensorRegistry::new());
        let record = registry
            .create(&camera_spec("cam", 10.0), "chassis", &factory)
            .unwrap();

        let sync = Arc::new(RenderSynchronizer::new());
        let worker = RenderWorker::spawn(
            Box::new(MockEngine::new(false)),
            Arc::clone(&registry),
            Arc::clone(&sync),
        );

        sync.request_init("test_world");
        assert!(wait_until(1000, || sync.is_initialized()));
        assert_eq!(attaches.load(Ordering::SeqCst), 1);

        let now = SimTime::from_secs_f64(1.0);
        assert!(sync.deposit(Batch {
            records: registry.records_for(&[record.id()]),
            sim_time: now,
        }));
        assert!(wait_until(1000, || renders.load(Ordering::SeqCst) == 1));
        assert!(wait_until(1000, || record.next_due()
            == now.saturating_add(Duration::from_millis(100))));

        worker.stop();
        assert!(!worker.is_running());
    }

    #[test]
    fn test_scene_failure_parks_worker_until_stop() {
        let registry = Arc::new(SensorRegistry::new());
        let sync = Arc::new(RenderSynchronizer::new());
        let worker = RenderWorker::spawn(
            Box::new(MockEngine::new(true)),
            Arc::clone(&registry),
            Arc::clone(&sync),
        );

        sync.request_init("test_world");
        // Initialization never completes, and nothing crashes.
        std::thread::sleep(Duration::from_millis(30));
        assert!(!sync.is_initialized());
        assert!(worker.is_running());

        // Stop still joins cleanly.
        worker.stop();
        assert!(!worker.is_running());
    }

    #[test]
    fn test_stop_before_init_request_joins() {
        let registry = Arc::new(SensorRegistry::new());
        let sync = Arc::new(RenderSynchronizer::new());
        let worker = RenderWorker::spawn(
            Box::new(MockEngine::new(false)),
            registry,
            sync,
        );
        worker.stop();
        worker.stop();
    }

    #[test]
    fn test_drop_joins_worker() {
        let registry = Arc::new(SensorRegistry::new());
        let sync = Arc::new(RenderSynchronizer::new());
        let worker = RenderWorker::spawn(
            Box::new(MockEngine::new(false)),
            registry,
            Arc::clone(&sync),
        );
        drop(worker);
        assert!(!sync.is_running());
    }
}
