//! # Render Synchronizer
//!
//! The thread-safe hand-off point between the simulation thread and the
//! render worker: one mutex/condvar pair arbitrating a bounded one-slot
//! batch queue plus the one-time initialization gate.
//!
//! ## State machine
//!
//! ```text
//! Uninitialized ──request_init──▶ AwaitingInit ──mark_initialized──▶ Idle
//!                                                                     │ ▲
//!                                                          deposit    │ │ batch_complete
//!                                                                     ▼ │
//!                                                BatchPending ──▶ Rendering
//!
//! (any state) ──stop──▶ Stopped          Stopped is terminal
//! ```
//!
//! Every wait is predicate-guarded and every predicate releases on
//! `Stopped`, so no thread blocks past a stop request. There are no
//! wall-clock timeouts anywhere.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use aperture_core::SimTime;

use crate::registry::SensorRecord;

/// Lifecycle state of the rendering subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// No scene requested yet; no render-requiring sensor has been observed.
    Uninitialized,
    /// Initialization requested; the worker will acquire the scene.
    AwaitingInit,
    /// Scene exists, no batch in flight.
    Idle,
    /// A batch has been deposited and not yet picked up by the worker.
    BatchPending,
    /// The worker is draining a batch.
    Rendering,
    /// Shut down. Terminal.
    Stopped,
}

/// The sensors selected for one render pass.
///
/// Exists only between hand-off and drain; ownership moves from the
/// simulation thread to the render worker at deposit and the slot is
/// cleared when the worker picks it up. At most one batch is ever in
/// flight.
pub struct Batch {
    /// Selected sensors, in selection order.
    pub records: Vec<Arc<SensorRecord>>,
    /// The simulation time this pass represents.
    pub sim_time: SimTime,
}

struct Shared {
    state: RenderState,
    /// The one-slot queue. `Some` exactly while `state == BatchPending`.
    batch: Option<Batch>,
    /// World name captured with the initialization request.
    world_name: Option<String>,
}

/// One mutex/condvar pair arbitrating initialization and batch hand-off.
pub struct RenderSynchronizer {
    shared: Mutex<Shared>,
    cv: Condvar,
    /// Lock-free mirrors for the per-tick fast path; the mutex-guarded
    /// state stays authoritative for every wait predicate.
    stopped: AtomicBool,
    initialized: AtomicBool,
}

impl Default for RenderSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSynchronizer {
    /// Creates a synchronizer in `Uninitialized`, running.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Mutex::new(Shared {
                state: RenderState::Uninitialized,
                batch: None,
                world_name: None,
            }),
            cv: Condvar::new(),
            stopped: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
        }
    }

    /// Current state. Observability and tests; racy by nature.
    #[must_use]
    pub fn state(&self) -> RenderState {
        self.shared.lock().state
    }

    /// Returns false once a stop has been requested.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::Acquire)
    }

    /// Returns true once the scene has been acquired.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Requests scene initialization for `world_name`. Simulation thread.
    ///
    /// One-shot gate: only the `Uninitialized -> AwaitingInit` transition
    /// fires; later calls (including after a failed initialization) return
    /// false and do nothing.
    pub fn request_init(&self, world_name: &str) -> bool {
        let mut shared = self.shared.lock();
        if shared.state != RenderState::Uninitialized {
            return false;
        }
        shared.state = RenderState::AwaitingInit;
        shared.world_name = Some(world_name.to_string());
        drop(shared);
        self.cv.notify_all();
        true
    }

    /// Blocks until initialization is requested or a stop arrives.
    /// Render worker only. Returns the world name, or `None` on stop.
    pub fn await_init_request(&self) -> Option<String> {
        let mut shared = self.shared.lock();
        while !matches!(
            shared.state,
            RenderState::AwaitingInit | RenderState::Stopped
        ) {
            self.cv.wait(&mut shared);
        }
        if shared.state == RenderState::Stopped {
            return None;
        }
        Some(shared.world_name.clone().unwrap_or_default())
    }

    /// Completes initialization: `AwaitingInit -> Idle`. Render worker only.
    pub fn mark_initialized(&self) {
        let mut shared = self.shared.lock();
        if shared.state == RenderState::AwaitingInit {
            shared.state = RenderState::Idle;
            self.initialized.store(true, Ordering::Release);
            drop(shared);
            self.cv.notify_all();
        }
    }

    /// Blocks until a stop arrives. Used by the worker to park after a
    /// failed initialization - a standing condition, not a retry loop.
    pub fn await_stop(&self) {
        let mut shared = self.shared.lock();
        while shared.state != RenderState::Stopped {
            self.cv.wait(&mut shared);
        }
    }

    /// Deposits a batch for the worker. Simulation thread.
    ///
    /// If the previous batch has not drained yet, blocks until it has -
    /// this is the only suspension point on the simulation thread, bounded
    /// by the stop flag rather than any timeout. Returns false if the
    /// subsystem is stopped (or was never initialized); the batch is
    /// dropped in that case.
    pub fn deposit(&self, batch: Batch) -> bool {
        let mut shared = self.shared.lock();
        while matches!(
            shared.state,
            RenderState::BatchPending | RenderState::Rendering
        ) {
            self.cv.wait(&mut shared);
        }
        if shared.state != RenderState::Idle {
            return false;
        }
        shared.batch = Some(batch);
        shared.state = RenderState::BatchPending;
        drop(shared);
        self.cv.notify_one();
        true
    }

    /// Blocks until a batch is available or a stop arrives. Render worker
    /// only. Returns `None` on stop.
    pub fn next_batch(&self) -> Option<Batch> {
        let mut shared = self.shared.lock();
        loop {
            while !matches!(
                shared.state,
                RenderState::BatchPending | RenderState::Stopped
            ) {
                self.cv.wait(&mut shared);
            }
            if shared.state == RenderState::Stopped {
                return None;
            }
            if let Some(batch) = shared.batch.take() {
                shared.state = RenderState::Rendering;
                return Some(batch);
            }
            // Contract violation (pending with an empty slot); recover to
            // Idle rather than spin.
            shared.state = RenderState::Idle;
        }
    }

    /// Acknowledges a drained batch: `Rendering -> Idle`. Render worker
    /// only. Wakes a simulation thread waiting in [`Self::deposit`].
    pub fn batch_complete(&self) {
        let mut shared = self.shared.lock();
        if shared.state == RenderState::Rendering {
            shared.state = RenderState::Idle;
            drop(shared);
            self.cv.notify_one();
        }
    }

    /// Requests shutdown. Idempotent, callable from any thread and any
    /// state. Drops any undrained batch (no partial batch is rendered
    /// after a stop) and broadcasts to every waiter.
    pub fn stop(&self) {
        let mut shared = self.shared.lock();
        if shared.state == RenderState::Stopped {
            return;
        }
        shared.state = RenderState::Stopped;
        shared.batch = None;
        self.stopped.store(true, Ordering::Release);
        drop(shared);
        self.cv.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn empty_batch(secs: f64) -> Batch {
        Batch {
            records: Vec::new(),
            sim_time: SimTime::from_secs_f64(secs),
        }
    }

    #[test]
    fn test_init_gate_is_one_shot() {
        let sync = RenderSynchronizer::new();
        assert!(sync.request_init("world"));
        assert!(!sync.request_init("world"));
        assert_eq!(sync.state(), RenderState::AwaitingInit);

        assert_eq!(sync.await_init_request().as_deref(), Some("world"));
        sync.mark_initialized();
        assert!(sync.is_initialized());
        assert_eq!(sync.state(), RenderState::Idle);

        // Still one-shot after completion.
        assert!(!sync.request_init("world"));
    }

    #[test]
    fn test_deposit_requires_initialization() {
        let sync = RenderSynchronizer::new();
        assert!(!sync.deposit(empty_batch(0.0)));
        assert_eq!(sync.state(), RenderState::Uninitialized);
    }

    #[test]
    fn test_hand_off_round_trip() {
        let sync = RenderSynchronizer::new();
        sync.request_init("world");
        sync.await_init_request();
        sync.mark_initialized();

        assert!(sync.deposit(empty_batch(0.5)));
        assert_eq!(sync.state(), RenderState::BatchPending);

        let batch = sync.next_batch().unwrap();
        assert_eq!(batch.sim_time, SimTime::from_secs_f64(0.5));
        assert_eq!(sync.state(), RenderState::Rendering);

        sync.batch_complete();
        assert_eq!(sync.state(), RenderState::Idle);
    }

    #[test]
    fn test_stop_is_idempotent_and_terminal() {
        let sync = RenderSynchronizer::new();
        sync.stop();
        sync.stop();
        assert_eq!(sync.state(), RenderState::Stopped);
        assert!(!sync.is_running());

        // Every entry point is a no-op or a refusal after stop.
        assert!(!sync.request_init("world"));
        assert!(sync.await_init_request().is_none());
        assert!(!sync.deposit(empty_batch(0.0)));
        assert!(sync.next_batch().is_none());
        sync.batch_complete();
        assert_eq!(sync.state(), RenderState::Stopped);
    }

    #[test]
    fn test_stop_drops_undrained_batch() {
        let sync = RenderSynchronizer::new();
        sync.request_init("world");
        sync.await_init_request();
        sync.mark_initialized();
        assert!(sync.deposit(empty_batch(1.0)));

        sync.stop();
        assert!(sync.next_batch().is_none());
    }

    #[test]
    fn test_stop_unblocks_waiting_worker() {
        let sync = Arc::new(RenderSynchronizer::new());
        let worker = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || sync.next_batch().is_none())
        };
        // Give the worker time to actually block.
        thread::sleep(Duration::from_millis(20));
        sync.stop();
        assert!(worker.join().unwrap());
    }

    #[test]
    fn test_second_deposit_waits_for_drain() {
        let sync = Arc::new(RenderSynchronizer::new());
        sync.request_init("world");
        sync.await_init_request();
        sync.mark_initialized();

        assert!(sync.deposit(empty_batch(0.0)));

        // Worker drains the first batch after a delay; the second deposit
        // must block until then.
        let worker = {
            let sync = Arc::clone(&sync);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                let first = sync.next_batch().unwrap();
                sync.batch_complete();
                let second = sync.next_batch().unwrap();
                sync.batch_complete();
                (first.sim_time, second.sim_time)
            })
        };

        let start = std::time::Instant::now();
        assert!(sync.deposit(empty_batch(1.0)));
        assert!(start.elapsed() >= Duration::from_millis(25));

        let (first, second) = worker.join().unwrap();
        assert_eq!(first, SimTime::ZERO);
        assert_eq!(second, SimTime::from_secs_f64(1.0));
        sync.stop();
    }
}
