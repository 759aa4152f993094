//! Owns the display worker threads.
//!
//! A worker is *live* while its alarm is in the registry and *retiring* once
//! its terminate flag is up. Every worker sends a [`WorkerExit`] as its last
//! act; [`Supervisor::reap`] joins whatever has arrived.
//!
//! Only a retiring worker may leave cleanly. An exit from a live worker, or
//! from one that panicked, means the registry and the worker table no longer
//! agree, and joining it re-raises the panic on the supervising thread.

use std::collections::HashMap;
use std::panic;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, unbounded};
use klaxon_events::{AlarmId, NoticeSink};
use klaxon_registry::{AlarmEntry, EntryKey};
use tracing::{debug, error};

use crate::error::SchedulerError;
use crate::scheduler::SchedulerConfig;
use crate::signal::WorkerSignal;
use crate::worker::{DisplayWorker, SharedRegistry, WorkerContext, WorkerExit, WorkerSerial};

struct WorkerHandle {
    id: AlarmId,
    serial: WorkerSerial,
    signal: Arc<WorkerSignal>,
    join: Option<JoinHandle<()>>,
}

pub struct Supervisor {
    live: HashMap<AlarmId, WorkerHandle>,
    retiring: HashMap<WorkerSerial, WorkerHandle>,
    exits: Receiver<WorkerExit>,
    ctx: WorkerContext,
    next_serial: u64,
}

impl Supervisor {
    pub(crate) fn new(
        registry: SharedRegistry,
        sink: Arc<dyn NoticeSink>,
        config: SchedulerConfig,
    ) -> Self {
        let (tx, rx) = unbounded();
        Self {
            live: HashMap::new(),
            retiring: HashMap::new(),
            exits: rx,
            ctx: WorkerContext {
                registry,
                sink,
                exits: tx,
                config,
            },
            next_serial: 0,
        }
    }

    /// Starts the display worker for a freshly created entry.
    ///
    /// Must be called with write access held. The new thread blocks on its
    /// first read until the caller releases it.
    ///
    /// # Panics
    /// Panics if `entry.id()` already has a live worker.
    pub(crate) fn spawn(&mut self, key: EntryKey, entry: &AlarmEntry) -> Result<(), SchedulerError> {
        let id = entry.id();
        let serial = WorkerSerial(self.next_serial);
        self.next_serial += 1;

        let signal = Arc::new(WorkerSignal::new());
        let worker = DisplayWorker::new(self.ctx.clone(), serial, key, entry, Arc::clone(&signal));
        let join = thread::Builder::new()
            .name(format!("alarm-{id}"))
            .spawn(move || worker.run())
            .map_err(|source| SchedulerError::Spawn { id, source })?;

        let previous = self.live.insert(
            id,
            WorkerHandle {
                id,
                serial,
                signal,
                join: Some(join),
            },
        );
        assert!(previous.is_none(), "alarm {id} already had a live display worker");

        debug!(alarm_id = %id, serial = serial.0, "display worker spawned");
        Ok(())
    }

    /// Raises the terminate flag of the live worker for `id`.
    ///
    /// Returns the signal so the caller can wake the worker once write access
    /// is released, or `None` if `id` has no live worker.
    pub(crate) fn retire(&mut self, id: AlarmId) -> Option<Arc<WorkerSignal>> {
        let handle = self.live.remove(&id)?;
        handle.signal.raise();
        let signal = Arc::clone(&handle.signal);
        debug!(alarm_id = %id, serial = handle.serial.0, "display worker retiring");
        self.retiring.insert(handle.serial, handle);
        Some(signal)
    }

    pub(crate) fn retire_all(&mut self) -> Vec<Arc<WorkerSignal>> {
        let ids: Vec<AlarmId> = self.live.keys().copied().collect();
        ids.into_iter().filter_map(|id| self.retire(id)).collect()
    }

    /// Joins every retiring worker that has already announced its exit.
    /// Never blocks on a worker that is still running.
    ///
    /// # Panics
    /// Re-raises the panic of a worker that died abnormally, and panics if a
    /// live worker left without being retired.
    pub fn reap(&mut self) -> usize {
        let mut joined = 0;
        while let Ok(exit) = self.exits.try_recv() {
            self.join(exit);
            joined += 1;
        }
        joined
    }

    /// Blocks until no worker is retiring or `timeout` elapses.
    /// Returns `true` if every retiring worker was joined.
    pub fn await_retired(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.reap();
        while !self.retiring.is_empty() {
            match self.exits.recv_deadline(deadline) {
                Ok(exit) => self.join(exit),
                Err(_) => return false,
            }
        }
        true
    }

    /// Joins every retiring worker, however long it takes.
    pub(crate) fn join_retiring(&mut self) {
        for (_, handle) in self.retiring.drain() {
            Self::join_handle(handle);
        }
        // Exit messages of the workers just joined.
        while self.exits.try_recv().is_ok() {}
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn retiring_count(&self) -> usize {
        self.retiring.len()
    }

    pub fn is_live(&self, id: AlarmId) -> bool {
        self.live.contains_key(&id)
    }

    /// Ids with a live worker, ascending.
    pub fn live_ids(&self) -> Vec<AlarmId> {
        let mut ids: Vec<AlarmId> = self.live.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn join(&mut self, exit: WorkerExit) {
        if let Some(handle) = self.retiring.remove(&exit.serial) {
            Self::join_handle(handle);
            return;
        }

        let id = self
            .live
            .values()
            .find(|handle| handle.serial == exit.serial)
            .map(|handle| handle.id)
            .unwrap_or_else(|| panic!("exit from unknown display worker {}", exit.serial.0));
        error!(
            alarm_id = %id,
            serial = exit.serial.0,
            panicked = exit.panicked,
            "live display worker died"
        );
        if let Some(handle) = self.live.remove(&id) {
            Self::join_handle(handle);
        }
        panic!("display worker for alarm {id} exited while still live");
    }

    fn join_handle(mut handle: WorkerHandle) {
        let Some(join) = handle.join.take() else {
            return;
        };
        if let Err(payload) = join.join() {
            error!(alarm_id = %handle.id, serial = handle.serial.0, "display worker panicked");
            panic::resume_unwind(payload);
        }
        debug!(alarm_id = %handle.id, serial = handle.serial.0, "display worker joined");
    }
}
