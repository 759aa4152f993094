//! Display worker: one thread per live alarm.
//!
//! ## State machine
//! ```text
//!   spawn ──► Running ──(terminate observed)──► Exiting ──► thread ends
//!               │  ▲
//!               └──┘ poll: read entry, maybe display, wait
//! ```
//!
//! ## Rules
//! - Every pass runs under shared registry access and touches exactly one
//!   entry, looked up by arena key.
//! - The terminate flag is checked before the entry. Once the flag is up the
//!   entry may already be gone, so the worker never looks it up again.
//! - `changed` is read and cleared only here.
//! - Every way out of the thread, unwinding included, sends a [`WorkerExit`].

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::Sender;
use klaxon_events::{AlarmId, EntryKind, Notice, NoticeKind, NoticeSink};
use klaxon_registry::{AlarmEntry, AlarmRegistry, EntryKey};
use klaxon_sync::Turnstile;
use tracing::{debug, trace};

use crate::scheduler::SchedulerConfig;
use crate::signal::WorkerSignal;

pub(crate) type SharedRegistry = Arc<Turnstile<AlarmRegistry>>;

/// Identity of one worker thread. Unlike [`AlarmId`], never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct WorkerSerial(pub(crate) u64);

/// Last message from a worker thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WorkerExit {
    pub(crate) serial: WorkerSerial,
    /// The thread is unwinding from a panic rather than leaving on request.
    pub(crate) panicked: bool,
}

struct ExitGuard {
    serial: WorkerSerial,
    exits: Sender<WorkerExit>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        // A closed channel means the supervisor is gone and nobody will join us.
        let _ = self.exits.send(WorkerExit {
            serial: self.serial,
            panicked: thread::panicking(),
        });
    }
}

/// What every worker shares with the supervisor.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub(crate) registry: SharedRegistry,
    pub(crate) sink: Arc<dyn NoticeSink>,
    /// Workers announce their exit here so the supervisor can join them.
    pub(crate) exits: Sender<WorkerExit>,
    pub(crate) config: SchedulerConfig,
}

pub(crate) struct DisplayWorker {
    ctx: WorkerContext,
    id: AlarmId,
    key: EntryKey,
    serial: WorkerSerial,
    signal: Arc<WorkerSignal>,
    /// Local copy of what is being displayed; refreshed on replacement.
    interval_seconds: u32,
    message: String,
    replaced: bool,
    deadline: Instant,
}

impl DisplayWorker {
    /// Binds a worker to `entry`. Called by the supervisor while it holds
    /// exclusive registry access, so `entry` is the freshly created alarm.
    pub(crate) fn new(
        ctx: WorkerContext,
        serial: WorkerSerial,
        key: EntryKey,
        entry: &AlarmEntry,
        signal: Arc<WorkerSignal>,
    ) -> Self {
        let deadline = Instant::now() + ctx.config.period(entry.interval_seconds());
        Self {
            ctx,
            id: entry.id(),
            key,
            serial,
            signal,
            interval_seconds: entry.interval_seconds(),
            message: entry.message().to_owned(),
            replaced: false,
            deadline,
        }
    }

    pub(crate) fn run(mut self) {
        let _exit = ExitGuard {
            serial: self.serial,
            exits: self.ctx.exits.clone(),
        };
        debug!(alarm_id = %self.id, serial = self.serial.0, "display worker running");

        while self.poll() {
            self.signal.wait(self.ctx.config.poll_interval);
        }

        debug!(alarm_id = %self.id, serial = self.serial.0, "display worker exiting");
    }

    /// One pass of the loop. Returns `false` once the worker has to exit.
    fn poll(&mut self) -> bool {
        let registry = self.ctx.registry.read();

        if self.signal.is_raised() {
            self.emit(NoticeKind::WorkerExited {
                interval_seconds: self.interval_seconds,
                message: self.message.clone(),
            });
            return false;
        }

        let entry = self.bound_entry(&registry);
        let now = Instant::now();

        if entry.take_changed() {
            self.interval_seconds = entry.interval_seconds();
            self.message = entry.message().to_owned();
            self.replaced = true;
            self.deadline = now + self.ctx.config.period(self.interval_seconds);
            self.emit(NoticeKind::ReplacementApplied {
                interval_seconds: self.interval_seconds,
                message: self.message.clone(),
            });
        } else if now >= self.deadline {
            let (interval_seconds, message) = (self.interval_seconds, self.message.clone());
            self.emit(if self.replaced {
                NoticeKind::ReplacementDisplayed {
                    interval_seconds,
                    message,
                }
            } else {
                NoticeKind::Displayed {
                    interval_seconds,
                    message,
                }
            });
            self.deadline = now + self.ctx.config.period(self.interval_seconds);
        }

        true
    }

    /// The alarm entry this worker is bound to.
    ///
    /// # Panics
    /// Panics if the key no longer holds this worker's alarm. The sweep always
    /// raises the terminate flag in the same critical section that removes the
    /// entry, so reaching this means the registry and supervisor disagree.
    fn bound_entry<'r>(&self, registry: &'r AlarmRegistry) -> &'r AlarmEntry {
        match registry.get(self.key) {
            Some(entry) if entry.id() == self.id && entry.kind() == EntryKind::Create => entry,
            _ => panic!("display worker for alarm {} lost its registry entry", self.id),
        }
    }

    fn emit(&self, kind: NoticeKind) {
        let notice = Notice::now(self.id, kind);
        trace!(alarm_id = %self.id, notice = notice.label(), "worker notice");
        self.ctx.sink.emit(notice);
    }
}
