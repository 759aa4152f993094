use std::sync::Arc;
use std::time::Duration;

use klaxon_events::{AlarmId, Command, Notice, NoticeKind, NoticeSink, Outcome, Rejection};
use klaxon_registry::{AlarmRegistry, InvariantViolation, Submitted};
use klaxon_sync::Turnstile;
use tracing::{debug, error, info, warn};

use crate::error::SchedulerError;
use crate::supervisor::Supervisor;
use crate::worker::SharedRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Wall-clock length of one interval unit.
    pub time_unit: Duration,
    /// Longest a worker sleeps before re-checking its entry.
    pub poll_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            time_unit: Duration::from_secs(1),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl SchedulerConfig {
    /// Display period of an alarm with the given interval.
    pub fn period(&self, interval_seconds: u32) -> Duration {
        self.time_unit.saturating_mul(interval_seconds)
    }
}

/// Front door for commands: applies them to the registry under exclusive
/// access and keeps one display worker per live alarm.
pub struct Scheduler {
    registry: SharedRegistry,
    supervisor: Supervisor,
    sink: Arc<dyn NoticeSink>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, sink: Arc<dyn NoticeSink>) -> Self {
        let registry = Arc::new(Turnstile::new(AlarmRegistry::new()));
        let supervisor = Supervisor::new(Arc::clone(&registry), Arc::clone(&sink), config);
        info!(
            time_unit_ms = config.time_unit.as_millis() as u64,
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            "scheduler started"
        );
        Self {
            registry,
            supervisor,
            sink,
        }
    }

    /// Applies one command.
    ///
    /// The registry change, any worker spawn or retirement, and the notice
    /// reporting the outcome all happen inside one exclusive section. Retired
    /// workers are woken only after it ends.
    pub fn submit(&mut self, command: Command) -> Result<Outcome, SchedulerError> {
        let id = command.id();
        let request = command.clone();
        let mut woken = Vec::new();

        let outcome = {
            let mut registry = self.registry.write();
            let submitted = registry.submit(command);

            match submitted {
                Submitted::Created(key) => {
                    if let Err(err) = self.supervisor.spawn(key, &registry[key]) {
                        registry.retract(key);
                        error!(alarm_id = %id, error = %err, "alarm dropped");
                        return Err(err);
                    }
                }
                Submitted::CancelPending => {
                    for swept in registry.sweep() {
                        let signal = self
                            .supervisor
                            .retire(swept)
                            .unwrap_or_else(|| panic!("swept alarm {swept} had no live display worker"));
                        woken.push(signal);
                    }
                }
                Submitted::Replaced(_) | Submitted::CancelUnmatched | Submitted::CancelDuplicate => {}
            }

            enforce_invariants(id, registry.check_invariants());

            let outcome = submitted.outcome();
            self.report(id, outcome, request);
            outcome
        };

        for signal in &woken {
            signal.notify();
        }
        debug!(alarm_id = %id, outcome = outcome.as_label(), "command applied");
        Ok(outcome)
    }

    fn report(&self, id: AlarmId, outcome: Outcome, request: Command) {
        let kind = match (request, outcome) {
            (
                Command::Create {
                    interval_seconds,
                    message,
                    ..
                },
                Outcome::Created,
            ) => NoticeKind::Accepted {
                interval_seconds,
                message,
            },
            (
                Command::Create {
                    interval_seconds,
                    message,
                    ..
                },
                _,
            ) => NoticeKind::Replaced {
                interval_seconds,
                message,
            },
            (Command::Cancel { .. }, Outcome::CancelPending) => NoticeKind::CancelAccepted,
            (Command::Cancel { .. }, Outcome::CancelDuplicate) => {
                NoticeKind::CancelRejected(Rejection::Duplicate)
            }
            (Command::Cancel { .. }, _) => NoticeKind::CancelRejected(Rejection::Unmatched),
        };
        if outcome.is_rejection() {
            warn!(alarm_id = %id, reason = outcome.as_label(), "cancel rejected");
        }
        self.sink.emit(Notice::now(id, kind));
    }

    /// Joins workers that have finished exiting. Non-blocking.
    pub fn reap(&mut self) -> usize {
        self.supervisor.reap()
    }

    /// Waits up to `timeout` for every cancelled worker to exit and be joined.
    pub fn await_retired(&mut self, timeout: Duration) -> bool {
        self.supervisor.await_retired(timeout)
    }

    /// Runs `f` against the registry under shared access.
    pub fn inspect<R>(&self, f: impl FnOnce(&AlarmRegistry) -> R) -> R {
        let registry = self.registry.read();
        f(&registry)
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Empties the registry, stops every worker and joins them all.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        let woken = {
            let mut registry = self.registry.write();
            registry.clear();
            self.supervisor.retire_all()
        };
        for signal in &woken {
            signal.notify();
        }
        self.supervisor.join_retiring();
        if !woken.is_empty() {
            info!(workers = woken.len(), "scheduler shut down");
        }
    }
}

/// # Panics
/// Panics on any violation. The registry is shared with every display worker
/// and cannot be repaired in place.
fn enforce_invariants(id: AlarmId, checked: Result<(), InvariantViolation>) {
    if let Err(violation) = checked {
        error!(alarm_id = %id, reason = violation.as_label(), "registry invariant violated");
        panic!("registry invariant violated: {violation}");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
