use klaxon_events::AlarmId;
use thiserror::Error;

/// Errors that stop the scheduler from accepting more work.
///
/// Rejected cancels are not errors here; they are ordinary
/// [`Outcome`](klaxon_events::Outcome)s.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The OS refused to start a display worker thread. The alarm entry that
    /// triggered the spawn has already been taken back out of the registry.
    #[error("failed to spawn display worker for alarm {id}")]
    Spawn {
        id: AlarmId,
        #[source]
        source: std::io::Error,
    },
}

impl SchedulerError {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::Spawn { .. } => "worker_spawn_failed",
        }
    }
}
