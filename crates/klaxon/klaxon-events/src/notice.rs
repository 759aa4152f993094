//! Observable events produced by the scheduler and its display workers.
//!
//! The core only decides *which* notice fires and *when*; turning a notice
//! into text is the job of whatever [`NoticeSink`] the process installs.

use std::time::SystemTime;

use crate::AlarmId;

/// Why a cancel request was turned away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// No live alarm carries the requested id.
    Unmatched,
    /// A cancel for the same id is already waiting to be paired.
    Duplicate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    /// First request for this id was accepted and a worker started.
    Accepted { interval_seconds: u32, message: String },
    /// A request for a live id replaced its interval and message.
    Replaced { interval_seconds: u32, message: String },
    CancelAccepted,
    CancelRejected(Rejection),
    /// Periodic display of an alarm that was never replaced.
    Displayed { interval_seconds: u32, message: String },
    /// The worker picked up a replacement.
    ReplacementApplied { interval_seconds: u32, message: String },
    /// Periodic display of an alarm after at least one replacement.
    ReplacementDisplayed { interval_seconds: u32, message: String },
    /// The worker saw its terminate flag and is leaving. Carries the last
    /// interval and message the worker displayed.
    WorkerExited { interval_seconds: u32, message: String },
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub id: AlarmId,
    pub at: SystemTime,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn now(id: AlarmId, kind: NoticeKind) -> Self {
        Self {
            id,
            at: SystemTime::now(),
            kind,
        }
    }

    /// Short stable label for logs.
    pub fn label(&self) -> &'static str {
        match self.kind {
            NoticeKind::Accepted { .. } => "accepted",
            NoticeKind::Replaced { .. } => "replaced",
            NoticeKind::CancelAccepted => "cancel_accepted",
            NoticeKind::CancelRejected(Rejection::Unmatched) => "cancel_unmatched",
            NoticeKind::CancelRejected(Rejection::Duplicate) => "cancel_duplicate",
            NoticeKind::Displayed { .. } => "displayed",
            NoticeKind::ReplacementApplied { .. } => "replacement_applied",
            NoticeKind::ReplacementDisplayed { .. } => "replacement_displayed",
            NoticeKind::WorkerExited { .. } => "worker_exited",
        }
    }
}

/// Destination for notices.
///
/// Called from the command thread and from every display worker, sometimes
/// while the caller holds registry access, so implementations must not
/// block for long.
pub trait NoticeSink: Send + Sync {
    fn emit(&self, notice: Notice);
}
