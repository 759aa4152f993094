use klaxon_events::{AlarmId, EntryKind};
use thiserror::Error;

/// A broken structural rule of the registry sequence.
///
/// Any of these means a bug in the registry itself; callers treat them as
/// fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("entry at position {at} (alarm {id}) is out of order")]
    Unsorted { at: usize, id: AlarmId },

    #[error("alarm {id} has more than one {kind:?} entry")]
    Duplicate { id: AlarmId, kind: EntryKind },

    #[error("cancel for alarm {id} is not followed by its alarm")]
    OrphanCancel { id: AlarmId },

    #[error("sequence holds {ordered} keys but the arena holds {stored} entries")]
    LostEntry { ordered: usize, stored: usize },
}

impl InvariantViolation {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            InvariantViolation::Unsorted { .. } => "registry_unsorted",
            InvariantViolation::Duplicate { .. } => "registry_duplicate",
            InvariantViolation::OrphanCancel { .. } => "registry_orphan_cancel",
            InvariantViolation::LostEntry { .. } => "registry_lost_entry",
        }
    }
}
