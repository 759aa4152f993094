#![forbid(unsafe_code)]

use std::fmt;

// AlarmId is chosen by the operator, so it is only unique among live alarms.
// repr(transparent) keeps the newtype the same layout as the u32 it wraps.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AlarmId(pub u32);

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request type of a registry entry.
///
/// Variant order matters: the derived `Ord` puts `Cancel` before `Create`,
/// which is the tie-break the registry uses for entries sharing an id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Cancel,
    Create,
}

/// A decoded operator request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start a periodic alarm, or replace the live alarm with the same id.
    Create {
        id: AlarmId,
        interval_seconds: u32,
        message: String,
    },
    /// Cancel the live alarm with this id.
    Cancel { id: AlarmId },
}

impl Command {
    #[inline]
    pub fn id(&self) -> AlarmId {
        match self {
            Command::Create { id, .. } | Command::Cancel { id } => *id,
        }
    }

    #[inline]
    pub fn kind(&self) -> EntryKind {
        match self {
            Command::Create { .. } => EntryKind::Create,
            Command::Cancel { .. } => EntryKind::Cancel,
        }
    }
}

/// What the registry did with a submitted command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A new Create entry was inserted.
    Created,
    /// An existing Create entry was updated in place.
    Replaced,
    /// A Cancel entry now sits in front of its target, waiting for the sweep.
    CancelPending,
    /// No live alarm with that id; the cancel was discarded.
    CancelUnmatched,
    /// A cancel for that id is already pending; the new one was discarded.
    CancelDuplicate,
}

impl Outcome {
    /// True for outcomes that are reported back to the operator as errors.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Outcome::CancelUnmatched | Outcome::CancelDuplicate)
    }

    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Replaced => "replaced",
            Outcome::CancelPending => "cancel_pending",
            Outcome::CancelUnmatched => "cancel_unmatched",
            Outcome::CancelDuplicate => "cancel_duplicate",
        }
    }
}
