use std::sync::atomic::{AtomicBool, Ordering};

use klaxon_events::{AlarmId, EntryKind};

/// One pending request in the registry.
///
/// Everything except `changed` is written only by the registry owner under
/// exclusive access. `changed` is atomic because the owning display worker
/// clears it while holding shared access.
#[derive(Debug)]
pub struct AlarmEntry {
    id: AlarmId,
    kind: EntryKind,
    /// Zero for cancel entries.
    interval_seconds: u32,
    /// Empty for cancel entries.
    message: String,
    changed: AtomicBool,
}

impl AlarmEntry {
    pub(crate) fn create(id: AlarmId, interval_seconds: u32, message: String) -> Self {
        Self {
            id,
            kind: EntryKind::Create,
            interval_seconds,
            message,
            changed: AtomicBool::new(false),
        }
    }

    pub(crate) fn cancel(id: AlarmId) -> Self {
        Self {
            id,
            kind: EntryKind::Cancel,
            interval_seconds: 0,
            message: String::new(),
            changed: AtomicBool::new(false),
        }
    }

    /// Overwrites interval and message together and flags the change for the
    /// owning worker.
    pub(crate) fn replace(&mut self, interval_seconds: u32, message: String) {
        self.interval_seconds = interval_seconds;
        self.message = message;
        *self.changed.get_mut() = true;
    }

    #[inline]
    pub fn id(&self) -> AlarmId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    #[inline]
    pub fn interval_seconds(&self) -> u32 {
        self.interval_seconds
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Sort key of the registry sequence.
    #[inline]
    pub fn order_key(&self) -> (AlarmId, EntryKind) {
        (self.id, self.kind)
    }

    pub fn is_changed(&self) -> bool {
        self.changed.load(Ordering::Acquire)
    }

    /// Reads and clears the change flag in one step.
    ///
    /// Only the worker bound to this entry may call this.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_sets_changed_once() {
        let mut entry = AlarmEntry::create(AlarmId(1), 5, "hi".into());
        assert!(!entry.is_changed());

        entry.replace(10, "bye".into());
        assert_eq!(entry.interval_seconds(), 10);
        assert_eq!(entry.message(), "bye");
        assert!(entry.is_changed());

        assert!(entry.take_changed());
        assert!(!entry.take_changed());
    }

    #[test]
    fn cancel_entries_carry_no_payload() {
        let entry = AlarmEntry::cancel(AlarmId(3));
        assert_eq!(entry.kind(), EntryKind::Cancel);
        assert_eq!(entry.interval_seconds(), 0);
        assert!(entry.message().is_empty());
    }
}
