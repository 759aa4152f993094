// AlarmRegistry: ordered sequence of pending alarm and cancel requests
//
// Layout
// ------
//     entries: Slab<AlarmEntry>      arena, one slot per live entry
//     order:   Vec<EntryKey>         arena keys sorted by (id, kind)
//
// The arena key of a Create entry stays valid from insertion until the sweep
// removes it, whatever else is inserted or removed around it. Display workers
// bind to that key and look their entry up in O(1) without walking `order`.
//
// Ordering
// --------
// `order` is sorted by (AlarmId, EntryKind) and EntryKind sorts Cancel before
// Create. With at most one entry of each kind per id, a pending cancel is
// therefore always the immediate predecessor of the alarm it targets:
//
//     [ C(3) ][ Cancel(5) ][ C(5) ][ C(9) ]
//              └── pair ──┘
//
// Removal only ever happens to such adjacent pairs (sweep) or to a Create that
// was just inserted (retract).

use klaxon_events::{AlarmId, Command, EntryKind, Outcome};
use slab::Slab;

use crate::entry::AlarmEntry;
use crate::error::InvariantViolation;

/// Stable handle to an entry in the registry arena.
pub type EntryKey = usize;

/// Result of [`AlarmRegistry::submit`], carrying the arena key of the alarm
/// entry where one was created or touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submitted {
    Created(EntryKey),
    Replaced(EntryKey),
    CancelPending,
    CancelUnmatched,
    CancelDuplicate,
}

impl Submitted {
    pub fn outcome(&self) -> Outcome {
        match self {
            Submitted::Created(_) => Outcome::Created,
            Submitted::Replaced(_) => Outcome::Replaced,
            Submitted::CancelPending => Outcome::CancelPending,
            Submitted::CancelUnmatched => Outcome::CancelUnmatched,
            Submitted::CancelDuplicate => Outcome::CancelDuplicate,
        }
    }
}

#[derive(Debug, Default)]
pub struct AlarmRegistry {
    entries: Slab<AlarmEntry>,
    order: Vec<EntryKey>,
}

impl AlarmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one command to the sequence.
    ///
    /// Requires exclusive access, which the `&mut self` receiver enforces:
    /// shared callers only ever see the sequence before or after a call.
    ///
    /// - Create, id unknown: insert at the sorted position.
    /// - Create, id live: overwrite interval and message in place, set `changed`.
    /// - Cancel, id live: insert the cancel right before the alarm; removal
    ///   is left to [`sweep`](Self::sweep).
    /// - Cancel, cancel already pending: discard the new one.
    /// - Cancel, id unknown: discard.
    pub fn submit(&mut self, command: Command) -> Submitted {
        let id = command.id();
        let start = self.order.partition_point(|&key| self.entries[key].id() < id);

        // At most one cancel followed by one create share an id.
        let mut cancel_at = None;
        let mut create_at = None;
        for (offset, &key) in self.order[start..].iter().enumerate() {
            let entry = &self.entries[key];
            if entry.id() != id {
                break;
            }
            match entry.kind() {
                EntryKind::Cancel => cancel_at = Some(start + offset),
                EntryKind::Create => create_at = Some(start + offset),
            }
        }

        match command {
            Command::Create {
                interval_seconds,
                message,
                ..
            } => match create_at {
                Some(at) => {
                    let key = self.order[at];
                    self.entries[key].replace(interval_seconds, message);
                    Submitted::Replaced(key)
                }
                None => {
                    let key = self
                        .entries
                        .insert(AlarmEntry::create(id, interval_seconds, message));
                    let at = cancel_at.map_or(start, |c| c + 1);
                    self.order.insert(at, key);
                    Submitted::Created(key)
                }
            },
            Command::Cancel { .. } => match (cancel_at, create_at) {
                (Some(_), _) => Submitted::CancelDuplicate,
                (None, Some(at)) => {
                    let key = self.entries.insert(AlarmEntry::cancel(id));
                    self.order.insert(at, key);
                    Submitted::CancelPending
                }
                (None, None) => Submitted::CancelUnmatched,
            },
        }
    }

    /// Removes every adjacent (Cancel, Create) pair for the same id.
    ///
    /// Returns the ids of the removed alarms in ascending order.
    pub fn sweep(&mut self) -> Vec<AlarmId> {
        let mut matched = Vec::new();
        let mut kept = Vec::with_capacity(self.order.len());
        let mut i = 0;

        while i < self.order.len() {
            let key = self.order[i];
            let paired = matches!(self.order.get(i + 1), Some(&next) if self.is_pair(key, next));
            if paired {
                let cancel = self.entries.remove(key);
                self.entries.remove(self.order[i + 1]);
                matched.push(cancel.id());
                i += 2;
            } else {
                kept.push(key);
                i += 1;
            }
        }

        self.order = kept;
        matched
    }

    /// Takes back a freshly created alarm entry, leaving the sequence as it
    /// was before the `submit` that created it.
    pub fn retract(&mut self, key: EntryKey) -> Option<AlarmEntry> {
        let at = self.order.iter().position(|&k| k == key)?;
        self.order.remove(at);
        Some(self.entries.remove(key))
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    #[inline]
    pub fn get(&self, key: EntryKey) -> Option<&AlarmEntry> {
        self.entries.get(key)
    }

    /// Entries in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = &AlarmEntry> + '_ {
        self.order.iter().map(|&key| &self.entries[key])
    }

    /// Ids of the live alarms (Create entries), ascending.
    pub fn live_ids(&self) -> Vec<AlarmId> {
        self.iter()
            .filter(|e| e.kind() == EntryKind::Create)
            .map(AlarmEntry::id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Verifies the structural rules of the sequence:
    /// strictly ascending by `(id, kind)`, every cancel followed by its alarm,
    /// and no arena entry missing from the sequence.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.order.len() != self.entries.len() {
            return Err(InvariantViolation::LostEntry {
                ordered: self.order.len(),
                stored: self.entries.len(),
            });
        }

        for (at, pair) in self.order.windows(2).enumerate() {
            let (prev, next) = (&self.entries[pair[0]], &self.entries[pair[1]]);
            if prev.order_key() == next.order_key() {
                return Err(InvariantViolation::Duplicate {
                    id: next.id(),
                    kind: next.kind(),
                });
            }
            if prev.order_key() > next.order_key() {
                return Err(InvariantViolation::Unsorted {
                    at: at + 1,
                    id: next.id(),
                });
            }
        }

        for (at, &key) in self.order.iter().enumerate() {
            let entry = &self.entries[key];
            if entry.kind() != EntryKind::Cancel {
                continue;
            }
            let targeted = matches!(self.order.get(at + 1), Some(&next) if self.is_pair(key, next));
            if !targeted {
                return Err(InvariantViolation::OrphanCancel { id: entry.id() });
            }
        }

        Ok(())
    }

    fn is_pair(&self, cancel: EntryKey, alarm: EntryKey) -> bool {
        let (cancel, alarm) = (&self.entries[cancel], &self.entries[alarm]);
        cancel.kind() == EntryKind::Cancel
            && alarm.kind() == EntryKind::Create
            && cancel.id() == alarm.id()
    }
}

impl std::ops::Index<EntryKey> for AlarmRegistry {
    type Output = AlarmEntry;

    fn index(&self, key: EntryKey) -> &AlarmEntry {
        &self.entries[key]
    }
}
