//! Reader-preferring readers-writer gate.
//!
//! A turnstile protects one value shared between a single mutating thread and
//! many reading threads. It is built from two pieces:
//!
//! - a **gate**: a mutex-protected count of readers currently inside;
//! - a **resource token**: a binary token (see [`Token`]) that whoever touches
//!   the protected value must hold.
//!
//! # Protocol
//!
//! **Reader enter:**
//! 1. Lock the gate, increment the reader count
//! 2. If this is the first reader, take the token on behalf of all readers
//! 3. Unlock the gate
//!
//! **Reader leave:**
//! 1. Lock the gate, decrement the reader count
//! 2. If this was the last reader, give the token back
//! 3. Unlock the gate
//!
//! **Writer:** take the token directly, mutate, give it back.
//!
//! # Trade-offs
//!
//! - **Pros**: readers never wait on each other; a reader arriving during a
//!   read phase joins it immediately
//! - **Cons**: a steady stream of overlapping readers can starve the writer.
//!   Acceptable here because every critical section on both sides is short
//!   and bounded.
//!
//! ```text
//!   readers:   R1 ──[enter]────────────────[leave]
//!              R2 ────────[enter]───[leave]
//!   token:         take ◄──────── read phase ──────► give
//!   writer:                 W ....... blocked ........ take ──[mutate]── give
//! ```

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

use crate::token::Token;

/// A value guarded by a reader-preferring readers-writer gate.
///
/// Access goes through RAII guards: [`Turnstile::read`] for shared access and
/// [`Turnstile::write`] for exclusive access. Dropping a guard releases it.
pub struct Turnstile<T> {
    /// Number of readers inside the current read phase.
    readers: Mutex<usize>,
    /// Held by the read phase as a whole, or by the writer.
    token: Token,
    data: UnsafeCell<T>,
}

// SAFETY: the token guarantees that `&mut T` (writer) and `&T` (readers) are
// never handed out at the same time. Readers on several threads share `&T`,
// hence `T: Sync`; the writer may run on any thread, hence `T: Send`.
unsafe impl<T: Send> Send for Turnstile<T> {}
unsafe impl<T: Send + Sync> Sync for Turnstile<T> {}

impl<T> Turnstile<T> {
    pub fn new(value: T) -> Self {
        Self {
            readers: Mutex::new(0),
            token: Token::new(),
            data: UnsafeCell::new(value),
        }
    }

    /// Enters the current read phase, starting one if none is active.
    ///
    /// Blocks only while a writer holds the token.
    pub fn read(&self) -> ReadGuard<'_, T> {
        let mut readers = self.readers.lock();
        *readers += 1;
        if *readers == 1 {
            // Still holding the gate: later readers queue on it until the
            // token is ours, then join the phase without touching the token.
            self.token.take();
        }
        drop(readers);
        ReadGuard { turnstile: self }
    }

    /// Takes exclusive access.
    ///
    /// Blocks while any reader is inside a read phase or another writer holds
    /// the token.
    pub fn write(&self) -> WriteGuard<'_, T> {
        self.token.take();
        WriteGuard { turnstile: self }
    }

    /// Number of readers currently inside a read phase.
    #[cfg(test)]
    pub(crate) fn active_readers(&self) -> usize {
        *self.readers.lock()
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> T {
        self.data.into_inner()
    }

    fn leave_read(&self) {
        let mut readers = self.readers.lock();
        *readers = readers
            .checked_sub(1)
            .expect("turnstile reader count underflow");
        if *readers == 0 {
            self.token.give();
        }
    }
}

/// Shared access to the value inside a [`Turnstile`].
pub struct ReadGuard<'a, T> {
    turnstile: &'a Turnstile<T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: the read phase holds the token, so no writer can hold `&mut T`.
        unsafe { &*self.turnstile.data.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.turnstile.leave_read();
    }
}

/// Exclusive access to the value inside a [`Turnstile`].
pub struct WriteGuard<'a, T> {
    turnstile: &'a Turnstile<T>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: we hold the token exclusively.
        unsafe { &*self.turnstile.data.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: we hold the token exclusively and `&mut self` prevents
        // aliasing through this guard.
        unsafe { &mut *self.turnstile.data.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.turnstile.token.give();
    }
}
