//! Binary resource token shared by the turnstile's readers and writer.
//!
//! Unlike a mutex guard, the token is not tied to the thread that took it:
//! the first reader of a read phase takes it and whichever reader leaves last
//! gives it back.

use parking_lot::{Condvar, Mutex};

pub(crate) struct Token {
    held: Mutex<bool>,
    freed: Condvar,
}

impl Token {
    pub(crate) fn new() -> Self {
        Self {
            held: Mutex::new(false),
            freed: Condvar::new(),
        }
    }

    /// Blocks until the token is free, then takes it.
    pub(crate) fn take(&self) {
        let mut held = self.held.lock();
        while *held {
            self.freed.wait(&mut held);
        }
        *held = true;
    }

    /// Returns the token and wakes one waiter.
    ///
    /// # Panics
    /// Panics if the token is not held. That can only happen through a broken
    /// acquire/release pairing, and the protected data can no longer be trusted.
    pub(crate) fn give(&self) {
        let mut held = self.held.lock();
        assert!(*held, "turnstile token released while free");
        *held = false;
        drop(held);
        self.freed.notify_one();
    }

    #[cfg(test)]
    pub(crate) fn is_held(&self) -> bool {
        *self.held.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn token_can_be_returned_by_another_thread() {
        let token = Arc::new(Token::new());
        token.take();
        assert!(token.is_held());

        let other = Arc::clone(&token);
        thread::spawn(move || other.give()).join().unwrap();

        assert!(!token.is_held());
        token.take();
        token.give();
    }

    #[test]
    #[should_panic(expected = "released while free")]
    fn giving_a_free_token_panics() {
        Token::new().give();
    }
}
