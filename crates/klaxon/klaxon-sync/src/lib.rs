mod token;
mod turnstile;

pub use turnstile::{ReadGuard, Turnstile, WriteGuard};
