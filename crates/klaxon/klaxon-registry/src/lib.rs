mod entry;
mod error;
mod registry;

pub use entry::AlarmEntry;
pub use error::InvariantViolation;
pub use registry::{AlarmRegistry, EntryKey, Submitted};
