//! Alarm scheduling engine.
//!
//! ```text
//!  command thread                          display workers (one per alarm)
//!  ──────────────                          ───────────────────────────────
//!  Scheduler::submit(cmd)                   loop {
//!    ├─ turnstile.write()  ◄── excludes ──►   turnstile.read()
//!    ├─ registry.submit(cmd)                  ├─ terminate?  → WorkerExited, leave
//!    ├─ Created  → supervisor.spawn ───────►  ├─ changed?    → ReplacementApplied
//!    ├─ Pending  → registry.sweep()           ├─ deadline?   → Displayed
//!    │             supervisor.retire(id)      release read
//!    ├─ notice to sink                        signal.wait(poll_interval)
//!    └─ release write, wake retired ───────►  }
//!                                             exit channel → supervisor.reap → join
//! ```

mod error;
mod scheduler;
mod signal;
mod supervisor;
mod worker;

pub use error::SchedulerError;
pub use scheduler::{Scheduler, SchedulerConfig};
pub use supervisor::Supervisor;
