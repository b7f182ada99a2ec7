//! Poll, diff, generate, publish.
//!
//! [`engine::SyncEngine`] owns the single-flight state machine; [`scheduler::Scheduler`]
//! drives it on a timer and reacts to throttling.

pub(crate) mod engine;
pub(crate) mod scheduler;
pub(crate) mod state;
