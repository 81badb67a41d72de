//! Runtime core: the shutdown orchestration itself.
//!
//! This module contains the coordinator and the primitives it is built from:
//! - [`orchestrator`]: signal capture, cancellation, hook execution, drain;
//! - [`group`]: the drain barrier counting outstanding units of work;
//! - [`guard`]: races an action against a grace period (detach on timeout);
//! - [`hooks`]: the shutdown/cleanup hook pair and grace period;
//! - [`signal`]: cross-platform termination signal handling.

mod group;
mod guard;
mod hooks;
mod orchestrator;
mod signal;

pub use group::TaskGroup;
pub use guard::{TimeoutOutcome, run_with_deadline};
pub use hooks::ShutdownSpec;
pub use orchestrator::Orchestrator;
