//! # Deadline guard: race an action against a grace period.
//!
//! [`run_with_deadline`] starts an action as its own tokio task, then waits
//! for the earlier of the action's natural completion or the deadline.
//!
//! ## Rules
//! - On [`TimeoutOutcome::TimedOut`] the action is **detached, never
//!   aborted**: it keeps running in the background and only the caller's wait
//!   ends. Graceful shutdown actions are trusted to eventually terminate; the
//!   guard bounds the caller's patience, not the work.
//! - A panicking action is isolated by the spawn boundary and reported as
//!   [`HookError::Panicked`] if it lands within the deadline.
//! - A zero deadline means the action is effectively not waited on at all.

use std::future::Future;
use std::time::Duration;

use tokio::time;

use crate::error::HookError;

/// Outcome of one [`run_with_deadline`] invocation.
///
/// `TimedOut` is a normal outcome, not an error: the shutdown sequence
/// proceeds regardless.
#[derive(Debug)]
pub enum TimeoutOutcome {
    /// The action finished before the deadline; carries the action's own
    /// result (including a caught panic).
    CompletedInTime(Result<(), HookError>),
    /// The deadline elapsed first. The action keeps running detached.
    TimedOut,
}

impl TimeoutOutcome {
    /// True if the deadline elapsed before the action finished.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, TimeoutOutcome::TimedOut)
    }
}

/// Runs `action` on its own task and waits at most `deadline` for it.
///
/// Returns as soon as the action completes or the deadline elapses, whichever
/// comes first. The spawned task is never aborted.
pub async fn run_with_deadline<F>(action: F, deadline: Duration) -> TimeoutOutcome
where
    F: Future<Output = Result<(), HookError>> + Send + 'static,
{
    let handle = tokio::spawn(action);
    match time::timeout(deadline, handle).await {
        Ok(Ok(result)) => TimeoutOutcome::CompletedInTime(result),
        Ok(Err(join_err)) => match join_err.try_into_panic() {
            Ok(payload) => TimeoutOutcome::CompletedInTime(Err(HookError::from_panic(payload))),
            // The runtime never aborts the handle; treat a cancelled join
            // as a hook that went away without completing.
            Err(err) => TimeoutOutcome::CompletedInTime(Err(HookError::fail(err))),
        },
        Err(_elapsed) => TimeoutOutcome::TimedOut,
    }
}
