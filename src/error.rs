//! Error types used by the orchestration run, hooks, and managed tasks.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`] — errors surfaced by an orchestration run itself.
//! - [`HookError`] — failures of the shutdown/cleanup hooks.
//! - [`TaskError`] — errors raised by individual managed tasks.
//!
//! A hook or task failure never aborts the shutdown sequence: draining and
//! cleanup are always attempted, and the first hook error is returned from
//! [`Orchestrator::run`](crate::Orchestrator::run) once the run reaches
//! `Stopped`. A timed-out shutdown hook is **not** an error anywhere in this
//! crate; it is a normal [`TimeoutOutcome`](crate::TimeoutOutcome).

use thiserror::Error;

/// # Errors surfaced by an orchestration run.
///
/// Returned by [`Orchestrator::run`](crate::Orchestrator::run) after the full
/// state sequence has been attempted.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// OS signal registration failed; the run cannot observe termination
    /// requests. Managed tasks are still cancelled and drained before this
    /// is returned.
    #[error("signal registration failed: {0}")]
    Signal(#[source] std::io::Error),

    /// Another orchestrator in this process already owns the signal
    /// subscription. Exactly one run may be active at a time.
    #[error("signal subscription already owned by another orchestrator")]
    SignalBusy,

    /// The shutdown hook completed within the grace period but returned an
    /// error (or panicked). Draining and cleanup still ran.
    #[error("shutdown hook: {0}")]
    Shutdown(#[source] HookError),

    /// The cleanup hook returned an error (or panicked).
    #[error("cleanup hook: {0}")]
    Cleanup(#[source] HookError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Signal(_) => "runtime_signal",
            RuntimeError::SignalBusy => "runtime_signal_busy",
            RuntimeError::Shutdown(_) => "runtime_shutdown_hook",
            RuntimeError::Cleanup(_) => "runtime_cleanup_hook",
        }
    }
}

/// # Failures of a shutdown or cleanup hook.
///
/// Hooks are isolated: a failing or panicking hook is reported, but the
/// remaining sequence steps still run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HookError {
    /// The hook returned an error.
    #[error("hook failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The hook panicked; the panic was caught at the hook boundary.
    #[error("hook panicked: {reason}")]
    Panicked {
        /// Panic payload rendered as text.
        reason: String,
    },
}

impl HookError {
    /// Creates a [`HookError::Failed`] from any displayable error.
    ///
    /// # Example
    /// ```
    /// use graceful::HookError;
    ///
    /// let err = HookError::fail("listener refused to close");
    /// assert_eq!(err.to_string(), "hook failed: listener refused to close");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        HookError::Failed {
            error: error.to_string(),
        }
    }

    /// Builds a [`HookError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        HookError::Panicked {
            reason: panic_message(payload.as_ref()),
        }
    }
}

/// Renders a caught panic payload as text (payloads are `&str` or `String`
/// in practice).
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// # Errors produced by managed task execution.
///
/// A failing task is reported through the event bus as
/// [`EventKind::TaskFailed`](crate::EventKind::TaskFailed) and never aborts
/// the run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task observed cancellation and exited; treated as a graceful stop,
    /// not a failure.
    #[error("cancelled")]
    Canceled,
}

impl TaskError {
    /// Creates a [`TaskError::Fail`] from any displayable error.
    pub fn fail(error: impl std::fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }
}
