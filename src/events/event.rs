//! # Lifecycle events emitted during an orchestration run.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Task events**: managed task execution flow (starting, stopped, failed)
//! - **Sequence events**: shutdown state-machine transitions (requested,
//!   cancelled, shutdown hook outcome, drain, cleanup, stopped)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task
//! names, reasons, and the grace period in effect.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use graceful::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("http-server")
//!     .with_reason("bind error");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("http-server"));
//! assert_eq!(ev.reason.as_deref(), Some("bind error"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Managed task events ===
    /// Managed task is starting.
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskStarting,

    /// Managed task stopped (finished successfully **or** exited on
    /// cancellation).
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskStopped,

    /// Managed task failed (error or panic). Never aborts the run.
    ///
    /// Sets: `task`, `reason`, `at`, `seq`.
    TaskFailed,

    // === Shutdown sequence events ===
    /// Termination request observed (OS signal). `Running → Cancelling`.
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// CancellationToken cancelled; all managed tasks woken.
    /// `Cancelling → ShuttingDown`.
    ///
    /// Sets: `at`, `seq`.
    Cancelled,

    /// Shutdown hook finished within the grace period (or no hook was
    /// configured).
    ///
    /// Sets: `at`, `seq`; `timeout_ms` when a hook ran.
    ShutdownCompleted,

    /// Shutdown hook finished within the grace period but returned an error
    /// or panicked. The sequence still proceeds.
    ///
    /// Sets: `reason`, `timeout_ms`, `at`, `seq`.
    ShutdownFailed,

    /// Grace period elapsed before the shutdown hook finished. The hook keeps
    /// running detached; the sequence proceeds to draining.
    ///
    /// Sets: `timeout_ms`, `at`, `seq`.
    GraceExceeded,

    /// Drain barrier wait started. `ShuttingDown → Draining`.
    ///
    /// Sets: `at`, `seq`.
    Draining,

    /// All registered tasks called `done()`. `Draining → CleaningUp`.
    ///
    /// Sets: `at`, `seq`.
    Drained,

    /// Cleanup hook returned an error or panicked. The run still reaches
    /// `Stopped`.
    ///
    /// Sets: `reason`, `at`, `seq`.
    CleanupFailed,

    /// Terminal state reached; published exactly once per run.
    ///
    /// Sets: `at`, `seq`.
    Stopped,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the managed task, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (hook/task errors, panic payloads).
    pub reason: Option<Arc<str>>,
    /// Grace period in effect, in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            at: SystemTime::now(),
            task: None,
            reason: None,
            timeout_ms: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the grace period in effect (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }
}
