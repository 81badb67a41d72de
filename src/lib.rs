//! # graceful
//!
//! **graceful** brings a long-running tokio service to a controlled stop.
//!
//! When a termination signal arrives, the [`Orchestrator`] cancels a shared
//! [`CancellationToken`], runs an optional shutdown hook bounded by a grace
//! period, waits for every registered unit of work to finish, and finally
//! runs an optional unbounded cleanup hook.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskRef    │   │   TaskRef    │   │   TaskRef    │
//!     │(user task #1)│   │(user task #2)│   │(user task #3)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Orchestrator (lifecycle coordinator)                             │
//! │  - CancellationToken (one-shot cancellation broadcast)            │
//! │  - TaskGroup (drain barrier: add/done/wait)                       │
//! │  - Bus (broadcast lifecycle events)                               │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        │ spawns (add(1) before, done() after)             │
//!        ▼                                                  ▼
//!   managed tasks observe the token             Bus ──► SubscriberSet
//!   and exit on cancellation                            ▼    ▼    ▼
//!                                                     sub1  sub2  subN
//! ```
//!
//! ### Shutdown sequence
//! ```text
//! Idle ─► Running ─► Cancelling ─► ShuttingDown ─► Draining ─► CleaningUp ─► Stopped
//!
//! Running:       tasks spawned, each registered with the TaskGroup
//! Cancelling:    OS signal observed → publish ShutdownRequested
//! ShuttingDown:  token cancelled (all tasks wake), shutdown hook runs
//!                through run_with_deadline(grace); TimedOut never blocks
//!                the sequence — the hook keeps running detached
//! Draining:      TaskGroup::wait() — unbounded by design; the grace
//!                period governs only the shutdown hook
//! CleaningUp:    cleanup hook runs inline, unbounded, always attempted
//! Stopped:       subscribers flushed, signal lease released
//! ```
//!
//! ## Timing contract
//! - Cancellation is visible before the shutdown hook starts.
//! - The shutdown hook's *start* (not completion) happens-before the drain.
//! - Drain completion happens-before cleanup.
//! - A timed-out shutdown hook is **detached, never aborted**: the deadline
//!   bounds the caller's wait, not the hook's lifetime.
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use graceful::{Orchestrator, ShutdownSpec, TaskFn, TaskRef};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let spec = ShutdownSpec::new(Duration::from_secs(10))
//!         .on_shutdown(|| async {
//!             // stop accepting new work (close listeners, etc.)
//!             Ok(())
//!         })
//!         .on_cleanup(|| async {
//!             // close database pools, flush buffers, ...
//!             Ok(())
//!         });
//!
//!     let worker: TaskRef = TaskFn::arc("worker", |ctx: CancellationToken| async move {
//!         loop {
//!             tokio::select! {
//!                 _ = ctx.cancelled() => return Ok(()),
//!                 _ = tokio::time::sleep(Duration::from_millis(250)) => {
//!                     // do work...
//!                 }
//!             }
//!         }
//!     });
//!
//!     let orc = Orchestrator::new(spec, Vec::new());
//!     orc.run(vec![worker]).await?;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{Orchestrator, ShutdownSpec, TaskGroup, TimeoutOutcome, run_with_deadline};
pub use error::{HookError, RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Task, TaskFn, TaskRef};

// The cancellation primitive observed by managed tasks.
pub use tokio_util::sync::CancellationToken;

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
