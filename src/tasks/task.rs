//! # Task abstraction.
//!
//! This module defines the [`Task`] trait (async, cancelable). The common
//! handle type is [`TaskRef`], an `Arc<dyn Task>` suitable for sharing across
//! the runtime.
//!
//! A managed task receives a [`CancellationToken`] and should select between
//! its own work and the token to stop cooperatively during shutdown. The
//! orchestrator never forcibly interrupts a task: cancellation is observed
//! voluntarily, and the drain phase waits for the task's natural exit.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a managed task.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable unit of work.
///
/// A `Task` has a stable [`name`](Task::name) and an async [`run`](Task::run)
/// method that receives a [`CancellationToken`]. Implementors should regularly
/// check cancellation and exit promptly during shutdown.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use graceful::{Task, TaskError};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Task for Demo {
///     fn name(&self) -> &str { "demo" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Ok(());
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes the task until completion or cancellation.
    ///
    /// Returning `Err(TaskError::Canceled)` after observing cancellation is
    /// treated as a graceful stop, not a failure.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}
