//! # ShutdownSpec: the hooks and grace period for one run.
//!
//! [`ShutdownSpec`] bundles an optional shutdown hook, an optional cleanup
//! hook, and a non-negative grace period. It is immutable once a run starts
//! (the orchestrator consumes it).
//!
//! - **Shutdown hook** — runs once, right after cancellation, bounded by the
//!   grace period via [`run_with_deadline`](crate::run_with_deadline).
//!   Typical use: stop accepting new work (close listeners, reject RPCs).
//! - **Cleanup hook** — runs once after draining, unbounded, always attempted
//!   regardless of the shutdown hook's outcome. Typical use: close pools,
//!   flush buffers.
//! - **Grace period** — bounds only the shutdown hook, never the drain.
//!   `Duration::ZERO` means the shutdown hook is not waited on at all.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::HookError;

/// Boxed future produced by a hook.
pub(crate) type HookFuture = Pin<Box<dyn Future<Output = Result<(), HookError>> + Send>>;

/// A zero-argument, run-once callback.
pub(crate) type Hook = Box<dyn FnOnce() -> HookFuture + Send>;

/// Shutdown configuration for one orchestration run.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use graceful::ShutdownSpec;
///
/// let spec = ShutdownSpec::new(Duration::from_secs(10))
///     .on_shutdown(|| async {
///         // stop accepting new work
///         Ok(())
///     })
///     .on_cleanup(|| async {
///         // release resources
///         Ok(())
///     });
/// assert_eq!(spec.grace, Duration::from_secs(10));
/// ```
pub struct ShutdownSpec {
    pub(crate) shutdown: Option<Hook>,
    pub(crate) cleanup: Option<Hook>,
    /// Maximum duration the orchestrator waits for the shutdown hook before
    /// proceeding regardless of its completion.
    pub grace: Duration,
}

impl ShutdownSpec {
    /// Creates a spec with the given grace period and no hooks.
    pub fn new(grace: Duration) -> Self {
        Self {
            shutdown: None,
            cleanup: None,
            grace,
        }
    }

    /// Sets the shutdown hook (time-bounded by the grace period).
    pub fn on_shutdown<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.shutdown = Some(Box::new(move || Box::pin(f())));
        self
    }

    /// Sets the cleanup hook (unbounded, always attempted).
    pub fn on_cleanup<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.cleanup = Some(Box::new(move || Box::pin(f())));
        self
    }
}

impl Default for ShutdownSpec {
    /// No hooks, 30 second grace period.
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl std::fmt::Debug for ShutdownSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownSpec")
            .field("shutdown", &self.shutdown.is_some())
            .field("cleanup", &self.cleanup.is_some())
            .field("grace", &self.grace)
            .finish()
    }
}
