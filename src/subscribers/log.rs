//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [starting] task=worker
//! [stopped] task=worker
//! [failed] task=worker err="connection refused"
//! [shutdown-requested]
//! [cancelled]
//! [shutdown-completed] grace=10000ms
//! [grace-exceeded] grace=1000ms
//! [draining]
//! [drained]
//! [stopped]
//! ```

use crate::events::{Event, EventKind};
use async_trait::async_trait;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use —
/// implement a custom [`Subscribe`](crate::Subscribe) for structured logging
/// or metrics collection.
pub struct LogWriter;

#[async_trait]
impl crate::subscribers::Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskStarting => {
                println!("[starting] task={:?}", e.task);
            }
            EventKind::TaskStopped => {
                println!("[stopped] task={:?}", e.task);
            }
            EventKind::TaskFailed => {
                println!("[failed] task={:?} err={:?}", e.task, e.reason);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::Cancelled => {
                println!("[cancelled]");
            }
            EventKind::ShutdownCompleted => {
                println!("[shutdown-completed] grace={:?}ms", e.timeout_ms);
            }
            EventKind::ShutdownFailed => {
                println!("[shutdown-failed] err={:?}", e.reason);
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded] grace={:?}ms", e.timeout_ms);
            }
            EventKind::Draining => {
                println!("[draining]");
            }
            EventKind::Drained => {
                println!("[drained]");
            }
            EventKind::CleanupFailed => {
                println!("[cleanup-failed] err={:?}", e.reason);
            }
            EventKind::Stopped => {
                println!("[stopped]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
