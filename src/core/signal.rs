//! # Cross-platform OS signal handling.
//!
//! Provides [`wait_for_shutdown_signal`], an async helper that completes when
//! the process receives a termination signal, and [`SignalLease`], which
//! scopes the process-wide signal subscription to exactly one live
//! orchestrator at a time.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::sync::atomic::{AtomicBool, Ordering};

/// True while some orchestrator holds the signal subscription.
static LEASE_HELD: AtomicBool = AtomicBool::new(false);

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal
/// registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal
/// registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Exclusive claim on the process-wide signal subscription.
///
/// Signal registration is process-global mutable state; exactly one
/// orchestrator may own it at a time. The lease is released on drop, which
/// the orchestrator ties to reaching its terminal state.
pub(crate) struct SignalLease(());

impl SignalLease {
    /// Claims the lease, or `None` if another orchestrator holds it.
    pub(crate) fn acquire() -> Option<Self> {
        LEASE_HELD
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SignalLease(()))
    }
}

impl Drop for SignalLease {
    fn drop(&mut self) {
        LEASE_HELD.store(false, Ordering::Release);
    }
}
