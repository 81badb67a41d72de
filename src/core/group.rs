//! # TaskGroup: a rendezvous barrier over a count of outstanding work.
//!
//! [`TaskGroup`] counts concurrently running units of work and exposes an
//! async barrier that completes when the count returns to zero. It only
//! counts — it never inspects task identity.
//!
//! ## Contract
//! - Every [`add`](TaskGroup::add) must be matched by exactly one
//!   [`done`](TaskGroup::done).
//! - Calling `done()` without a matching prior `add()` is a fatal usage
//!   error and **panics** — the counter never silently clamps at zero.
//! - All expected `add` calls must happen-before [`wait`](TaskGroup::wait);
//!   a `wait()` racing a concurrent `add()` may return early.
//! - Reuse after `wait()` has returned is permitted: a fresh `add`/`done`
//!   cycle behaves like a new barrier, matching `sync.WaitGroup`. The group
//!   cannot tell a late registration from a new cycle, so misuse of this
//!   form is left to the happens-before rule above rather than made a hard
//!   fault like underflow.
//!
//! The counter is mutated only through its own atomic operations; no external
//! lock guards it. Waiters are woken through a [`tokio::sync::Notify`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Cloneable barrier tracking outstanding units of work.
///
/// Clones share the same counter, so a group can be handed to every managed
/// task (and to external collaborators such as a server's connection loop).
#[derive(Clone, Default)]
pub struct TaskGroup {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    count: AtomicUsize,
    notify: Notify,
}

impl TaskGroup {
    /// Creates an empty group (counter at zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// Increases the outstanding-work counter by `n`.
    ///
    /// # Panics
    /// Panics if `n == 0`; registering nothing is a usage error.
    pub fn add(&self, n: usize) {
        assert!(n >= 1, "TaskGroup::add(0) is a usage error");
        self.inner.count.fetch_add(n, Ordering::AcqRel);
    }

    /// Decreases the outstanding-work counter by 1, waking waiters when the
    /// count reaches zero.
    ///
    /// # Panics
    /// Panics if called without a matching prior [`add`](TaskGroup::add).
    /// `checked_sub` inside the atomic update keeps the counter from ever
    /// wrapping below zero, even under concurrent misuse.
    pub fn done(&self) {
        let prev = self
            .inner
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1))
            .unwrap_or_else(|_| panic!("TaskGroup::done() called without matching add()"));
        if prev == 1 {
            self.inner.notify.notify_waiters();
        }
    }

    /// Waits until the counter reaches zero. Returns immediately if it is
    /// already zero.
    pub async fn wait(&self) {
        loop {
            // Register interest before checking, so a done() landing between
            // the check and the await still wakes this waiter.
            let notified = self.inner.notify.notified();
            if self.inner.count.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Current outstanding count (racy by nature; useful for logs and tests).
    pub fn outstanding(&self) -> usize {
        self.inner.count.load(Ordering::Acquire)
    }
}
