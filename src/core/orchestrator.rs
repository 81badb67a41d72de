//! # Orchestrator: signal capture, cancellation, and the shutdown sequence.
//!
//! The [`Orchestrator`] owns the event bus, a [`SubscriberSet`], the shared
//! [`CancellationToken`], and the [`TaskGroup`] drain barrier. It spawns
//! managed tasks, blocks until a termination signal arrives, and then drives
//! the documented shutdown sequence.
//!
//! ## Key responsibilities
//! - register managed tasks with the [`TaskGroup`] (`add(1)` before spawn,
//!   `done()` on exit, panic-safe)
//! - handle OS termination signals (SIGINT/SIGTERM/SIGQUIT/Ctrl-C), exactly
//!   one request consumed per run
//! - cancel the token, run the shutdown hook through
//!   [`run_with_deadline`](crate::run_with_deadline), drain, run cleanup
//! - **fan-out** lifecycle events from the [`Bus`] via [`SubscriberSet`]
//!
//! ## Shutdown path
//! ```text
//! signal::wait_for_shutdown_signal()
//!   └─► Bus.publish(ShutdownRequested)                 Running → Cancelling
//!   └─► token.cancel() → Bus.publish(Cancelled)        Cancelling → ShuttingDown
//!   └─► run_with_deadline(shutdown hook, grace):
//!         ├─ CompletedInTime(Ok)  → ShutdownCompleted
//!         ├─ CompletedInTime(Err) → ShutdownFailed     (error surfaced, run continues)
//!         └─ TimedOut             → GraceExceeded      (hook keeps running detached)
//!   └─► Bus.publish(Draining)                          ShuttingDown → Draining
//!   └─► group.wait()   — unbounded → Bus.publish(Drained)
//!   └─► cleanup hook   — unbounded                     Draining → CleaningUp
//!   └─► Bus.publish(Stopped), flush subscribers        CleaningUp → Stopped
//! ```
//!
//! The run either completes the full state sequence or is itself interrupted
//! by a second, harder termination from the host environment. Hook and task
//! failures are surfaced, never escalated into an aborted sequence.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::broadcast, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::core::{
    group::TaskGroup,
    guard::{self, TimeoutOutcome},
    hooks::ShutdownSpec,
    signal::{self, SignalLease},
};
use crate::error::{HookError, RuntimeError, TaskError, panic_message};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::TaskRef;

/// Event bus ring-buffer capacity; plenty for a single shutdown sequence.
const BUS_CAPACITY: usize = 1024;

/// Lifecycle states of one orchestration run, in order.
///
/// The run advances monotonically and reaches [`State::Stopped`] exactly
/// once; [`Orchestrator::run`] consumes the orchestrator, so there is no
/// restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum State {
    Idle,
    Running,
    Cancelling,
    ShuttingDown,
    Draining,
    CleaningUp,
    Stopped,
}

/// Coordinates managed tasks, signal capture, and the shutdown sequence.
pub struct Orchestrator {
    spec: ShutdownSpec,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    group: TaskGroup,
    token: CancellationToken,
    state: State,
}

impl Orchestrator {
    /// Creates a new orchestrator with the given shutdown spec and
    /// subscribers.
    pub fn new(spec: ShutdownSpec, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        Self {
            spec,
            bus: Bus::new(BUS_CAPACITY),
            subs: Arc::new(SubscriberSet::new(subscribers)),
            group: TaskGroup::new(),
            token: CancellationToken::new(),
            state: State::Idle,
        }
    }

    /// Returns a handle to the drain barrier.
    ///
    /// External collaborators (e.g. a server's connection loop) can register
    /// their own in-flight work: `add(1)` before starting a unit, `done()`
    /// when it finishes. The drain phase waits for these too.
    pub fn group(&self) -> TaskGroup {
        self.group.clone()
    }

    /// Runs the managed tasks until a termination signal arrives, then drives
    /// the shutdown sequence to `Stopped`.
    ///
    /// Exactly one orchestrator per process may be running: a second
    /// concurrent call fails with [`RuntimeError::SignalBusy`]. The signal
    /// subscription is released when this returns.
    ///
    /// Hook failures are surfaced in the returned `Result` but never abort
    /// the sequence; draining and cleanup are always attempted.
    pub async fn run(self, tasks: Vec<TaskRef>) -> Result<(), RuntimeError> {
        let _lease = SignalLease::acquire().ok_or(RuntimeError::SignalBusy)?;
        self.run_until(tasks, signal::wait_for_shutdown_signal()).await
    }

    /// Runs the sequence with an explicit termination trigger.
    ///
    /// The trigger is the single external entry into the shutdown sequence;
    /// it is not part of the public API (in-process callers have no
    /// programmatic termination), but it gives tests a deterministic seam.
    pub(crate) async fn run_until<S>(
        mut self,
        tasks: Vec<TaskRef>,
        trigger: S,
    ) -> Result<(), RuntimeError>
    where
        S: Future<Output = std::io::Result<()>>,
    {
        let listener = self.subscriber_listener();

        // Idle → Running: every task is registered before it starts.
        self.advance(State::Running);
        for task in tasks {
            self.spawn_managed(task);
        }

        // Block until the termination request arrives. If registration
        // failed we cannot observe one; still cancel, drain, and clean up so
        // the process stops in an orderly way, and surface the error after.
        let mut first_err = match trigger.await {
            Ok(()) => None,
            Err(e) => Some(RuntimeError::Signal(e)),
        };

        // Running → Cancelling.
        self.advance(State::Cancelling);
        self.bus.publish(Event::new(EventKind::ShutdownRequested));

        // Cancelling → ShuttingDown: cancellation must be visible before the
        // shutdown hook starts.
        self.token.cancel();
        self.bus.publish(Event::new(EventKind::Cancelled));
        self.advance(State::ShuttingDown);

        if let Some(hook) = self.spec.shutdown.take() {
            let grace = self.spec.grace;
            match guard::run_with_deadline(hook(), grace).await {
                TimeoutOutcome::CompletedInTime(Ok(())) => {
                    self.bus
                        .publish(Event::new(EventKind::ShutdownCompleted).with_timeout(grace));
                }
                TimeoutOutcome::CompletedInTime(Err(err)) => {
                    self.bus.publish(
                        Event::new(EventKind::ShutdownFailed)
                            .with_timeout(grace)
                            .with_reason(err.to_string()),
                    );
                    first_err.get_or_insert(RuntimeError::Shutdown(err));
                }
                TimeoutOutcome::TimedOut => {
                    // The hook keeps running detached; the sequence proceeds.
                    self.bus
                        .publish(Event::new(EventKind::GraceExceeded).with_timeout(grace));
                }
            }
        } else {
            // A missing hook is a no-op that completes instantly.
            self.bus.publish(Event::new(EventKind::ShutdownCompleted));
        }

        // ShuttingDown → Draining: unconditional, regardless of the hook
        // outcome. No timeout applies here — the grace period governs only
        // the shutdown hook, not task completion.
        self.advance(State::Draining);
        self.bus.publish(Event::new(EventKind::Draining));
        self.group.wait().await;
        self.bus.publish(Event::new(EventKind::Drained));

        // Draining → CleaningUp: unbounded, no cancellation, always
        // attempted.
        self.advance(State::CleaningUp);
        if let Some(hook) = self.spec.cleanup.take() {
            let result = std::panic::AssertUnwindSafe(hook()).catch_unwind().await;
            let err = match result {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err),
                Err(payload) => Some(HookError::from_panic(payload)),
            };
            if let Some(err) = err {
                self.bus
                    .publish(Event::new(EventKind::CleanupFailed).with_reason(err.to_string()));
                first_err.get_or_insert(RuntimeError::Cleanup(err));
            }
        }

        // CleaningUp → Stopped: terminal, exactly once per run.
        self.advance(State::Stopped);
        self.bus.publish(Event::new(EventKind::Stopped));

        // Flush observers: closing the bus ends the listener once the last
        // task-side sender is gone, then the worker queues are drained.
        drop(self.bus);
        let _ = listener.await;
        if let Ok(set) = Arc::try_unwrap(self.subs) {
            set.shutdown().await;
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn advance(&mut self, next: State) {
        debug_assert!(self.state < next, "shutdown sequence must advance monotonically");
        self.state = next;
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget). Ends when the bus closes.
    fn subscriber_listener(&self) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Registers a task with the drain barrier and spawns it with a child
    /// token.
    ///
    /// `add(1)` happens strictly before the spawn so the barrier can never
    /// miss the task; `done()` runs on every exit path, panics included.
    fn spawn_managed(&self, task: TaskRef) {
        self.group.add(1);
        let group = self.group.clone();
        let bus = self.bus.clone();
        let child = self.token.child_token();

        tokio::spawn(async move {
            let name: Arc<str> = Arc::from(task.name());
            bus.publish(Event::new(EventKind::TaskStarting).with_task(Arc::clone(&name)));

            let result = std::panic::AssertUnwindSafe(task.run(child)).catch_unwind().await;
            match result {
                Ok(Ok(())) | Ok(Err(TaskError::Canceled)) => {
                    bus.publish(Event::new(EventKind::TaskStopped).with_task(name));
                }
                Ok(Err(err)) => {
                    bus.publish(
                        Event::new(EventKind::TaskFailed)
                            .with_task(name)
                            .with_reason(err.to_string()),
                    );
                }
                Err(payload) => {
                    bus.publish(
                        Event::new(EventKind::TaskFailed)
                            .with_task(name)
                            .with_reason(format!("panicked: {}", panic_message(payload.as_ref()))),
                    );
                }
            }
            group.done();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::{Instant, sleep};

    struct Recorder {
        kinds: Arc<Mutex<Vec<EventKind>>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.kinds.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    fn recorder() -> (Arc<Mutex<Vec<EventKind>>>, Vec<Arc<dyn Subscribe>>) {
        let kinds = Arc::new(Mutex::new(Vec::new()));
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Recorder { kinds: kinds.clone() })];
        (kinds, subs)
    }

    /// A trigger that fires as soon as the run starts waiting on it.
    fn immediate_trigger() -> impl Future<Output = std::io::Result<()>> {
        let (tx, rx) = oneshot::channel::<()>();
        tx.send(()).unwrap();
        async move {
            let _ = rx.await;
            Ok(())
        }
    }

    fn draining_task(name: &'static str, work_after_cancel: Duration) -> TaskRef {
        TaskFn::arc(name, move |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            sleep(work_after_cancel).await;
            Ok(())
        })
    }

    fn position(kinds: &[EventKind], kind: EventKind) -> usize {
        kinds
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_else(|| panic!("{kind:?} missing from {kinds:?}"))
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_waits_for_drain_then_cleans_up() {
        let shutdown_calls = Arc::new(AtomicUsize::new(0));
        let cleanup_calls = Arc::new(AtomicUsize::new(0));
        let (kinds, subs) = recorder();

        let sc = shutdown_calls.clone();
        let cc = cleanup_calls.clone();
        let spec = ShutdownSpec::new(Duration::from_secs(10))
            .on_shutdown(move || async move {
                sleep(Duration::from_millis(50)).await;
                sc.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .on_cleanup(move || async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        let tasks = vec![
            draining_task("worker-a", Duration::from_millis(200)),
            draining_task("worker-b", Duration::from_millis(200)),
        ];

        let orc = Orchestrator::new(spec, subs);
        let start = Instant::now();
        orc.run_until(tasks, immediate_trigger()).await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(200), "drain bounds the run: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(10));
        assert_eq!(shutdown_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cleanup_calls.load(Ordering::SeqCst), 1);

        let got = kinds.lock().unwrap().clone();
        let cancelled = position(&got, EventKind::Cancelled);
        let completed = position(&got, EventKind::ShutdownCompleted);
        let draining = position(&got, EventKind::Draining);
        let drained = position(&got, EventKind::Drained);
        let stopped = position(&got, EventKind::Stopped);
        assert!(cancelled < completed);
        assert!(completed < draining);
        assert!(draining < drained);
        assert!(drained < stopped);
        assert_eq!(got.iter().filter(|k| **k == EventKind::TaskStopped).count(), 2);
        // Tasks report completion before the drain barrier releases.
        let last_task_stop = got
            .iter()
            .rposition(|k| *k == EventKind::TaskStopped)
            .unwrap();
        assert!(last_task_stop < drained);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_shutdown_hook_is_left_behind() {
        let hook_finished = Arc::new(AtomicUsize::new(0));
        let (kinds, subs) = recorder();

        let hf = hook_finished.clone();
        let spec = ShutdownSpec::new(Duration::from_secs(1)).on_shutdown(move || async move {
            sleep(Duration::from_secs(5)).await;
            hf.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let tasks = vec![draining_task("quick", Duration::ZERO)];
        let orc = Orchestrator::new(spec, subs);

        let start = Instant::now();
        orc.run_until(tasks, immediate_trigger()).await.unwrap();
        let elapsed = start.elapsed();

        // Bounded by the grace period, not the hook's 5s.
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(5));
        assert_eq!(hook_finished.load(Ordering::SeqCst), 0);

        let got = kinds.lock().unwrap().clone();
        assert!(position(&got, EventKind::GraceExceeded) < position(&got, EventKind::Drained));

        // Best-effort timeout: the detached hook still runs to completion.
        sleep(Duration::from_secs(10)).await;
        assert_eq!(hook_finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_without_hooks_still_traverses_all_states() {
        let (kinds, subs) = recorder();
        let orc = Orchestrator::new(ShutdownSpec::new(Duration::from_secs(1)), subs);

        let tasks = vec![draining_task("lone", Duration::from_millis(10))];
        orc.run_until(tasks, immediate_trigger()).await.unwrap();

        let got = kinds.lock().unwrap().clone();
        for kind in [
            EventKind::ShutdownRequested,
            EventKind::Cancelled,
            EventKind::ShutdownCompleted,
            EventKind::Draining,
            EventKind::Drained,
            EventKind::Stopped,
        ] {
            position(&got, kind);
        }
        assert_eq!(got.iter().filter(|k| **k == EventKind::Stopped).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_shutdown_hook_is_surfaced_after_cleanup() {
        let cleanup_calls = Arc::new(AtomicUsize::new(0));
        let (kinds, subs) = recorder();

        let cc = cleanup_calls.clone();
        let spec = ShutdownSpec::new(Duration::from_secs(1))
            .on_shutdown(|| async { Err(HookError::fail("listener stuck")) })
            .on_cleanup(move || async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        let orc = Orchestrator::new(spec, subs);
        let err = orc
            .run_until(Vec::new(), immediate_trigger())
            .await
            .unwrap_err();

        assert!(matches!(err, RuntimeError::Shutdown(HookError::Failed { .. })));
        // Draining and cleanup still ran.
        assert_eq!(cleanup_calls.load(Ordering::SeqCst), 1);
        let got = kinds.lock().unwrap().clone();
        assert!(position(&got, EventKind::ShutdownFailed) < position(&got, EventKind::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_cleanup_hook_is_reported_not_fatal() {
        let (kinds, subs) = recorder();
        let spec = ShutdownSpec::new(Duration::from_secs(1)).on_cleanup(|| async {
            panic!("cleanup exploded");
        });

        let orc = Orchestrator::new(spec, subs);
        let err = orc
            .run_until(Vec::new(), immediate_trigger())
            .await
            .unwrap_err();

        assert!(matches!(err, RuntimeError::Cleanup(HookError::Panicked { .. })));
        let got = kinds.lock().unwrap().clone();
        assert!(position(&got, EventKind::CleanupFailed) < position(&got, EventKind::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_task_never_aborts_the_run() {
        let (kinds, subs) = recorder();
        let spec = ShutdownSpec::new(Duration::from_secs(1));

        let failing: TaskRef = TaskFn::arc("flaky", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err(TaskError::fail("db connection lost"))
        });
        let panicking: TaskRef = TaskFn::arc("buggy", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            panic!("task exploded");
        });

        let orc = Orchestrator::new(spec, subs);
        orc.run_until(vec![failing, panicking], immediate_trigger())
            .await
            .unwrap();

        let got = kinds.lock().unwrap().clone();
        assert_eq!(got.iter().filter(|k| **k == EventKind::TaskFailed).count(), 2);
        position(&got, EventKind::Drained);
        position(&got, EventKind::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn external_collaborators_hold_the_drain_barrier() {
        let spec = ShutdownSpec::new(Duration::from_secs(1));
        let orc = Orchestrator::new(spec, Vec::new());

        // An in-flight unit registered outside the managed-task path.
        let group = orc.group();
        group.add(1);
        let g = group.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(300)).await;
            g.done();
        });

        let start = Instant::now();
        orc.run_until(Vec::new(), immediate_trigger()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_cancellation_does_not_retrigger_sequence_steps() {
        let (kinds, subs) = recorder();
        // The task cancels its own token before the orchestrator does; the
        // orchestrator's later cancel lands on an already-cancelled chain.
        let task: TaskRef = TaskFn::arc("eager", |ctx: CancellationToken| async move {
            ctx.cancel();
            ctx.cancelled().await;
            ctx.cancel();
            assert!(ctx.is_cancelled());
            Ok(())
        });

        let spec = ShutdownSpec::new(Duration::from_secs(1))
            .on_shutdown(|| async { Ok(()) })
            .on_cleanup(|| async { Ok(()) });
        let orc = Orchestrator::new(spec, subs);
        orc.run_until(vec![task], immediate_trigger()).await.unwrap();

        // Every sequence step is published exactly once: no step re-triggers.
        let got = kinds.lock().unwrap().clone();
        for kind in [
            EventKind::ShutdownRequested,
            EventKind::Cancelled,
            EventKind::ShutdownCompleted,
            EventKind::Draining,
            EventKind::Drained,
            EventKind::Stopped,
        ] {
            assert_eq!(
                got.iter().filter(|k| **k == kind).count(),
                1,
                "{kind:?} must be published exactly once"
            );
        }
        assert_eq!(got.iter().filter(|k| **k == EventKind::TaskStopped).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_exit_counts_as_graceful_stop() {
        let (kinds, subs) = recorder();
        let task: TaskRef = TaskFn::arc("polite", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err(TaskError::Canceled)
        });

        let orc = Orchestrator::new(ShutdownSpec::new(Duration::from_secs(1)), subs);
        orc.run_until(vec![task], immediate_trigger()).await.unwrap();

        let got = kinds.lock().unwrap().clone();
        assert_eq!(got.iter().filter(|k| **k == EventKind::TaskStopped).count(), 1);
        assert_eq!(got.iter().filter(|k| **k == EventKind::TaskFailed).count(), 0);
    }
}
