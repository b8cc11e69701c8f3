//! # Scheduler: the single logical thread of control.
//!
//! Every deferred step of a queue ("next scheduling opportunity") is a boxed
//! `FnOnce()` continuation posted to one unbounded channel and executed by one
//! driver task on the ambient tokio runtime.
//!
//! ## Rules
//! - Continuations run **one at a time**, in the order they were deferred.
//! - A continuation may defer more continuations; they run after everything
//!   already queued.
//! - A panicking continuation is caught and reported as `CallbackPanicked`;
//!   the driver keeps going.
//! - The driver stops when the token is cancelled or every sender is gone.
//!   Continuations still queued at that point are dropped.
//!
//! ```text
//! defer(job) ──► [unbounded mpsc] ──► driver ──► job()
//!                                        └────► panic → CallbackPanicked
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::{runtime, select, sync::mpsc, sync::oneshot};
use tokio_util::sync::CancellationToken;

use crate::error::QueueError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::panic_message;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle for deferring continuations onto the queue's driver.
#[derive(Clone)]
pub(crate) struct Scheduler {
    tx: mpsc::UnboundedSender<Job>,
    /// Deferred but not yet finished continuations.
    pending: Arc<AtomicUsize>,
}

impl Scheduler {
    /// Spawns the driver on the current tokio runtime.
    pub fn start(bus: Bus, token: CancellationToken) -> Result<Self, QueueError> {
        let rt = runtime::Handle::try_current().map_err(|_| QueueError::NoRuntime)?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let pending = Arc::new(AtomicUsize::new(0));
        let in_driver = Arc::clone(&pending);

        rt.spawn(async move {
            loop {
                select! {
                    biased;
                    _ = token.cancelled() => break,
                    job = rx.recv() => {
                        let Some(job) = job else { break };
                        if let Err(panic_err) = catch_unwind(AssertUnwindSafe(job)) {
                            bus.publish(
                                Event::new(EventKind::CallbackPanicked)
                                    .with_reason(panic_message(&*panic_err)),
                            );
                        }
                        in_driver.fetch_sub(1, Ordering::SeqCst);
                    }
                }
            }
        });

        Ok(Self { tx, pending })
    }

    /// Runs `job` at the next scheduling opportunity.
    ///
    /// Silently dropped if the driver has stopped.
    pub fn defer(&self, job: impl FnOnce() + Send + 'static) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(Box::new(job)).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Waits until no deferred continuation is left, including the ones
    /// deferred while waiting. Returns early if the driver stops.
    pub async fn flush(&self) {
        loop {
            let (tx, rx) = oneshot::channel();
            self.defer(move || {
                let _ = tx.send(());
            });
            if rx.await.is_err() {
                return;
            }
            if self.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            tokio::task::yield_now().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[tokio::test]
    async fn runs_jobs_in_defer_order() {
        let sched = Scheduler::start(Bus::new(8), CancellationToken::new()).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let seen = Arc::clone(&seen);
            sched.defer(move || seen.lock().unwrap().push(i));
        }
        sched.flush().await;

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn flush_waits_for_nested_jobs() {
        let sched = Scheduler::start(Bus::new(8), CancellationToken::new()).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner = sched.clone();
        let outer_seen = Arc::clone(&seen);
        sched.defer(move || {
            outer_seen.lock().unwrap().push("outer");
            let nested_seen = Arc::clone(&outer_seen);
            let again = inner.clone();
            inner.defer(move || {
                nested_seen.lock().unwrap().push("nested");
                let last = Arc::clone(&nested_seen);
                again.defer(move || last.lock().unwrap().push("last"));
            });
        });
        sched.flush().await;

        assert_eq!(*seen.lock().unwrap(), vec!["outer", "nested", "last"]);
    }

    #[tokio::test]
    async fn panicking_job_is_reported_and_driver_survives() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let sched = Scheduler::start(bus, CancellationToken::new()).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));

        sched.defer(|| panic!("callback blew up"));
        let after = Arc::clone(&ran);
        sched.defer(move || {
            after.fetch_add(1, Ordering::SeqCst);
        });
        sched.flush().await;

        assert_eq!(ran.load(Ordering::SeqCst), 1);
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::CallbackPanicked);
        assert_eq!(ev.reason.as_deref(), Some("callback blew up"));
    }

    #[tokio::test]
    async fn cancelled_driver_drops_jobs_and_flush_returns() {
        let token = CancellationToken::new();
        let sched = Scheduler::start(Bus::new(8), token.clone()).unwrap();
        token.cancel();
        tokio::task::yield_now().await;

        let ran = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&ran);
        sched.defer(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });
        sched.flush().await;

        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn start_without_runtime_fails() {
        let err = Scheduler::start(Bus::new(8), CancellationToken::new())
            .err()
            .unwrap();
        assert_eq!(err, QueueError::NoRuntime);
    }
}
