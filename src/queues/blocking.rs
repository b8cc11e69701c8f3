use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::admission::{Admission, BlockedHandle};
use crate::config::QueueConfig;
use crate::core::{QueueBuilder, Shared};
use crate::error::QueueError;
use crate::tasks::Signal;

use super::runner_surface;

/// Bounded runner whose producers can wait for room.
///
/// [`enqueue`](Self::enqueue) behaves like [`BoundedQueue`](crate::BoundedQueue).
/// [`enqueue_blocked`](Self::enqueue_blocked) never fails: on a full queue it
/// returns a pending [`BlockedHandle`] that is notified, in arrival order,
/// as dequeues free slots.
#[derive(Clone)]
pub struct BlockingQueue {
    shared: Arc<Shared>,
}

runner_surface!(BlockingQueue);

impl BlockingQueue {
    /// Creates a queue holding at most `capacity` tasks.
    ///
    /// Fails with `InvalidArgument` if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        QueueBuilder::new(QueueConfig::with_capacity(capacity)).blocking()
    }

    /// Admits work, or rejects it if the queue is full.
    pub fn enqueue(&self, work: impl FnOnce(Signal) + Send + 'static) -> Admission {
        self.shared.admit(Box::new(work))
    }

    /// Admits work if there is room; otherwise returns a pending handle
    /// queued behind earlier blocked producers.
    pub fn enqueue_blocked(&self, work: impl FnOnce(Signal) + Send + 'static) -> BlockedHandle {
        self.shared.enqueue_blocked(Box::new(work))
    }

    /// Handles still waiting for a notification.
    ///
    /// A handle that has been notified but not yet resolved is not counted;
    /// it is counted again if its FOREVER attempt fails and it rejoins.
    pub fn pending_handles(&self) -> usize {
        self.shared.pending_handles()
    }

    pub fn is_full(&self) -> bool {
        self.shared.is_full()
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.shared.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::HandleStatus;
    use crate::events::EventKind;
    use crate::policies::RetryPolicy;
    use crate::queues::testkit::{Counter, Trace, labels};

    fn full_queue(capacity: usize, trace: &Trace) -> BlockingQueue {
        let queue = BlockingQueue::new(capacity).unwrap();
        for i in 0..capacity {
            assert!(queue.enqueue(trace.work(format!("seed{i}"))).is_accepted());
        }
        assert!(queue.is_full());
        queue
    }

    fn forever(handle: &BlockedHandle, success: &Counter, failure: &Counter) {
        let success = success.clone();
        handle
            .if_blocked(|control| control.request_enqueue(RetryPolicy::Forever))
            .on_enqueue_succeeded(move || success.bump())
            .on_enqueue_failed(failure.callback());
    }

    #[test]
    fn zero_capacity_fails_fast() {
        assert!(BlockingQueue::new(0).is_err());
    }

    #[tokio::test]
    async fn plain_enqueue_rejects_when_full() {
        let trace = Trace::default();
        let queue = full_queue(1, &trace);
        assert!(queue.enqueue(trace.work("late")).is_rejected());
        assert_eq!(queue.pending_handles(), 0);
    }

    #[tokio::test]
    async fn room_admits_immediately_and_reports_success_once() {
        let queue = BlockingQueue::new(2).unwrap();
        let trace = Trace::default();
        let blocked_calls = Counter::default();
        let success = Counter::default();

        let handle = queue.enqueue_blocked(trace.work("a"));
        assert!(!handle.is_blocked());
        assert_eq!(handle.status(), HandleStatus::Admitted);

        let calls = blocked_calls.clone();
        let ok = success.clone();
        handle
            .if_blocked(move |_| calls.bump())
            .on_enqueue_succeeded(move || ok.bump());
        queue.flush().await;

        let ok = success.clone();
        handle.on_enqueue_succeeded(move || ok.bump());
        queue.flush().await;

        assert_eq!(success.get(), 1);
        assert_eq!(blocked_calls.get(), 0);
        assert_eq!(queue.size(), 1);
    }

    #[tokio::test]
    async fn notifies_one_handle_per_dequeue_in_arrival_order() {
        let trace = Trace::default();
        let queue = full_queue(1, &trace);
        let (s1, f1, s2, f2) = (
            Counter::default(),
            Counter::default(),
            Counter::default(),
            Counter::default(),
        );

        let h1 = queue.enqueue_blocked(trace.work("b"));
        let h2 = queue.enqueue_blocked(trace.work("c"));
        assert!(h1.is_blocked() && h2.is_blocked());
        forever(&h1, &s1, &f1);
        forever(&h2, &s2, &f2);
        queue.flush().await;
        assert_eq!(h1.status(), HandleStatus::AwaitingForever);
        assert_eq!(queue.pending_handles(), 2);

        queue.dequeue();
        queue.flush().await;

        assert_eq!(h1.status(), HandleStatus::Admitted);
        assert_eq!(h2.status(), HandleStatus::AwaitingForever);
        assert_eq!(queue.pending_handles(), 1);
        assert_eq!((s1.get(), f1.get()), (1, 0));
        assert_eq!((s2.get(), f2.get()), (0, 0));
    }

    #[tokio::test]
    async fn once_policy_forces_admission_past_capacity() {
        let trace = Trace::default();
        let queue = full_queue(1, &trace);
        let success = Counter::default();
        let failure = Counter::default();

        let ok = success.clone();
        let handle = queue.enqueue_blocked(trace.work("b"));
        handle
            .if_blocked(|control| control.request_enqueue(RetryPolicy::Once))
            .on_enqueue_succeeded(move || ok.bump())
            .on_enqueue_failed(failure.callback());
        queue.flush().await;
        assert_eq!(handle.status(), HandleStatus::AwaitingOnce);

        queue.dequeue();
        // A racing producer takes the freed slot first.
        assert!(queue.enqueue(trace.work("c")).is_accepted());
        queue.flush().await;

        assert_eq!(queue.size(), 2);
        assert_eq!(handle.status(), HandleStatus::Resolved);
        assert_eq!((success.get(), failure.get()), (1, 0));
    }

    #[tokio::test]
    async fn forever_policy_retries_until_admitted() {
        let trace = Trace::default();
        let queue = full_queue(1, &trace);
        let success = Counter::default();
        let failure = Counter::default();

        let handle = queue.enqueue_blocked(trace.work("x"));
        forever(&handle, &success, &failure);
        queue.flush().await;

        for racer in ["b", "c"] {
            queue.dequeue();
            assert!(queue.enqueue(trace.work(racer)).is_accepted());
            queue.flush().await;
            assert_eq!(handle.status(), HandleStatus::AwaitingForever);
        }
        assert_eq!((success.get(), failure.get()), (0, 2));

        queue.dequeue();
        queue.flush().await;
        assert_eq!(handle.status(), HandleStatus::Admitted);
        assert_eq!((success.get(), failure.get()), (1, 2));

        handle.give_up();
        assert_eq!(handle.status(), HandleStatus::Admitted);
        assert_eq!(queue.size(), 1);
    }

    #[tokio::test]
    async fn give_up_in_callback_passes_the_notification_on() {
        let trace = Trace::default();
        let queue = full_queue(1, &trace);
        let (s1, f1, s2, f2) = (
            Counter::default(),
            Counter::default(),
            Counter::default(),
            Counter::default(),
        );

        let ok = s1.clone();
        let h1 = queue.enqueue_blocked(trace.work("b"));
        h1.if_blocked(|control| control.give_up())
            .on_enqueue_succeeded(move || ok.bump())
            .on_enqueue_failed(f1.callback());
        let h2 = queue.enqueue_blocked(trace.work("c"));
        forever(&h2, &s2, &f2);
        queue.flush().await;
        assert_eq!(h1.status(), HandleStatus::Abandoned);
        assert_eq!(queue.pending_handles(), 1);

        queue.dequeue();
        queue.flush().await;

        assert_eq!(h2.status(), HandleStatus::Admitted);
        assert_eq!((s1.get(), f1.get()), (0, 0));
        assert_eq!(s2.get(), 1);
    }

    #[tokio::test]
    async fn direct_give_up_silences_the_handle() {
        let trace = Trace::default();
        let queue = full_queue(1, &trace);
        let success = Counter::default();
        let failure = Counter::default();

        let handle = queue.enqueue_blocked(trace.work("b"));
        forever(&handle, &success, &failure);
        handle.give_up();

        for _ in 0..3 {
            queue.dequeue();
            queue.enqueue(trace.work("filler"));
            queue.flush().await;
        }

        assert_eq!(handle.status(), HandleStatus::Abandoned);
        assert_eq!((success.get(), failure.get()), (0, 0));
        assert_eq!(queue.pending_handles(), 0);
    }

    #[tokio::test]
    async fn missing_policy_abandons_and_passes_the_notification_on() {
        let trace = Trace::default();
        let queue = full_queue(1, &trace);
        let failure = Counter::default();
        let (s2, f2) = (Counter::default(), Counter::default());

        let h1 = queue.enqueue_blocked(trace.work("b"));
        h1.on_enqueue_failed(failure.callback());
        let h2 = queue.enqueue_blocked(trace.work("c"));
        forever(&h2, &s2, &f2);

        queue.run();
        queue.flush().await;

        assert_eq!(h1.status(), HandleStatus::Abandoned);
        assert_eq!(failure.get(), 1);
        assert_eq!(h2.status(), HandleStatus::Admitted);
        assert_eq!((s2.get(), f2.get()), (1, 0));
        assert_eq!(trace.take(), labels(&["seed0", "c"]));
        assert!(queue.is_empty());

        queue.enqueue(trace.work("d"));
        queue.flush().await;
        assert_eq!(failure.get(), 1);
    }

    #[tokio::test]
    async fn give_up_after_notification_passes_it_on() {
        let trace = Trace::default();
        let queue = full_queue(1, &trace);
        let (s1, f1, s2, f2) = (
            Counter::default(),
            Counter::default(),
            Counter::default(),
            Counter::default(),
        );

        let h1 = queue.enqueue_blocked(trace.work("b"));
        let h2 = queue.enqueue_blocked(trace.work("c"));
        forever(&h1, &s1, &f1);
        forever(&h2, &s2, &f2);
        queue.flush().await;

        queue.dequeue();
        // H1 was already popped for this dequeue.
        h1.give_up();
        queue.flush().await;

        assert_eq!(h1.status(), HandleStatus::Abandoned);
        assert_eq!(h2.status(), HandleStatus::Admitted);
        assert_eq!(queue.size(), 1);
        assert_eq!(queue.pending_handles(), 0);
        assert_eq!((s1.get(), f1.get()), (0, 0));
        assert_eq!((s2.get(), f2.get()), (1, 0));
    }

    #[tokio::test]
    async fn panicking_if_blocked_callback_still_resolves_the_handle() {
        let trace = Trace::default();
        let queue = full_queue(1, &trace);
        let success = Counter::default();
        let failure = Counter::default();
        let mut events = queue.events();

        let handle = queue.enqueue_blocked(trace.work("b"));
        queue.dequeue();

        let ok = success.clone();
        handle
            .if_blocked(|control| {
                control.request_enqueue(RetryPolicy::Forever);
                panic!("callback blew up");
            })
            .on_enqueue_succeeded(move || ok.bump())
            .on_enqueue_failed(failure.callback());
        queue.flush().await;

        assert_eq!(handle.status(), HandleStatus::Admitted);
        assert_eq!((success.get(), failure.get()), (1, 0));
        assert_eq!(queue.size(), 1);

        let mut panicked = None;
        while let Ok(ev) = events.try_recv() {
            if ev.kind == EventKind::CallbackPanicked {
                panicked = ev.handle;
            }
        }
        assert_eq!(panicked, Some(handle.id()));
    }

    #[tokio::test]
    async fn notified_handle_is_uncounted_until_it_rejoins() {
        let trace = Trace::default();
        let queue = full_queue(1, &trace);
        let success = Counter::default();
        let failure = Counter::default();

        let handle = queue.enqueue_blocked(trace.work("x"));
        forever(&handle, &success, &failure);
        queue.flush().await;
        assert_eq!(queue.pending_handles(), 1);

        queue.dequeue();
        assert!(queue.enqueue(trace.work("racer")).is_accepted());
        assert_eq!(queue.pending_handles(), 0);
        assert_eq!(handle.status(), HandleStatus::AwaitingForever);

        queue.flush().await;
        assert_eq!(failure.get(), 1);
        assert_eq!(queue.pending_handles(), 1);
    }

    #[tokio::test]
    async fn notification_before_callback_still_runs_it_once() {
        let trace = Trace::default();
        let queue = full_queue(1, &trace);
        let calls = Counter::default();
        let success = Counter::default();

        let handle = queue.enqueue_blocked(trace.work("b"));
        queue.dequeue();

        let c = calls.clone();
        let ok = success.clone();
        handle
            .if_blocked(move |control| {
                c.bump();
                control.request_enqueue(RetryPolicy::Forever);
            })
            .on_enqueue_succeeded(move || ok.bump());
        queue.flush().await;

        assert_eq!(calls.get(), 1);
        assert_eq!(success.get(), 1);
        assert_eq!(handle.status(), HandleStatus::Admitted);
    }

    #[tokio::test]
    async fn eleven_forever_producers_on_ten_slots_all_run() {
        let queue = BlockingQueue::new(10).unwrap();
        let trace = Trace::default();
        let success = Counter::default();
        let failure = Counter::default();

        for i in 0..11 {
            let handle = queue.enqueue_blocked(trace.work(i.to_string()));
            forever(&handle, &success, &failure);
        }
        assert_eq!(queue.pending_handles(), 1);

        queue.run();
        queue.flush().await;

        let expected: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        assert_eq!(trace.take(), expected);
        assert_eq!((success.get(), failure.get()), (11, 0));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn blocked_lifecycle_is_published() {
        let trace = Trace::default();
        let queue = full_queue(1, &trace);
        let mut events = queue.events();

        let handle = queue.enqueue_blocked(trace.work("b"));
        handle.request_enqueue(RetryPolicy::Forever);
        queue.dequeue();
        queue.flush().await;

        let mut kinds = Vec::new();
        while let Ok(ev) = events.try_recv() {
            if ev.handle == Some(handle.id()) || ev.kind == EventKind::TaskDequeued {
                kinds.push(ev.kind);
            }
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::HandleBlocked,
                EventKind::TaskDequeued,
                EventKind::HandleNotified,
                EventKind::HandleAdmitted,
            ]
        );
        assert!(trace.take().is_empty());
    }
}
