//! # Events emitted by the runner, the admission layers and blocked handles.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Runner events**: drain loop control (started, stopped, idle)
//! - **Task events**: admission and execution of work items
//! - **Handle events**: progress of the blocked-admission protocol
//! - **Isolation events**: panics and overflows contained by the runtime
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! task/handle ids, retry policy and queue size.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use tasklane::{Event, EventKind, RetryPolicy};
//!
//! let ev = Event::new(EventKind::HandleRetryFailed)
//!     .with_policy(RetryPolicy::Forever)
//!     .with_attempt(2)
//!     .with_reason("queue full");
//!
//! assert_eq!(ev.kind, EventKind::HandleRetryFailed);
//! assert_eq!(ev.attempt, Some(2));
//! assert_eq!(ev.reason.as_deref(), Some("queue full"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::admission::HandleId;
use crate::policies::RetryPolicy;
use crate::tasks::TaskId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of queue events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Runner events ===
    /// `run()` switched the runner on.
    RunnerStarted,

    /// `stop()` switched the runner off.
    RunnerStopped,

    /// The runner found the queue empty and is waiting for an admission.
    RunnerIdle,

    // === Task events ===
    /// Work was admitted into the queue.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `size`: queue size after admission
    TaskAdmitted,

    /// Work hit a full queue and was parked in the side buffer.
    ///
    /// Sets:
    /// - `size`: side buffer size after parking
    TaskBuffered,

    /// Work was moved from the side buffer into the queue.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `size`: queue size after admission
    TaskPromoted,

    /// Work hit a full queue and was handed back to the producer.
    AdmissionRejected,

    /// The head task was removed from the queue.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `size`: queue size after removal
    TaskDequeued,

    /// The runner is invoking a task's work.
    ///
    /// Sets:
    /// - `task`: task id
    TaskStarting,

    /// The in-flight task called its signal.
    ///
    /// Sets:
    /// - `task`: task id
    TaskDone,

    /// A signal was dropped without being called; the runner is stalled.
    ///
    /// Sets:
    /// - `task`: task id
    SignalDropped,

    // === Handle events ===
    /// A producer was blocked on a full queue.
    ///
    /// Sets:
    /// - `handle`: handle id
    HandleBlocked,

    /// A pending handle was picked by a dequeue notification.
    ///
    /// Sets:
    /// - `handle`: handle id
    HandleNotified,

    /// A handle's work was admitted (immediately, ONCE or FOREVER).
    ///
    /// Sets:
    /// - `handle`: handle id
    /// - `task`: task id
    /// - `policy`: retry policy, absent for immediate admission
    /// - `attempt`: notification attempt that succeeded
    HandleAdmitted,

    /// A FOREVER attempt found the queue full; the handle waits again.
    ///
    /// Sets:
    /// - `handle`: handle id
    /// - `policy`: `Forever`
    /// - `attempt`: failed attempt number
    HandleRetryFailed,

    /// A handle was retired without admission.
    ///
    /// Sets:
    /// - `handle`: handle id
    /// - `reason`: `"give_up"` or `"no_policy"`
    HandleAbandoned,

    // === Isolation events ===
    /// A deferred callback panicked; the scheduler kept running.
    ///
    /// Sets:
    /// - `reason`: panic payload, when printable
    CallbackPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and cause
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic info
    SubscriberPanicked,
}

/// Queue event with optional metadata.
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
    /// Task the event is about, if applicable.
    pub task: Option<TaskId>,
    /// Blocked handle the event is about, if applicable.
    pub handle: Option<HandleId>,
    /// Retry policy in effect for a handle event.
    pub policy: Option<RetryPolicy>,
    /// Notification attempt (starting from 1).
    pub attempt: Option<u32>,
    /// Queue or side buffer size after the change.
    pub size: Option<usize>,
    /// Human-readable reason (panic payloads, abandonment cause, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            handle: None,
            policy: None,
            attempt: None,
            size: None,
            reason: None,
        }
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_task(mut self, task: TaskId) -> Self {
        self.task = Some(task);
        self
    }

    /// Attaches a handle id.
    #[inline]
    pub fn with_handle(mut self, handle: HandleId) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Attaches a retry policy.
    #[inline]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a size.
    #[inline]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::TaskAdmitted);
        let b = Event::new(EventKind::TaskDone);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn subscriber_events_are_classified() {
        assert!(Event::subscriber_overflow("audit", "full").is_subscriber_overflow());
        assert!(Event::subscriber_panicked("audit", "boom".into()).is_subscriber_panic());
    }
}
