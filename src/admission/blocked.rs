//! # Blocked-admission protocol.
//!
//! Producers that hit a full [`BlockingQueue`](crate::BlockingQueue) get a
//! pending handle appended to the [`WaitList`]. Every successful dequeue
//! pops the earliest still-pending handle and defers its resolution:
//!
//! ```text
//! dequeue ──► WaitList::pop_next_pending ──► defer(resolve(handle))
//!
//! resolve(handle):
//!   ├─ if_blocked callback not run yet ─► run it now (panic reported, not fatal)
//!   └─ decide (policy re-checked after the callback):
//!        ├─ retired (admitted / abandoned) ─► pass notification to next pending
//!        ├─ no policy ─► ABANDONED, failure fires once, pass notification on
//!        ├─ ONCE      ─► forced admission, RESOLVED, success
//!        └─ FOREVER   ─► room?  ADMITTED, success
//!                         full?  rejoin tail, failure
//! ```
//!
//! ## Rules
//! - Each dequeue is used by at most one handle, strictly in arrival order.
//! - Retired handles are dropped from the front lazily and never consume a notification,
//!   including handles retired between the pop and the deferred resolution.
//! - FOREVER's "admit or rejoin" is one step under the queue lock, so a slot
//!   freed in between cannot be missed.

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::core::Shared;
use crate::events::{Event, EventKind};
use crate::policies::RetryPolicy;
use crate::subscribers::panic_message;
use crate::tasks::{TaskId, Work};

use super::handle::{BlockedHandle, Decision, HandleCore};

/// Pending handles in arrival order.
#[derive(Default)]
pub(crate) struct WaitList {
    handles: VecDeque<Arc<HandleCore>>,
}

impl WaitList {
    pub fn push_back(&mut self, handle: Arc<HandleCore>) {
        self.handles.push_back(handle);
    }

    /// Pops the earliest handle that is still pending, discarding retired ones.
    pub fn pop_next_pending(&mut self) -> Option<Arc<HandleCore>> {
        while let Some(handle) = self.handles.pop_front() {
            if handle.is_pending() {
                return Some(handle);
            }
        }
        None
    }

    /// Pending handles still in the list.
    ///
    /// A handle popped for a notification is not counted until its
    /// resolution puts it back (failed FOREVER attempt) or retires it.
    pub fn live(&self) -> usize {
        self.handles.iter().filter(|h| h.is_pending()).count()
    }
}

impl Shared {
    /// Admits `work` if there is room, otherwise parks it behind a pending handle.
    pub(crate) fn enqueue_blocked(self: &Arc<Self>, work: Work) -> BlockedHandle {
        let mut st = self.lock();
        let id = st.next_handle_id();

        if !self.is_full_locked(&st) {
            let (task, wake) = self.push_locked(&mut st, work);
            st.submitted += 1;
            let size = st.list.len();
            drop(st);
            self.after_push(EventKind::TaskAdmitted, task, size, wake);
            self.bus.publish(
                Event::new(EventKind::HandleAdmitted)
                    .with_handle(id)
                    .with_task(task),
            );
            return BlockedHandle::new(HandleCore::admitted(id, Arc::downgrade(self)), false);
        }

        let core = HandleCore::pending(id, Arc::downgrade(self), work);
        if let Some(wait) = st.waiting_mut() {
            wait.push_back(Arc::clone(&core));
        }
        drop(st);
        self.bus
            .publish(Event::new(EventKind::HandleBlocked).with_handle(id));
        BlockedHandle::new(core, true)
    }

    /// Bounded admission for a FOREVER retry; on a full queue the handle
    /// rejoins the waiting list and the work is handed back.
    fn admit_or_wait(self: &Arc<Self>, handle: &Arc<HandleCore>, work: Work) -> Result<TaskId, Work> {
        let mut st = self.lock();
        if self.is_full_locked(&st) {
            if let Some(wait) = st.waiting_mut() {
                wait.push_back(Arc::clone(handle));
            }
            return Err(work);
        }
        let (task, wake) = self.push_locked(&mut st, work);
        st.submitted += 1;
        let size = st.list.len();
        drop(st);
        self.after_push(EventKind::TaskAdmitted, task, size, wake);
        Ok(task)
    }

    /// Handles one dequeue notification for `handle`.
    ///
    /// A notification that lands on a handle retired in the meantime, or on
    /// one abandoned for lack of a policy, is passed to the next pending
    /// handle so the freed slot is not lost.
    pub(crate) fn resolve(self: &Arc<Self>, handle: Arc<HandleCore>) {
        let mut next = Some(handle);
        while let Some(handle) = next.take() {
            if !self.resolve_one(&handle) {
                next = self.next_waiter();
            }
        }
    }

    /// Pops the next pending handle for a forwarded notification.
    fn next_waiter(&self) -> Option<Arc<HandleCore>> {
        let handle = self
            .lock()
            .waiting_mut()
            .and_then(WaitList::pop_next_pending)?;
        self.bus
            .publish(Event::new(EventKind::HandleNotified).with_handle(handle.id()));
        Some(handle)
    }

    /// Applies the handle's policy; false if the notification was not used.
    fn resolve_one(self: &Arc<Self>, handle: &Arc<HandleCore>) -> bool {
        // Notification overtook the deferred if_blocked callback.
        if let Some(cb) = handle.take_unrun_callback() {
            let control = super::BlockedControl::new(Arc::clone(handle));
            if let Err(panic_err) = catch_unwind(AssertUnwindSafe(|| cb(control))) {
                self.bus.publish(
                    Event::new(EventKind::CallbackPanicked)
                        .with_handle(handle.id())
                        .with_reason(panic_message(&*panic_err)),
                );
            }
        }

        match handle.decide() {
            Decision::Skip => false,
            Decision::Abandon(on_failure) => {
                self.bus.publish(
                    Event::new(EventKind::HandleAbandoned)
                        .with_handle(handle.id())
                        .with_reason("no_policy"),
                );
                if let Some(mut cb) = on_failure {
                    cb();
                }
                false
            }
            Decision::Once { work, attempt } => {
                let task = self.admit_forced(work);
                self.publish_admitted(handle, task, RetryPolicy::Once, attempt);
                if let Some(cb) = handle.take_success() {
                    cb();
                }
                true
            }
            Decision::Forever { work, attempt } => {
                match self.admit_or_wait(handle, work) {
                    Ok(task) => {
                        handle.mark_admitted();
                        self.publish_admitted(handle, task, RetryPolicy::Forever, attempt);
                        if let Some(cb) = handle.take_success() {
                            cb();
                        }
                    }
                    Err(work) => {
                        handle.restore(work);
                        self.bus.publish(
                            Event::new(EventKind::HandleRetryFailed)
                                .with_handle(handle.id())
                                .with_policy(RetryPolicy::Forever)
                                .with_attempt(attempt),
                        );
                        handle.report_failure();
                    }
                }
                true
            }
        }
    }

    fn publish_admitted(&self, handle: &HandleCore, task: TaskId, policy: RetryPolicy, attempt: u32) {
        self.bus.publish(
            Event::new(EventKind::HandleAdmitted)
                .with_handle(handle.id())
                .with_task(task)
                .with_policy(policy)
                .with_attempt(attempt),
        );
    }

    pub(crate) fn pending_handles(&self) -> usize {
        self.lock().waiting_mut().map_or(0, |wait| wait.live())
    }
}
