//! # Blocked admission handle.
//!
//! A [`BlockedHandle`] is returned by
//! [`BlockingQueue::enqueue_blocked`](crate::BlockingQueue::enqueue_blocked).
//! If the queue had room the handle is born `Admitted`; otherwise it is
//! `Pending` and sits in the queue's waiting list until a dequeue notifies it.
//!
//! The producer negotiates through the handle:
//! - [`if_blocked`](BlockedHandle::if_blocked) registers a callback that runs
//!   once, deferred, with a [`BlockedControl`] for choosing a policy or giving up;
//! - [`on_enqueue_succeeded`](BlockedHandle::on_enqueue_succeeded) /
//!   [`on_enqueue_failed`](BlockedHandle::on_enqueue_failed) report outcomes.
//!
//! The handle is shared by the producer and the waiting list, so the
//! producer may drop its copy once callbacks are registered. The handle only
//! holds a weak reference to its queue.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::core::Shared;
use crate::events::{Event, EventKind};
use crate::policies::RetryPolicy;
use crate::tasks::Work;

/// Identifier of a blocked admission attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandleId(pub(crate) u64);

impl HandleId {
    /// Raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle#{}", self.0)
    }
}

/// Observable state of a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleStatus {
    /// Work is in the queue (immediately or after a FOREVER retry).
    Admitted,
    /// Blocked, no policy chosen yet.
    Pending,
    /// Blocked, will be force-admitted on the next notification.
    AwaitingOnce,
    /// Blocked, retries bounded admission on every notification.
    AwaitingForever,
    /// ONCE policy was honoured; work is in the queue.
    Resolved,
    /// Producer gave up, or no policy was chosen when notified.
    Abandoned,
}

impl HandleStatus {
    /// True once no further notification can change the handle.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HandleStatus::Admitted | HandleStatus::Resolved | HandleStatus::Abandoned
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Admitted,
    Pending,
    Resolved,
    Abandoned,
}

pub(crate) type BlockedFn = Box<dyn FnOnce(BlockedControl) + Send + 'static>;
pub(crate) type SuccessFn = Box<dyn FnOnce() + Send + 'static>;
pub(crate) type FailureFn = Box<dyn FnMut() + Send + 'static>;

struct HandleState {
    phase: Phase,
    work: Option<Work>,
    policy: Option<RetryPolicy>,
    blocked_cb: Option<BlockedFn>,
    blocked_cb_ran: bool,
    on_success: Option<SuccessFn>,
    /// Succeeded before anyone registered `on_enqueue_succeeded`.
    success_unreported: bool,
    on_failure: Option<FailureFn>,
    attempts: u32,
}

/// What a notification should do, decided under the handle lock.
pub(crate) enum Decision {
    Skip,
    Abandon(Option<FailureFn>),
    Once { work: Work, attempt: u32 },
    Forever { work: Work, attempt: u32 },
}

/// State shared by a [`BlockedHandle`], its controls and the waiting list.
pub(crate) struct HandleCore {
    id: HandleId,
    queue: Weak<Shared>,
    state: Mutex<HandleState>,
}

impl HandleCore {
    fn with_phase(id: HandleId, queue: Weak<Shared>, phase: Phase, work: Option<Work>) -> Arc<Self> {
        Arc::new(Self {
            id,
            queue,
            state: Mutex::new(HandleState {
                phase,
                work,
                policy: None,
                blocked_cb: None,
                blocked_cb_ran: false,
                on_success: None,
                success_unreported: phase == Phase::Admitted,
                on_failure: None,
                attempts: 0,
            }),
        })
    }

    pub fn pending(id: HandleId, queue: Weak<Shared>, work: Work) -> Arc<Self> {
        Self::with_phase(id, queue, Phase::Pending, Some(work))
    }

    pub fn admitted(id: HandleId, queue: Weak<Shared>) -> Arc<Self> {
        Self::with_phase(id, queue, Phase::Admitted, None)
    }

    fn lock(&self) -> MutexGuard<'_, HandleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn is_pending(&self) -> bool {
        self.lock().phase == Phase::Pending
    }

    pub fn status(&self) -> HandleStatus {
        let st = self.lock();
        match (st.phase, st.policy) {
            (Phase::Admitted, _) => HandleStatus::Admitted,
            (Phase::Resolved, _) => HandleStatus::Resolved,
            (Phase::Abandoned, _) => HandleStatus::Abandoned,
            (Phase::Pending, None) => HandleStatus::Pending,
            (Phase::Pending, Some(RetryPolicy::Once)) => HandleStatus::AwaitingOnce,
            (Phase::Pending, Some(RetryPolicy::Forever)) => HandleStatus::AwaitingForever,
        }
    }

    fn set_policy(&self, policy: RetryPolicy) {
        let mut st = self.lock();
        if st.phase == Phase::Pending {
            st.policy = Some(policy);
        }
    }

    fn give_up(&self) {
        {
            let mut st = self.lock();
            if st.phase != Phase::Pending {
                return;
            }
            st.phase = Phase::Abandoned;
            st.work = None;
            st.blocked_cb = None;
            st.on_success = None;
            st.on_failure = None;
        }
        if let Some(queue) = self.queue.upgrade() {
            queue.bus.publish(
                Event::new(EventKind::HandleAbandoned)
                    .with_handle(self.id)
                    .with_reason("give_up"),
            );
        }
    }

    /// Takes the `if_blocked` callback if it has not run yet, marking it run.
    pub fn take_unrun_callback(&self) -> Option<BlockedFn> {
        let mut st = self.lock();
        if st.phase != Phase::Pending || st.blocked_cb_ran {
            return None;
        }
        let cb = st.blocked_cb.take()?;
        st.blocked_cb_ran = true;
        Some(cb)
    }

    pub fn decide(&self) -> Decision {
        let mut st = self.lock();
        if st.phase != Phase::Pending {
            return Decision::Skip;
        }
        let Some(policy) = st.policy else {
            st.phase = Phase::Abandoned;
            st.work = None;
            st.on_success = None;
            return Decision::Abandon(st.on_failure.take());
        };
        let Some(work) = st.work.take() else {
            return Decision::Skip;
        };
        st.attempts += 1;
        let attempt = st.attempts;
        match policy {
            RetryPolicy::Once => {
                st.phase = Phase::Resolved;
                Decision::Once { work, attempt }
            }
            RetryPolicy::Forever => Decision::Forever { work, attempt },
        }
    }

    /// Returns work after a failed FOREVER attempt.
    pub fn restore(&self, work: Work) {
        let mut st = self.lock();
        if st.phase == Phase::Pending {
            st.work = Some(work);
        }
    }

    pub fn mark_admitted(&self) {
        self.lock().phase = Phase::Admitted;
    }

    /// Hands out the success callback, or latches success for a later registration.
    pub fn take_success(&self) -> Option<SuccessFn> {
        let mut st = self.lock();
        match st.on_success.take() {
            Some(cb) => Some(cb),
            None => {
                st.success_unreported = true;
                None
            }
        }
    }

    /// Runs the failure callback, keeping it for later attempts.
    pub fn report_failure(&self) {
        let Some(mut cb) = self.lock().on_failure.take() else {
            return;
        };
        cb();
        let mut st = self.lock();
        if st.on_failure.is_none() && st.phase == Phase::Pending {
            st.on_failure = Some(cb);
        }
    }
}

/// Control operations bound to one handle, passed to the `if_blocked` callback.
#[derive(Clone)]
pub struct BlockedControl {
    core: Arc<HandleCore>,
}

impl BlockedControl {
    pub(crate) fn new(core: Arc<HandleCore>) -> Self {
        Self { core }
    }

    /// Chooses how the next notification is handled.
    pub fn request_enqueue(&self, policy: RetryPolicy) {
        self.core.set_policy(policy);
    }

    /// Abandons the admission attempt; no callback fires afterwards.
    pub fn give_up(&self) {
        self.core.give_up();
    }

    /// Id of the handle this control belongs to.
    pub fn handle_id(&self) -> HandleId {
        self.core.id()
    }
}

impl fmt::Debug for BlockedControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockedControl")
            .field("handle", &self.core.id())
            .finish()
    }
}

/// Producer's side of an admission attempt on a [`BlockingQueue`](crate::BlockingQueue).
///
/// Registration methods return `&Self` so they chain:
/// ```no_run
/// # async fn demo(queue: tasklane::BlockingQueue) {
/// use tasklane::RetryPolicy;
///
/// queue
///     .enqueue_blocked(|signal| signal.done())
///     .if_blocked(|control| control.request_enqueue(RetryPolicy::Forever))
///     .on_enqueue_succeeded(|| println!("admitted"))
///     .on_enqueue_failed(|| println!("still full"));
/// # }
/// ```
#[derive(Clone)]
pub struct BlockedHandle {
    core: Arc<HandleCore>,
    blocked: bool,
}

impl BlockedHandle {
    pub(crate) fn new(core: Arc<HandleCore>, blocked: bool) -> Self {
        Self { core, blocked }
    }

    pub fn id(&self) -> HandleId {
        self.core.id()
    }

    /// False if the work was admitted when the handle was created.
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn status(&self) -> HandleStatus {
        self.core.status()
    }

    /// Registers the negotiation callback.
    ///
    /// If the handle is pending, `cb` runs once on the next scheduling
    /// opportunity with this handle's [`BlockedControl`]. If a notification
    /// reaches the handle first, the callback is run right before the policy
    /// is checked. No-op for a handle that was never blocked.
    pub fn if_blocked(&self, cb: impl FnOnce(BlockedControl) + Send + 'static) -> &Self {
        {
            let mut st = self.core.lock();
            if st.phase != Phase::Pending {
                return self;
            }
            st.blocked_cb = Some(Box::new(cb));
            st.blocked_cb_ran = false;
        }
        if let Some(queue) = self.core.queue.upgrade() {
            let core = Arc::clone(&self.core);
            queue.scheduler.defer(move || {
                if let Some(cb) = core.take_unrun_callback() {
                    cb(BlockedControl::new(Arc::clone(&core)));
                }
            });
        }
        self
    }

    /// Sets the retry policy directly (same as through [`BlockedControl`]).
    pub fn request_enqueue(&self, policy: RetryPolicy) -> &Self {
        self.core.set_policy(policy);
        self
    }

    /// Abandons the attempt. Takes effect on the next observation of the handle.
    pub fn give_up(&self) {
        self.core.give_up();
    }

    /// Registers the success callback; it fires at most once.
    ///
    /// If the handle already succeeded (e.g. admitted at creation), `cb` fires
    /// on the next scheduling opportunity.
    pub fn on_enqueue_succeeded(&self, cb: impl FnOnce() + Send + 'static) -> &Self {
        {
            let mut st = self.core.lock();
            if !st.success_unreported {
                if st.phase == Phase::Pending {
                    st.on_success = Some(Box::new(cb));
                }
                return self;
            }
            st.success_unreported = false;
        }
        if let Some(queue) = self.core.queue.upgrade() {
            queue.scheduler.defer(cb);
        }
        self
    }

    /// Registers the failure callback; it fires once per failed FOREVER
    /// attempt, or once when a policy-less handle is notified.
    pub fn on_enqueue_failed(&self, cb: impl FnMut() + Send + 'static) -> &Self {
        let mut st = self.core.lock();
        if st.phase == Phase::Pending {
            st.on_failure = Some(Box::new(cb));
        }
        self
    }
}

impl fmt::Debug for BlockedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockedHandle")
            .field("id", &self.core.id())
            .field("blocked", &self.blocked)
            .field("status", &self.core.status())
            .finish()
    }
}
