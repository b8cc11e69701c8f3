//! # Shared queue state and the admission/removal primitives.
//!
//! [`Shared`] is the one object every facade, signal and blocked handle points
//! at. All mutable state sits behind a single mutex; continuations run on the
//! [`Scheduler`] driver, one at a time.
//!
//! ## Layers
//! Instead of subclassing, a queue is a capacity plus one overflow layer:
//! ```text
//! Overflow::Reject      → full queue hands work back (bounded / unbounded)
//! Overflow::SideBuffer  → full queue parks work; each dequeue promotes one item
//! Overflow::Blocked     → full queue returns a handle; each dequeue notifies one
//! ```
//!
//! ## Rules
//! - The lock is never held while user code runs.
//! - Lock order is queue state → handle state, never the reverse.
//! - Every successful removal runs the layer hook exactly once.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::admission::{Admission, HandleCore, HandleId, SideBuffer, WaitList};
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{TaskId, TaskList, TaskNode, Work};

use super::scheduler::Scheduler;

/// Overflow layer selected when the queue is built.
pub(crate) enum Overflow {
    Reject,
    SideBuffer(SideBuffer),
    Blocked(WaitList),
}

/// Mutable queue state.
pub(crate) struct State {
    pub list: TaskList,
    pub running: bool,
    /// Runner found the list empty and waits for the next admission.
    pub idle: bool,
    pub in_flight: Option<TaskNode>,
    pub overflow: Overflow,
    /// Admissions plus side-buffer parks; promotions are not counted twice.
    pub submitted: u64,
    pub drained: u64,
    next_task: u64,
    next_handle: u64,
}

impl State {
    fn new(overflow: Overflow) -> Self {
        Self {
            list: TaskList::new(),
            running: false,
            idle: false,
            in_flight: None,
            overflow,
            submitted: 0,
            drained: 0,
            next_task: 0,
            next_handle: 0,
        }
    }

    pub fn next_handle_id(&mut self) -> HandleId {
        self.next_handle += 1;
        HandleId(self.next_handle)
    }

    pub fn side_buffer_mut(&mut self) -> Option<&mut SideBuffer> {
        match &mut self.overflow {
            Overflow::SideBuffer(buf) => Some(buf),
            _ => None,
        }
    }

    pub fn waiting_mut(&mut self) -> Option<&mut WaitList> {
        match &mut self.overflow {
            Overflow::Blocked(wait) => Some(wait),
            _ => None,
        }
    }
}

/// Follow-up owed after a removal, run once the lock is released.
pub(crate) enum Removal {
    None,
    Promote,
    Notify(Arc<HandleCore>),
}

/// State shared by a queue's facade, signals and handles.
pub(crate) struct Shared {
    state: Mutex<State>,
    pub capacity: Option<NonZeroUsize>,
    pub scheduler: Scheduler,
    pub bus: Bus,
    pub token: CancellationToken,
}

impl Shared {
    pub fn new(
        capacity: Option<NonZeroUsize>,
        overflow: Overflow,
        scheduler: Scheduler,
        bus: Bus,
        token: CancellationToken,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::new(overflow)),
            capacity,
            scheduler,
            bus,
            token,
        })
    }

    pub fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_full_locked(&self, st: &State) -> bool {
        self.capacity.is_some_and(|cap| st.list.len() >= cap.get())
    }

    /// Appends a node and reports whether the idle runner must be woken.
    pub fn push_locked(&self, st: &mut State, work: Work) -> (TaskId, bool) {
        st.next_task += 1;
        let id = TaskId(st.next_task);
        st.list.push_back(TaskNode::new(id, work));

        let wake = st.running && st.idle && st.in_flight.is_none();
        if wake {
            st.idle = false;
        }
        (id, wake)
    }

    /// Publishes the admission and wakes the runner if it was waiting.
    pub fn after_push(self: &Arc<Self>, kind: EventKind, task: TaskId, size: usize, wake: bool) {
        self.bus
            .publish(Event::new(kind).with_task(task).with_size(size));
        if wake {
            let me = Arc::clone(self);
            self.scheduler.defer(move || me.drive_next());
        }
    }

    /// Bounded admission through the configured overflow layer.
    pub fn admit(self: &Arc<Self>, work: Work) -> Admission {
        let mut st = self.lock();
        if self.is_full_locked(&st) {
            if let Some(buf) = st.side_buffer_mut() {
                buf.push_back(work);
                let parked = buf.len();
                st.submitted += 1;
                drop(st);
                self.bus
                    .publish(Event::new(EventKind::TaskBuffered).with_size(parked));
                return Admission::Buffered;
            }
            drop(st);
            self.bus.publish(Event::new(EventKind::AdmissionRejected));
            return Admission::Rejected(work);
        }

        let (task, wake) = self.push_locked(&mut st, work);
        st.submitted += 1;
        let size = st.list.len();
        drop(st);
        self.after_push(EventKind::TaskAdmitted, task, size, wake);
        Admission::Accepted(task)
    }

    /// Admission that ignores the capacity.
    pub fn admit_forced(self: &Arc<Self>, work: Work) -> TaskId {
        let mut st = self.lock();
        let (task, wake) = self.push_locked(&mut st, work);
        st.submitted += 1;
        let size = st.list.len();
        drop(st);
        self.after_push(EventKind::TaskAdmitted, task, size, wake);
        task
    }

    /// Detaches the head and works out the layer follow-up.
    pub fn dequeue_locked(&self, st: &mut State) -> Option<(TaskNode, Removal)> {
        let node = st.list.pop_front()?;
        st.drained += 1;

        let removal = match &mut st.overflow {
            Overflow::Reject => Removal::None,
            Overflow::SideBuffer(buf) if buf.is_empty() => Removal::None,
            Overflow::SideBuffer(_) => Removal::Promote,
            Overflow::Blocked(wait) => match wait.pop_next_pending() {
                Some(handle) => Removal::Notify(handle),
                None => Removal::None,
            },
        };
        Some((node, removal))
    }

    /// Publishes the removal and schedules the layer follow-up.
    pub fn after_dequeue(self: &Arc<Self>, task: TaskId, size: usize, removal: Removal) {
        self.bus.publish(
            Event::new(EventKind::TaskDequeued)
                .with_task(task)
                .with_size(size),
        );
        match removal {
            Removal::None => {}
            Removal::Promote => {
                let me = Arc::clone(self);
                self.scheduler.defer(move || me.promote());
            }
            Removal::Notify(handle) => {
                self.bus
                    .publish(Event::new(EventKind::HandleNotified).with_handle(handle.id()));
                let me = Arc::clone(self);
                self.scheduler.defer(move || me.resolve(handle));
            }
        }
    }

    /// Detaches and returns the head node.
    pub fn dequeue(self: &Arc<Self>) -> Option<TaskNode> {
        let mut st = self.lock();
        let (node, removal) = self.dequeue_locked(&mut st)?;
        let size = st.list.len();
        drop(st);
        self.after_dequeue(node.id(), size, removal);
        Some(node)
    }

    pub fn size(&self) -> usize {
        self.lock().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().list.is_empty()
    }

    pub fn is_full(&self) -> bool {
        let st = self.lock();
        self.is_full_locked(&st)
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    pub fn current_task(&self) -> Option<TaskId> {
        self.lock().in_flight.as_ref().map(TaskNode::id)
    }

    pub fn submitted(&self) -> u64 {
        self.lock().submitted
    }

    pub fn drained(&self) -> u64 {
        self.lock().drained
    }

    /// Stops the runner and the scheduler driver.
    pub fn shutdown(&self) {
        let was_running = std::mem::replace(&mut self.lock().running, false);
        if was_running {
            self.bus.publish(Event::new(EventKind::RunnerStopped));
        }
        self.token.cancel();
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
