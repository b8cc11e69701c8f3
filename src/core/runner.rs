//! # Sequential drain loop.
//!
//! Drives admitted tasks one at a time: a task is started only after the
//! previous one has signalled completion.
//!
//! ## Flow
//! ```text
//! run() ──► defer(drive_next)
//!
//! drive_next:
//!   ├─ not running / task in flight ─► return
//!   ├─ list empty ─► idle = true (next admission defers drive_next)
//!   └─ dequeue head ─► in_flight = node ─► defer(work(signal))
//!
//! signal.done() ──► defer(finish):
//!   └─ mark in-flight node done ─► drive_next
//! ```
//!
//! ## Rules
//! - At most one task is in flight.
//! - `stop()` lets the in-flight task finish but starts nothing new;
//!   a `drive_next` already deferred sees `running == false` and returns.
//! - Work is never invoked synchronously from `enqueue` or `run`.

use std::sync::Arc;

use crate::events::{Event, EventKind};
use crate::tasks::{Signal, TaskId, TaskNode};

use super::shared::Shared;

impl Shared {
    /// Starts draining. No-op if already running.
    pub fn run(self: &Arc<Self>) {
        {
            let mut st = self.lock();
            if st.running {
                return;
            }
            st.running = true;
            st.idle = false;
        }
        self.bus.publish(Event::new(EventKind::RunnerStarted));

        let me = Arc::clone(self);
        self.scheduler.defer(move || me.drive_next());
    }

    /// Stops draining after the in-flight task. No-op if already stopped.
    pub fn stop(&self) {
        {
            let mut st = self.lock();
            if !st.running {
                return;
            }
            st.running = false;
            st.idle = false;
        }
        self.bus.publish(Event::new(EventKind::RunnerStopped));
    }

    /// Starts the next task, or parks the runner until the next admission.
    pub(crate) fn drive_next(self: &Arc<Self>) {
        let mut st = self.lock();
        if !st.running || st.in_flight.is_some() {
            return;
        }
        let Some((mut node, removal)) = self.dequeue_locked(&mut st) else {
            st.idle = true;
            drop(st);
            self.bus.publish(Event::new(EventKind::RunnerIdle));
            return;
        };

        let task = node.id();
        let work = node.take_work();
        st.in_flight = Some(node);
        let size = st.list.len();
        drop(st);

        self.after_dequeue(task, size, removal);

        if let Some(work) = work {
            let signal = Signal::runner(Arc::clone(self), task);
            let bus = self.bus.clone();
            self.scheduler.defer(move || {
                bus.publish(Event::new(EventKind::TaskStarting).with_task(task));
                work(signal);
            });
        }
    }

    /// Completion of the in-flight task, reached through its signal.
    pub(crate) fn finish(self: &Arc<Self>, task: TaskId) {
        {
            let mut st = self.lock();
            if st.in_flight.as_ref().map(TaskNode::id) != Some(task) {
                return;
            }
            if let Some(mut node) = st.in_flight.take() {
                node.finish();
            }
        }
        self.bus
            .publish(Event::new(EventKind::TaskDone).with_task(task));
        self.drive_next();
    }
}
