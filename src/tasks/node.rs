//! # Task node: one admitted unit of work.
//!
//! A [`TaskNode`] is owned by the queue while linked, by the runner while its
//! work executes, and is dropped once the signal marks it done.

use std::fmt;

use super::signal::Signal;

/// Opaque unit of work.
///
/// The runner calls it exactly once with a [`Signal`]. The work **must** call
/// [`Signal::done`] on every control path, including its own failure path:
/// the runner advances only on the signal, never on return or panic, so a
/// work item that never signals stalls the queue.
pub type Work = Box<dyn FnOnce(Signal) + Send + 'static>;

/// Identifier assigned to a task when it is admitted.
///
/// Ids increase monotonically per queue, so they also record admission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub(crate) u64);

impl TaskId {
    /// Raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// One admitted unit of work.
pub struct TaskNode {
    id: TaskId,
    work: Option<Work>,
    finished: bool,
}

impl TaskNode {
    pub(crate) fn new(id: TaskId, work: Work) -> Self {
        Self {
            id,
            work: Some(work),
            finished: false,
        }
    }

    /// Id assigned at admission.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// True once the task's signal has been called.
    pub fn is_done(&self) -> bool {
        self.finished
    }

    /// Detaches the work, e.g. to run a node obtained from `dequeue()` by hand.
    ///
    /// Returns `None` if the runner already started it.
    pub fn into_work(mut self) -> Option<Work> {
        self.work.take()
    }

    pub(crate) fn take_work(&mut self) -> Option<Work> {
        self.work.take()
    }

    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }
}

impl fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskNode")
            .field("id", &self.id)
            .field("started", &self.work.is_none())
            .field("finished", &self.finished)
            .finish()
    }
}
