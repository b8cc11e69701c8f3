//! # Completion signal handed to every work item.
//!
//! Calling [`Signal::done`] marks the current task finished; on the next
//! scheduling opportunity the runner starts the following task (or waits for
//! one). `done` consumes the signal, so a task can complete at most once.
//!
//! Dropping a runner signal without calling `done` leaves the runner stalled
//! on that task. The drop is reported as `EventKind::SignalDropped` so the
//! stall is visible, but the queue does not advance.

use std::fmt;
use std::sync::Arc;

use crate::core::Shared;
use crate::events::{Event, EventKind};

use super::node::TaskId;

enum Target {
    Runner { queue: Arc<Shared>, task: TaskId },
    Detached(Box<dyn FnOnce() + Send + 'static>),
    Spent,
}

/// Completion signal for one task.
pub struct Signal {
    target: Target,
}

impl Signal {
    pub(crate) fn runner(queue: Arc<Shared>, task: TaskId) -> Self {
        Self {
            target: Target::Runner { queue, task },
        }
    }

    /// A signal not bound to any runner; calling it runs `f`.
    ///
    /// Useful to execute a node obtained from `dequeue()` by hand.
    pub fn detached(f: impl FnOnce() + Send + 'static) -> Self {
        Self {
            target: Target::Detached(Box::new(f)),
        }
    }

    /// A signal that does nothing when called.
    pub fn noop() -> Self {
        Self::detached(|| {})
    }

    /// Task the signal completes, if it belongs to a runner.
    pub fn task(&self) -> Option<TaskId> {
        match &self.target {
            Target::Runner { task, .. } => Some(*task),
            _ => None,
        }
    }

    /// Marks the task done.
    pub fn done(mut self) {
        match std::mem::replace(&mut self.target, Target::Spent) {
            Target::Runner { queue, task } => {
                let scheduler = queue.scheduler.clone();
                scheduler.defer(move || queue.finish(task));
            }
            Target::Detached(f) => f(),
            Target::Spent => {}
        }
    }
}

impl Drop for Signal {
    fn drop(&mut self) {
        if let Target::Runner { queue, task } = &self.target {
            queue
                .bus
                .publish(Event::new(EventKind::SignalDropped).with_task(*task));
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.target {
            Target::Runner { .. } => "runner",
            Target::Detached(_) => "detached",
            Target::Spent => "spent",
        };
        f.debug_struct("Signal")
            .field("kind", &kind)
            .field("task", &self.task())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[test]
    fn detached_signal_runs_its_closure() {
        let hit = Arc::new(AtomicBool::new(false));
        let h = Arc::clone(&hit);
        let signal = Signal::detached(move || h.store(true, Ordering::SeqCst));
        assert_eq!(signal.task(), None);

        signal.done();
        assert!(hit.load(Ordering::SeqCst));
    }

    #[test]
    fn noop_signal_is_harmless() {
        Signal::noop().done();
        drop(Signal::noop());
    }
}
