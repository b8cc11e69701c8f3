use std::sync::Arc;

use crate::config::QueueConfig;
use crate::core::{QueueBuilder, Shared};
use crate::error::QueueError;
use crate::tasks::{Signal, TaskId};

use super::runner_surface;

/// Unbounded sequential runner. Admission never fails.
///
/// # Example
/// ```no_run
/// # async fn demo() -> Result<(), tasklane::QueueError> {
/// let queue = tasklane::TaskQueue::new()?;
/// queue.enqueue(|signal| {
///     println!("first");
///     signal.done();
/// });
/// queue.run();
/// queue.flush().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TaskQueue {
    shared: Arc<Shared>,
}

runner_surface!(TaskQueue);

impl TaskQueue {
    /// Creates an unbounded queue on the current tokio runtime.
    pub fn new() -> Result<Self, QueueError> {
        QueueBuilder::new(QueueConfig::default()).unbounded()
    }

    /// Appends work at the tail and returns its id.
    pub fn enqueue(&self, work: impl FnOnce(Signal) + Send + 'static) -> TaskId {
        // No capacity to check.
        self.shared.admit_forced(Box::new(work))
    }
}
