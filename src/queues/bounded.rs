use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::admission::Admission;
use crate::config::QueueConfig;
use crate::core::{QueueBuilder, Shared};
use crate::error::QueueError;
use crate::tasks::Signal;

use super::runner_surface;

/// Sequential runner with a fixed capacity.
///
/// A full queue rejects synchronously and without side effects, handing the
/// work back in [`Admission::Rejected`].
#[derive(Clone)]
pub struct BoundedQueue {
    shared: Arc<Shared>,
}

runner_surface!(BoundedQueue);

impl BoundedQueue {
    /// Creates a queue holding at most `capacity` tasks.
    ///
    /// Fails with `InvalidArgument` if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        QueueBuilder::new(QueueConfig::with_capacity(capacity)).bounded()
    }

    /// Admits work, or rejects it if the queue is full.
    pub fn enqueue(&self, work: impl FnOnce(Signal) + Send + 'static) -> Admission {
        self.shared.admit(Box::new(work))
    }

    pub fn is_full(&self) -> bool {
        self.shared.is_full()
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.shared.capacity
    }
}
