use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::admission::Admission;
use crate::config::QueueConfig;
use crate::core::{QueueBuilder, Shared};
use crate::error::QueueError;
use crate::tasks::Signal;

use super::runner_surface;

/// Bounded runner with a side buffer.
///
/// A full queue parks work in the side buffer instead of rejecting it. Every
/// removal from the queue promotes exactly one parked item, oldest first, on
/// the next scheduling opportunity.
#[derive(Clone)]
pub struct BufferedQueue {
    shared: Arc<Shared>,
}

runner_surface!(BufferedQueue);

impl BufferedQueue {
    /// Creates a queue holding at most `capacity` tasks plus an unbounded side buffer.
    ///
    /// Fails with `InvalidArgument` if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        QueueBuilder::new(QueueConfig::with_capacity(capacity)).buffered()
    }

    /// Admits work, or parks it in the side buffer if the queue is full.
    pub fn enqueue(&self, work: impl FnOnce(Signal) + Send + 'static) -> Admission {
        self.shared.admit(Box::new(work))
    }

    /// Number of parked items.
    pub fn buffered_len(&self) -> usize {
        self.shared.buffered_len()
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
    use crate::queues::testkit::{Trace, labels};

    fn run_head(queue: &BufferedQueue) {
        let node = queue.dequeue().unwrap();
        (node.into_work().unwrap())(Signal::noop());
    }

    fn assert_balanced(queue: &BufferedQueue) {
        assert_eq!(
            (queue.buffered_len() + queue.size()) as u64,
            queue.submitted() - queue.drained()
        );
    }

    #[test]
    fn zero_capacity_fails_fast() {
        assert!(BufferedQueue::new(0).is_err());
    }

    #[tokio::test]
    async fn refills_one_item_per_dequeue_in_arrival_order() {
        let queue = BufferedQueue::new(2).unwrap();
        let trace = Trace::default();

        assert!(queue.enqueue(trace.work("A")).is_accepted());
        assert!(queue.enqueue(trace.work("B")).is_accepted());
        assert!(queue.enqueue(trace.work("C")).is_buffered());
        assert!(queue.enqueue(trace.work("D")).is_buffered());
        assert_eq!(queue.buffered_len(), 2);
        assert_balanced(&queue);

        run_head(&queue);
        assert_eq!(queue.size(), 1);
        queue.flush().await;
        assert_eq!(queue.size(), 2);
        assert_eq!(queue.buffered_len(), 1);
        assert_balanced(&queue);

        run_head(&queue);
        queue.flush().await;
        assert_eq!(queue.size(), 2);
        assert_eq!(queue.buffered_len(), 0);

        run_head(&queue);
        run_head(&queue);
        queue.flush().await;
        assert!(queue.is_empty());
        assert_balanced(&queue);
        assert_eq!(trace.take(), labels(&["A", "B", "C", "D"]));
    }

    #[tokio::test]
    async fn promotion_yields_to_a_racing_producer() {
        let queue = BufferedQueue::new(1).unwrap();
        let trace = Trace::default();

        queue.enqueue(trace.work("A"));
        assert!(queue.enqueue(trace.work("B")).is_buffered());

        run_head(&queue);
        // Takes the freed slot before the promotion runs.
        assert!(queue.enqueue(trace.work("C")).is_accepted());
        queue.flush().await;
        assert_eq!(queue.size(), 1);
        assert_eq!(queue.buffered_len(), 1);

        run_head(&queue);
        queue.flush().await;
        run_head(&queue);
        assert_eq!(trace.take(), labels(&["A", "C", "B"]));
        assert_balanced(&queue);
    }

    #[tokio::test]
    async fn runner_drains_buffer_through_the_queue() {
        let queue = BufferedQueue::new(1).unwrap();
        let trace = Trace::default();

        for i in 0..5 {
            queue.enqueue(trace.work(i.to_string()));
        }
        assert_eq!(queue.buffered_len(), 4);

        queue.run();
        queue.flush().await;

        let expected: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        assert_eq!(trace.take(), expected);
        assert_eq!(queue.buffered_len(), 0);
        assert_balanced(&queue);
    }
}
