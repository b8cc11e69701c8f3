use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    admission::{SideBuffer, WaitList},
    config::QueueConfig,
    error::QueueError,
    events::Bus,
    queues::{BlockingQueue, BoundedQueue, BufferedQueue, TaskQueue},
    subscribers::{Subscribe, SubscriberSet},
};

use super::{
    scheduler::Scheduler,
    shared::{Overflow, Shared},
};

/// Builder for constructing a queue with optional subscribers.
///
/// The terminal method picks the queue flavour:
/// - [`unbounded`](Self::unbounded): never rejects, ignores `capacity`
/// - [`bounded`](Self::bounded): rejects when full
/// - [`buffered`](Self::buffered): parks overflow in a side buffer
/// - [`blocking`](Self::blocking): returns blocked handles when full
///
/// Must be called from within a tokio runtime.
pub struct QueueBuilder {
    cfg: QueueConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl QueueBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: QueueConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive queue events through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    pub fn unbounded(self) -> Result<TaskQueue, QueueError> {
        self.build(Overflow::Reject, false).map(TaskQueue::from_shared)
    }

    pub fn bounded(self) -> Result<BoundedQueue, QueueError> {
        self.build(Overflow::Reject, true).map(BoundedQueue::from_shared)
    }

    pub fn buffered(self) -> Result<BufferedQueue, QueueError> {
        self.build(Overflow::SideBuffer(SideBuffer::default()), true)
            .map(BufferedQueue::from_shared)
    }

    pub fn blocking(self) -> Result<BlockingQueue, QueueError> {
        self.build(Overflow::Blocked(WaitList::default()), true)
            .map(BlockingQueue::from_shared)
    }

    /// Initializes the runtime components:
    /// - capacity validation (bounded flavours only)
    /// - event bus and scheduler driver
    /// - subscriber workers and their bus listener
    fn build(self, overflow: Overflow, bounded: bool) -> Result<Arc<Shared>, QueueError> {
        let capacity = if bounded {
            Some(
                self.cfg
                    .capacity_limit()
                    .ok_or_else(QueueError::zero_capacity)?,
            )
        } else {
            None
        };

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let token = CancellationToken::new();
        let scheduler = Scheduler::start(bus.clone(), token.clone())?;

        if !self.subscribers.is_empty() {
            SubscriberSet::new(self.subscribers, bus.clone()).spawn_listener(token.clone());
        }

        Ok(Shared::new(capacity, overflow, scheduler, bus, token))
    }
}
