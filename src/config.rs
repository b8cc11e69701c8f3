//! # Queue configuration.
//!
//! Provides [`QueueConfig`], the settings shared by every queue flavour.
//!
//! Config is used in two ways:
//! 1. **Builder**: `QueueBuilder::new(config)` then `.bounded()`, `.buffered()`, ...
//! 2. **Shorthands**: `BoundedQueue::new(capacity)` fills in the defaults.
//!
//! ## Sentinel values
//! - `capacity = 0` → unbounded (accepted only by [`TaskQueue`](crate::TaskQueue);
//!   the bounded flavours reject it with `InvalidArgument`)

use std::num::NonZeroUsize;

/// Settings for a queue.
///
/// ## Field semantics
/// - `capacity`: Maximum number of admitted, not yet dequeued tasks (`0` = unbounded)
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
///
/// All fields are public. Prefer the helper accessors over checking the
/// sentinel directly.
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Maximum number of admitted tasks.
    ///
    /// - `0` = unbounded
    /// - `n > 0` = at most `n` tasks wait in the queue
    ///
    /// The side buffer and the blocked waiting list are not counted.
    pub capacity: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events
    /// skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,
}

impl QueueConfig {
    /// Config for a queue bounded to `capacity` tasks.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Returns the capacity as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` admitted tasks
    #[inline]
    pub fn capacity_limit(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.capacity)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for QueueConfig {
    /// Default configuration:
    ///
    /// - `capacity = 0` (unbounded)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            capacity: 0,
            bus_capacity: 1024,
        }
    }
}
