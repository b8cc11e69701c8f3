//! # Side buffer: overflow area with arrival-order refill.
//!
//! A full [`BufferedQueue`](crate::BufferedQueue) parks work here instead of
//! rejecting it. Every successful dequeue defers exactly one promotion, which
//! moves the oldest parked item into the queue through a normal bounded
//! admission.
//!
//! Invariant: `buffer.len() + queue.size() == submitted - drained`.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::core::Shared;
use crate::events::EventKind;
use crate::tasks::Work;

/// Parked work in arrival order.
#[derive(Default)]
pub(crate) struct SideBuffer {
    items: VecDeque<Work>,
}

impl SideBuffer {
    pub fn push_back(&mut self, work: Work) {
        self.items.push_back(work);
    }

    pub fn pop_front(&mut self) -> Option<Work> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Shared {
    /// Moves one parked item into the queue.
    ///
    /// If a racing producer took the freed slot, the item stays at the front
    /// of the buffer; the next dequeue defers another promotion.
    pub(crate) fn promote(self: &Arc<Self>) {
        let mut st = self.lock();
        if self.is_full_locked(&st) {
            return;
        }
        let Some(work) = st.side_buffer_mut().and_then(SideBuffer::pop_front) else {
            return;
        };
        let (task, wake) = self.push_locked(&mut st, work);
        let size = st.list.len();
        drop(st);
        self.after_push(EventKind::TaskPromoted, task, size, wake);
    }

    pub(crate) fn buffered_len(&self) -> usize {
        self.lock().side_buffer_mut().map_or(0, |buf| buf.len())
    }
}
