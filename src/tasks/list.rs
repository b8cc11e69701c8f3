//! # FIFO of admitted task nodes.
//!
//! Invariants:
//! - `len() == 0` ⇔ there is no head ⇔ there is no tail
//! - nodes leave in the order they entered

use std::collections::VecDeque;

use super::node::TaskNode;

/// FIFO of admitted, not yet started tasks.
#[derive(Debug, Default)]
pub(crate) struct TaskList {
    nodes: VecDeque<TaskNode>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends at the tail.
    pub fn push_back(&mut self, node: TaskNode) {
        self.nodes.push_back(node);
    }

    /// Detaches the head.
    pub fn pop_front(&mut self) -> Option<TaskNode> {
        self.nodes.pop_front()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
