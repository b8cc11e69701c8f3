//! # Work items, task nodes and the FIFO list.
//!
//! This module provides the task-related types:
//! - [`Work`] - an opaque unit of work, `FnOnce(Signal)`
//! - [`Signal`] - completion signal handed to each work item
//! - [`TaskNode`] - one admitted unit of work plus its completion flag
//! - [`TaskId`] - stable id assigned at admission
//! - `TaskList` - the FIFO the runner drains

mod list;
mod node;
mod signal;

pub(crate) use list::TaskList;
pub use node::{TaskId, TaskNode, Work};
pub use signal::Signal;
