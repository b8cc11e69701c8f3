//! # Admission: outcomes, the side buffer and the blocked-admission protocol.
//!
//! ## Contents
//! - [`Admission`] outcome of a bounded `enqueue`
//! - `SideBuffer` overflow area of [`BufferedQueue`](crate::BufferedQueue)
//! - [`BlockedHandle`], [`BlockedControl`], [`HandleStatus`] the per-producer
//!   retry negotiation of [`BlockingQueue`](crate::BlockingQueue)
//!
//! ## Handle state machine
//! ```text
//! ADMITTED (terminal)
//! PENDING ──if_blocked(cb)──────────► PENDING (cb deferred, runs once)
//! PENDING ──request_enqueue(Once)───► AWAITING_ONCE
//! PENDING ──request_enqueue(Forever)► AWAITING_FOREVER
//! PENDING ──give_up()───────────────► ABANDONED (terminal, silent)
//! AWAITING_ONCE ──notified──────────► RESOLVED (forced admission, success)
//! AWAITING_FOREVER ──notified, room─► ADMITTED (success)
//! AWAITING_FOREVER ──notified, full─► AWAITING_FOREVER (failure, rejoins tail)
//! PENDING (no policy) ──notified────► ABANDONED (failure fires once)
//! ```

mod blocked;
mod buffer;
mod handle;

use std::fmt;

use crate::tasks::{TaskId, Work};

pub(crate) use blocked::WaitList;
pub(crate) use buffer::SideBuffer;
pub(crate) use handle::HandleCore;
pub use handle::{BlockedControl, BlockedHandle, HandleId, HandleStatus};

/// Outcome of offering work to a queue.
///
/// - [`BoundedQueue`](crate::BoundedQueue) and
///   [`BlockingQueue`](crate::BlockingQueue) return `Accepted` or `Rejected`.
/// - [`BufferedQueue`](crate::BufferedQueue) returns `Accepted` or `Buffered`.
pub enum Admission {
    /// Work was admitted under the given id.
    Accepted(TaskId),
    /// Queue was full; work waits in the side buffer.
    Buffered,
    /// Queue was full; nothing changed and the work is handed back.
    Rejected(Work),
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted(_))
    }

    pub fn is_buffered(&self) -> bool {
        matches!(self, Admission::Buffered)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Admission::Rejected(_))
    }

    /// Id of the admitted task, if any.
    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            Admission::Accepted(id) => Some(*id),
            _ => None,
        }
    }

    /// Takes back rejected work.
    pub fn into_rejected(self) -> Option<Work> {
        match self {
            Admission::Rejected(work) => Some(work),
            _ => None,
        }
    }
}

impl fmt::Debug for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Admission::Accepted(id) => f.debug_tuple("Accepted").field(id).finish(),
            Admission::Buffered => f.write_str("Buffered"),
            Admission::Rejected(_) => f.write_str("Rejected(..)"),
        }
    }
}
