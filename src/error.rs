//! Error types used by the tasklane queues.
//!
//! [`QueueError`] covers the only failures the core can raise synchronously:
//! invalid construction arguments and a missing async runtime.
//!
//! Capacity exhaustion is **not** an error. A full bounded queue hands the work
//! back as [`Admission::Rejected`](crate::Admission::Rejected) and the caller
//! decides what to do (drop it, retry, or use the blocked-admission protocol).

use thiserror::Error;

/// # Errors produced while building or driving a queue.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// An argument was rejected at the call site (e.g. a bounded queue with capacity 0).
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: &'static str,
    },

    /// The queue was constructed outside a tokio runtime, so there is nothing
    /// to drive its continuations.
    #[error("no tokio runtime available to drive the queue")]
    NoRuntime,
}

impl QueueError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tasklane::QueueError;
    ///
    /// let err = QueueError::InvalidArgument { reason: "capacity must be positive" };
    /// assert_eq!(err.as_label(), "queue_invalid_argument");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::InvalidArgument { .. } => "queue_invalid_argument",
            QueueError::NoRuntime => "queue_no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            QueueError::InvalidArgument { reason } => format!("invalid argument: {reason}"),
            QueueError::NoRuntime => "no tokio runtime".to_string(),
        }
    }

    pub(crate) fn zero_capacity() -> Self {
        QueueError::InvalidArgument {
            reason: "capacity must be positive",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(QueueError::zero_capacity().as_label(), "queue_invalid_argument");
        assert_eq!(QueueError::NoRuntime.as_label(), "queue_no_runtime");
    }

    #[test]
    fn zero_capacity_message_names_the_problem() {
        let err = QueueError::zero_capacity();
        assert_eq!(err.to_string(), "invalid argument: capacity must be positive");
        assert_eq!(err.as_message(), "invalid argument: capacity must be positive");
    }
}
