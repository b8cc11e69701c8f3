//! # Retry policies for blocked producers.
//!
//! [`RetryPolicy`] tells a [`BlockedHandle`](crate::BlockedHandle) what to do
//! when a dequeue notification reaches it.
//!
//! - [`RetryPolicy::Once`] admits the work on the first notification, bypassing the capacity check.
//! - [`RetryPolicy::Forever`] attempts a normal bounded admission on every
//!   notification until it succeeds or the producer gives up.
//!
//! ## Choosing the right policy
//! ```text
//! RetryPolicy::Once     → next freed slot is yours, even if a racing producer
//!                         refilled it (queue may briefly exceed capacity)
//! RetryPolicy::Forever  → capacity is respected; each failed attempt reports
//!                         failure and re-joins the waiting list at the tail
//! ```
//!
//! A handle with no policy when notified is retired as abandoned and its
//! failure callback fires once.

/// Policy controlling how a blocked handle is resolved on notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Force admission on the next notification; always reports success.
    Once,
    /// Retry normal admission on every notification until success or `give_up()`.
    Forever,
}

impl RetryPolicy {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryPolicy::Once => "once",
            RetryPolicy::Forever => "forever",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(RetryPolicy::Once.as_label(), "once");
        assert_eq!(RetryPolicy::Forever.as_label(), "forever");
    }
}
