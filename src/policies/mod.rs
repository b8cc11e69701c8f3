//! Retry policies.
//!
//! ## Contents
//! - [`RetryPolicy`] how a blocked producer is resolved (once / forever)
//!
//! ## Quick wiring
//! ```text
//! BlockedHandle::if_blocked(|control| control.request_enqueue(RetryPolicy::Forever))
//!      └─► admission::blocked uses the policy on each dequeue notification:
//!           - Once    → forced admission, success
//!           - Forever → bounded admission, success or failure + rejoin
//! ```

mod retry;

pub use retry::RetryPolicy;
