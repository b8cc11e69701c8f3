//! Queue events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the runner, the admission layers
//! and the subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the runner (start/stop/idle, task lifecycle), the
//!   admission layers (admit/reject/buffer/promote), blocked handles
//!   (notify/admit/retry/abandon) and the scheduler (callback panics).
//! - **Consumers**: the subscriber listener spawned by
//!   [`QueueBuilder`](crate::QueueBuilder), which fans out to a
//!   [`SubscriberSet`](crate::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
