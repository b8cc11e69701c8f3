//! # Event subscribers for tasklane queues.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out and the built-in [`LogWriter`] (feature `logging`).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Runner / Admission / Handles ── publish(Event) ──► Bus ──► listener
//!                                                                 │
//!                                                                 ▼
//!                                                           SubscriberSet
//!                                                      ┌──────────┼──────────┐
//!                                                      ▼          ▼          ▼
//!                                                  LogWriter   Metrics    Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use tasklane::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct Rejections;
//!
//! #[async_trait]
//! impl Subscribe for Rejections {
//!     async fn on_event(&self, event: &Event) {
//!         if matches!(event.kind, EventKind::AdmissionRejected) {
//!             // increment a counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "rejections" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
