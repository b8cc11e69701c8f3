//! Queue core: shared state, drain loop and scheduling.
//!
//! The only public API from this module is [`QueueBuilder`]; the facades in
//! `queues` wrap the shared core it builds.
//!
//! Internal modules:
//! - [`scheduler`]: single-consumer continuation driver ("next scheduling opportunity");
//! - [`shared`]: queue state, bounded admission and removal hooks;
//! - [`runner`]: the sequential drain loop (`run`, `stop`, signal completion);
//! - [`builder`]: assembles bus, subscribers, scheduler and overflow layer.

mod builder;
mod runner;
mod scheduler;
mod shared;

pub use builder::QueueBuilder;
pub(crate) use shared::Shared;
