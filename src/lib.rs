//! # tasklane
//!
//! **Tasklane** is an in-process sequential task runner for Rust.
//!
//! Work items are admitted into a FIFO queue and executed strictly one at a
//! time: the next item starts only after the current one calls
//! [`Signal::done`]. On top of the plain runner the crate provides bounded
//! admission, a side buffer that refills the queue as it drains, and a
//! blocked-admission protocol in which producers negotiate a retry policy.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   TaskQueue      BoundedQueue     BufferedQueue     BlockingQueue
//!  (unbounded)      (rejects)      (side buffer)    (blocked handles)
//!       └───────────────┴───────┬───────┴──────────────────┘
//!                               ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Shared core                                                      │
//! │  - TaskList (FIFO of admitted work)                               │
//! │  - capacity + overflow layer (Reject / SideBuffer / Blocked)      │
//! │  - runner state (running, idle, in-flight task)                   │
//! └──────┬──────────────────────────────┬─────────────────────────────┘
//!        │ defer(continuation)          │ publish(Event)
//!        ▼                              ▼
//! ┌──────────────────────┐   ┌───────────────────────────────────────┐
//! │  Scheduler driver    │   │  Bus (broadcast channel)              │
//! │  one job at a time   │   │  (capacity: QueueConfig::bus_capacity)│
//! └──────────────────────┘   └──────────────────┬────────────────────┘
//!                                               ▼
//!                                         SubscriberSet
//!                                     ┌─────────┼─────────┐
//!                                     ▼         ▼         ▼
//!                                  worker1   worker2   workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! enqueue(work) ──► admitted (or rejected / buffered / blocked handle)
//!
//! run() ──► loop {
//!   ├─► dequeue head ─► overflow layer: promote one / notify one handle
//!   ├─► publish TaskStarting, call work(signal)
//!   ├─► signal.done() ─► publish TaskDone
//!   └─► queue empty ─► idle until the next admission
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                            |
//! |-------------------|---------------------------------------------------------------|-----------------------------------------------|
//! | **Runners**       | Sequential FIFO execution with start/stop.                    | [`TaskQueue`], [`Signal`]                     |
//! | **Admission**     | Bounded, side-buffered and blocked admission.                 | [`BoundedQueue`], [`BufferedQueue`], [`BlockingQueue`], [`Admission`] |
//! | **Blocked retry** | Per-producer negotiation with ONCE/FOREVER policies.          | [`BlockedHandle`], [`BlockedControl`], [`RetryPolicy`] |
//! | **Subscriber API**| Hook into queue and handle events (logging, metrics, custom). | [`Subscribe`], [`Event`]                      |
//! | **Errors**        | Typed construction errors.                                    | [`QueueError`]                                |
//! | **Configuration** | Capacity and bus sizing, builder with subscribers.            | [`QueueConfig`], [`QueueBuilder`]             |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use tasklane::{BlockingQueue, RetryPolicy, Signal};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = BlockingQueue::new(1)?;
//!
//!     queue.enqueue(|signal: Signal| {
//!         println!("first");
//!         signal.done();
//!     });
//!
//!     // Queue is full: the producer gets a handle and chooses a policy.
//!     queue
//!         .enqueue_blocked(|signal: Signal| {
//!             println!("second");
//!             signal.done();
//!         })
//!         .if_blocked(|control| control.request_enqueue(RetryPolicy::Forever))
//!         .on_enqueue_succeeded(|| println!("second admitted"));
//!
//!     queue.run();
//!     queue.flush().await;
//!     Ok(())
//! }
//! ```
mod admission;
mod config;
mod core;
mod error;
mod events;
mod policies;
mod queues;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use admission::{Admission, BlockedControl, BlockedHandle, HandleId, HandleStatus};
pub use config::QueueConfig;
pub use core::QueueBuilder;
pub use error::QueueError;
pub use events::{Event, EventKind};
pub use policies::RetryPolicy;
pub use queues::{BlockingQueue, BoundedQueue, BufferedQueue, TaskQueue};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Signal, TaskId, TaskNode, Work};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
