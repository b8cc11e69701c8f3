//! # Queue facades.
//!
//! Each facade wraps the same shared core and exposes only the surface its
//! overflow layer supports:
//!
//! | Facade            | `enqueue` when full          | Extra surface                        |
//! |-------------------|------------------------------|--------------------------------------|
//! | [`TaskQueue`]     | never full                   |                                      |
//! | [`BoundedQueue`]  | `Admission::Rejected(work)`  | `is_full`, `capacity`                |
//! | [`BufferedQueue`] | `Admission::Buffered`        | `is_full`, `capacity`, `buffered_len`|
//! | [`BlockingQueue`] | `Admission::Rejected(work)`  | `enqueue_blocked`, `pending_handles` |
//!
//! Facades are cheap to clone; clones share the queue.

/// Runner and inspection methods shared by every facade.
macro_rules! runner_surface {
    ($facade:ident) => {
        impl $facade {
            pub(crate) fn from_shared(shared: std::sync::Arc<$crate::core::Shared>) -> Self {
                Self { shared }
            }

            /// Detaches and returns the head task without running it.
            ///
            /// Counts as a removal: the overflow layer is refilled/notified.
            pub fn dequeue(&self) -> Option<$crate::tasks::TaskNode> {
                self.shared.dequeue()
            }

            /// Starts draining tasks one at a time. No-op if already running.
            pub fn run(&self) {
                self.shared.run();
            }

            /// Stops draining once the in-flight task signals. No-op if stopped.
            pub fn stop(&self) {
                self.shared.stop();
            }

            pub fn is_running(&self) -> bool {
                self.shared.is_running()
            }

            pub fn is_empty(&self) -> bool {
                self.shared.is_empty()
            }

            /// Number of admitted tasks waiting to start.
            pub fn size(&self) -> usize {
                self.shared.size()
            }

            /// Task currently in flight, if any.
            pub fn current_task(&self) -> Option<$crate::tasks::TaskId> {
                self.shared.current_task()
            }

            /// Work ever admitted or parked (promotions are not counted again).
            pub fn submitted(&self) -> u64 {
                self.shared.submitted()
            }

            /// Tasks ever removed from the queue.
            pub fn drained(&self) -> u64 {
                self.shared.drained()
            }

            /// Waits until every deferred continuation has run.
            ///
            /// Work that signals from a separately spawned task is not awaited.
            pub async fn flush(&self) {
                self.shared.scheduler.flush().await;
            }

            /// Stops the runner and the scheduler; pending continuations are dropped.
            pub fn shutdown(&self) {
                self.shared.shutdown();
            }

            /// Receiver for events published after this call.
            pub fn events(&self) -> tokio::sync::broadcast::Receiver<$crate::events::Event> {
                self.shared.bus.subscribe()
            }
        }
    };
}

pub(crate) use runner_surface;

mod blocking;
mod bounded;
mod buffered;
mod unbounded;

#[cfg(test)]
mod testkit;

pub use blocking::BlockingQueue;
pub use bounded::BoundedQueue;
pub use buffered::BufferedQueue;
pub use unbounded::TaskQueue;
