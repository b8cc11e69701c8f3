//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [runner-started]
//! [admitted] task=task#3 size=2
//! [blocked] handle=handle#11
//! [starting] task=task#3
//! [done] task=task#3
//! [notified] handle=handle#11
//! [retry-failed] handle=handle#11 attempt=1
//! [handle-admitted] handle=handle#11 task=task#12 policy=forever attempt=2
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn id<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::RunnerStarted => println!("[runner-started]"),
            EventKind::RunnerStopped => println!("[runner-stopped]"),
            EventKind::RunnerIdle => println!("[runner-idle]"),
            EventKind::TaskAdmitted => {
                println!("[admitted] task={} size={:?}", id(e.task), e.size);
            }
            EventKind::TaskBuffered => println!("[buffered] buffer={:?}", e.size),
            EventKind::TaskPromoted => {
                println!("[promoted] task={} size={:?}", id(e.task), e.size);
            }
            EventKind::AdmissionRejected => println!("[rejected]"),
            EventKind::TaskDequeued => {
                println!("[dequeued] task={} size={:?}", id(e.task), e.size);
            }
            EventKind::TaskStarting => println!("[starting] task={}", id(e.task)),
            EventKind::TaskDone => println!("[done] task={}", id(e.task)),
            EventKind::SignalDropped => {
                println!("[signal-dropped] task={} runner stalled", id(e.task));
            }
            EventKind::HandleBlocked => println!("[blocked] handle={}", id(e.handle)),
            EventKind::HandleNotified => println!("[notified] handle={}", id(e.handle)),
            EventKind::HandleAdmitted => {
                println!(
                    "[handle-admitted] handle={} task={} policy={} attempt={:?}",
                    id(e.handle),
                    id(e.task),
                    e.policy.map_or("-", |p| p.as_label()),
                    e.attempt
                );
            }
            EventKind::HandleRetryFailed => {
                println!(
                    "[retry-failed] handle={} attempt={:?}",
                    id(e.handle),
                    e.attempt
                );
            }
            EventKind::HandleAbandoned => {
                println!(
                    "[abandoned] handle={} reason={}",
                    id(e.handle),
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::CallbackPanicked => {
                println!(
                    "[callback-panicked] info={}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] {}", e.reason.as_deref().unwrap_or(""));
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] {}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
