//! # Sequential Runner Example
//!
//! Runs asynchronous jobs strictly one after another on a [`BoundedQueue`]
//! and counts lifecycle events with a custom subscriber.
//!
//! Each job sleeps on a spawned tokio task and signals completion from there;
//! the runner only starts the next job once the previous one is done.
//!
//! ## Run
//! ```bash
//! cargo run --example sequential
//! ```

use std::{
    sync::Arc,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use tasklane::{Event, EventKind, QueueBuilder, QueueConfig, Signal, Subscribe};
use tokio::sync::mpsc;

#[derive(Default)]
struct Metrics {
    admitted: AtomicU64,
    rejected: AtomicU64,
    done: AtomicU64,
}

impl Metrics {
    fn print_stats(&self) {
        println!();
        println!("Metrics:");
        println!(" ├─► Admitted: {}", self.admitted.load(Ordering::Relaxed));
        println!(" ├─► Rejected: {}", self.rejected.load(Ordering::Relaxed));
        println!(" └─► Done:     {}", self.done.load(Ordering::Relaxed));
    }
}

#[async_trait::async_trait]
impl Subscribe for Metrics {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            EventKind::TaskAdmitted => {
                self.admitted.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::AdmissionRejected => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::TaskDone => {
                self.done.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "metrics"
    }
}

/// Job that sleeps `work_ms` off the runner and then signals.
fn job(
    name: &'static str,
    work_ms: u64,
    finished: mpsc::UnboundedSender<&'static str>,
) -> impl FnOnce(Signal) + Send + 'static {
    move |signal: Signal| {
        println!("[{name}] start (work {work_ms}ms)");
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(work_ms)).await;
            println!("[{name}] done");
            let _ = finished.send(name);
            signal.done();
        });
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let metrics = Arc::new(Metrics::default());
    let subs: Vec<Arc<dyn Subscribe>> = vec![metrics.clone()];
    let queue = QueueBuilder::new(QueueConfig::with_capacity(3))
        .with_subscribers(subs)
        .bounded()?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let jobs = [("fetch", 150), ("build", 300), ("test", 100), ("deploy", 50)];

    for (name, ms) in jobs {
        let admission = queue.enqueue(job(name, ms, tx.clone()));
        if admission.is_rejected() {
            println!("[{name}] rejected: queue full ({} waiting)", queue.size());
        }
    }

    queue.run();

    let mut order = Vec::new();
    while order.len() < 3 {
        match rx.recv().await {
            Some(name) => order.push(name),
            None => break,
        }
    }
    println!("completion order: {order:?}");

    queue.flush().await;
    // Let subscriber workers drain before stopping.
    tokio::time::sleep(Duration::from_millis(50)).await;
    queue.shutdown();
    metrics.print_stats();
    Ok(())
}
