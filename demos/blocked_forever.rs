//! # Blocked Producers Example
//!
//! Eleven producers race for a [`BlockingQueue`] with room for ten. The
//! last one is blocked and asks to be retried FOREVER; it is admitted as
//! soon as the runner frees a slot, and every job runs in arrival order.
//!
//! Events are printed by the built-in `LogWriter`.
//!
//! ## Run
//! ```bash
//! cargo run --example blocked_forever --features logging
//! ```

use std::{sync::Arc, time::Duration};

use tasklane::{LogWriter, QueueBuilder, QueueConfig, RetryPolicy, Signal, Subscribe};
use tokio::sync::mpsc;

const CAPACITY: usize = 10;
const PRODUCERS: usize = CAPACITY + 1;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let queue = QueueBuilder::new(QueueConfig::with_capacity(CAPACITY))
        .with_subscribers(subs)
        .blocking()?;

    let (tx, mut rx) = mpsc::unbounded_channel();

    for i in 0..PRODUCERS {
        let finished = tx.clone();
        let handle = queue.enqueue_blocked(move |signal: Signal| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                let _ = finished.send(i);
                signal.done();
            });
        });

        let id = handle.id();
        handle
            .if_blocked(move |control| {
                println!("[producer {i}] {id} blocked, retrying forever");
                control.request_enqueue(RetryPolicy::Forever);
            })
            .on_enqueue_succeeded(move || println!("[producer {i}] {id} admitted"))
            .on_enqueue_failed(move || println!("[producer {i}] {id} still full"));
    }
    drop(tx);

    println!("pending handles before run: {}", queue.pending_handles());
    queue.run();

    let mut order = Vec::with_capacity(PRODUCERS);
    while let Some(i) = rx.recv().await {
        order.push(i);
        if order.len() == PRODUCERS {
            break;
        }
    }
    println!("executed in order: {order:?}");
    anyhow::ensure!(order == (0..PRODUCERS).collect::<Vec<_>>(), "out of order");

    queue.flush().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    queue.shutdown();
    Ok(())
}
