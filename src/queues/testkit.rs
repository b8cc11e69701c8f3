//! Helpers shared by the facade tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::tasks::Signal;

/// Ordered log of labels written by work items.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn push(&self, label: impl Into<String>) {
        self.0.lock().unwrap().push(label.into());
    }

    pub fn take(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Work that records `label` and signals immediately.
    pub fn work(&self, label: impl Into<String>) -> impl FnOnce(Signal) + Send + 'static {
        let trace = self.clone();
        let label = label.into();
        move |signal: Signal| {
            trace.push(label);
            signal.done();
        }
    }
}

/// Shared call counter for callbacks.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    /// Callback that bumps the counter.
    pub fn callback(&self) -> impl FnMut() + Send + 'static {
        let c = self.clone();
        move || c.bump()
    }
}

pub fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
