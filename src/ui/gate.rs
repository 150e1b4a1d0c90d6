//! Counts in-flight background loads so the loading scene knows when it is
//! allowed to slide away.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct LoadGate {
    pending: Arc<AtomicUsize>,
}

impl LoadGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit of background work. The gate stays busy until the
    /// returned token is completed or dropped.
    pub fn begin(&self) -> LoadToken {
        self.pending.fetch_add(1, Ordering::SeqCst);
        LoadToken {
            pending: self.pending.clone(),
            done: false,
        }
    }

    pub fn idle(&self) -> bool {
        self.pending.load(Ordering::SeqCst) == 0
    }

    pub fn in_flight(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

pub struct LoadToken {
    pending: Arc<AtomicUsize>,
    done: bool,
}

impl LoadToken {
    pub fn complete(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if !self.done {
            self.done = true;
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for LoadToken {
    fn drop(&mut self) {
        self.finish();
    }
}
