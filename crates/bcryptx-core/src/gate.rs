//! Concurrency gate for hash generation
//!
//! A counting semaphore: [`Gate::acquire`] blocks until one of `limit` slots
//! is free and returns a [`Permit`] that gives the slot back when dropped.
//! There is no timeout and no fairness between waiters.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

pub struct Gate {
    limit: usize,
    in_use: Mutex<usize>,
    freed: Condvar,
}

impl Gate {
    /// Create a gate with `limit` slots (at least one)
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            in_use: Mutex::new(0),
            freed: Condvar::new(),
        }
    }

    /// Block until a slot is free and take it
    pub fn acquire(&self) -> Permit<'_> {
        let in_use = self.lock();
        if *in_use >= self.limit {
            tracing::trace!(limit = self.limit, "Waiting for hash generation slot");
        }

        let mut in_use = self
            .freed
            .wait_while(in_use, |in_use| *in_use >= self.limit)
            .unwrap_or_else(PoisonError::into_inner);
        *in_use += 1;

        Permit { gate: self }
    }

    /// Number of free slots right now
    pub fn available(&self) -> usize {
        self.limit - *self.lock()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.in_use.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        let mut in_use = self.lock();
        *in_use -= 1;
        drop(in_use);
        self.freed.notify_one();
    }
}

/// One occupied gate slot, released on drop
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct Permit<'a> {
    gate: &'a Gate,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
