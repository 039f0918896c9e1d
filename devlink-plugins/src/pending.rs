//! Bounded hand-off between a plugin and the embedding application.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Unclaimed items a plugin holds before it starts dropping the oldest.
pub const MAX_PENDING: usize = 64;

#[derive(Debug)]
pub(crate) struct Pending<T>(Mutex<VecDeque<T>>);

impl<T> Default for Pending<T> {
    fn default() -> Self {
        Self(Mutex::new(VecDeque::new()))
    }
}

impl<T> Pending<T> {
    /// Append `item`. Returns `true` when the oldest item was dropped to
    /// make room.
    pub(crate) fn push(&self, item: T) -> bool {
        let mut queue = self.lock();
        let full = queue.len() >= MAX_PENDING;
        if full {
            queue.pop_front();
        }
        queue.push_back(item);
        full
    }

    pub(crate) fn take(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
