// SPDX-License-Identifier: Apache-2.0 OR MIT
// Counting semaphore used to wake the drain worker

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Counting semaphore with blocking and timed acquisition
///
/// The count never goes below zero. A poisoned mutex is recovered rather
/// than propagated: the count is a plain integer and stays consistent even
/// if a holder panicked.
#[derive(Debug, Default)]
pub struct Semaphore {
    count: Mutex<u64>,
    available: Condvar,
}

impl Semaphore {
    pub fn new(count: u64) -> Self {
        Self {
            count: Mutex::new(count),
            available: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add one permit and wake one waiter
    pub fn release(&self) {
        let mut count = self.lock();
        *count += 1;
        self.available.notify_one();
    }

    /// Take one permit, blocking until one is available
    pub fn issue(&self) {
        let count = self.lock();
        let mut count = self
            .available
            .wait_while(count, |count| *count == 0)
            .unwrap_or_else(PoisonError::into_inner);
        *count -= 1;
    }

    /// Take one permit, waiting at most `timeout`
    ///
    /// A zero timeout polls without blocking. Returns `false` if no permit
    /// became available in time.
    pub fn try_issue(&self, timeout: Duration) -> bool {
        let count = self.lock();
        let (mut count, _) = self
            .available
            .wait_timeout_while(count, timeout, |count| *count == 0)
            .unwrap_or_else(PoisonError::into_inner);

        if *count > 0 {
            *count -= 1;
            true
        } else {
            false
        }
    }

    /// Current count (racy snapshot, informational only)
    pub fn get(&self) -> u64 {
        *self.lock()
    }

    /// Drop all outstanding permits
    pub fn clear(&self) {
        *self.lock() = 0;
    }
}
