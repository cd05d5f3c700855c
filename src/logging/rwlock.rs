// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Writer-priority reader/writer lock
//!
//! Readers share the lock unless a writer is pending or active. A writer
//! announces itself by bumping the pending-writer count, which keeps new
//! readers out, waits for the current readers to leave, then takes the
//! exclusive flag.
//!
//! All waits are busy-spins with exponential backoff (spin first, then
//! `yield_now`). There is no parking: a contended lock burns CPU in exchange
//! for wake-up latency in the tens of nanoseconds. Critical sections guarded
//! by this lock must stay short (a queue push/pop, a vector append).
//!
//! Taking the write lock while holding a read lock on the same lock
//! deadlocks.

use crossbeam_utils::Backoff;
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use thiserror::Error;

/// Why a non-blocking write acquisition failed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryWriteError {
    #[error("lock is held by one or more readers")]
    ReadersPresent,

    #[error("lock is held by another writer")]
    WriterActive,
}

/// Cache-aligned wrapper to keep the counters on separate lines
#[repr(align(64))]
struct CacheAligned<T>(T);

/// Raw writer-priority lock without associated data
pub struct RawPriorityLock {
    /// Readers currently inside (or tentatively entering)
    readers: CacheAligned<AtomicUsize>,
    /// Writers not yet finished: pending or active
    writers: CacheAligned<AtomicUsize>,
    /// Exclusive flag held by the single active writer
    write_active: AtomicBool,
}

impl RawPriorityLock {
    pub const fn new() -> Self {
        Self {
            readers: CacheAligned(AtomicUsize::new(0)),
            writers: CacheAligned(AtomicUsize::new(0)),
            write_active: AtomicBool::new(false),
        }
    }

    /// Acquire shared access, spinning while any writer is pending or active
    pub fn read_lock(&self) {
        let backoff = Backoff::new();
        loop {
            while self.writers.0.load(Ordering::SeqCst) != 0 {
                backoff.snooze();
            }

            self.readers.0.fetch_add(1, Ordering::SeqCst);
            if self.writers.0.load(Ordering::SeqCst) == 0 {
                return;
            }

            // A writer slipped in between our check and our bump: back off
            // completely so it can see the reader count drain.
            self.readers.0.fetch_sub(1, Ordering::SeqCst);
            backoff.snooze();
        }
    }

    /// Release shared access
    pub fn read_unlock(&self) {
        self.readers.0.fetch_sub(1, Ordering::SeqCst);
    }

    /// Try to acquire shared access without spinning
    ///
    /// Returns `false` if a writer is pending or active.
    pub fn try_read_lock(&self) -> bool {
        if self.writers.0.load(Ordering::SeqCst) != 0 {
            return false;
        }

        self.readers.0.fetch_add(1, Ordering::SeqCst);
        if self.writers.0.load(Ordering::SeqCst) != 0 {
            self.readers.0.fetch_sub(1, Ordering::SeqCst);
            return false;
        }
        true
    }

    /// Acquire exclusive access
    pub fn write_lock(&self) {
        // Announce first: from here on no new reader gets in.
        self.writers.0.fetch_add(1, Ordering::SeqCst);

        let backoff = Backoff::new();
        while self.readers.0.load(Ordering::SeqCst) != 0 {
            backoff.snooze();
        }

        backoff.reset();
        while self.write_active.swap(true, Ordering::Acquire) {
            backoff.snooze();
        }
    }

    /// Release exclusive access
    pub fn write_unlock(&self) {
        self.write_active.store(false, Ordering::Release);
        self.writers.0.fetch_sub(1, Ordering::SeqCst);
    }

    /// Try to acquire exclusive access without spinning
    pub fn try_write_lock(&self) -> Result<(), TryWriteError> {
        self.writers.0.fetch_add(1, Ordering::SeqCst);

        if self.readers.0.load(Ordering::SeqCst) != 0 {
            self.writers.0.fetch_sub(1, Ordering::SeqCst);
            return Err(TryWriteError::ReadersPresent);
        }
        if self.write_active.swap(true, Ordering::Acquire) {
            self.writers.0.fetch_sub(1, Ordering::SeqCst);
            return Err(TryWriteError::WriterActive);
        }
        Ok(())
    }

    /// Number of writers pending or active (snapshot)
    pub fn pending_writers(&self) -> usize {
        self.writers.0.load(Ordering::SeqCst)
    }

    /// Number of readers inside the lock (snapshot)
    pub fn active_readers(&self) -> usize {
        self.readers.0.load(Ordering::SeqCst)
    }
}

impl Default for RawPriorityLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer-priority lock protecting a value of type `T`
pub struct PriorityRwLock<T: ?Sized> {
    raw: RawPriorityLock,
    data: UnsafeCell<T>,
}

// SAFETY: access to `data` is serialized by `raw` exactly like std's RwLock:
// shared references only under the read lock, unique references only under
// the write lock.
unsafe impl<T: ?Sized + Send> Send for PriorityRwLock<T> {}
unsafe impl<T: ?Sized + Send + Sync> Sync for PriorityRwLock<T> {}

impl<T> PriorityRwLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            raw: RawPriorityLock::new(),
            data: UnsafeCell::new(value),
        }
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> PriorityRwLock<T> {
    pub fn read(&self) -> ReadGuard<'_, T> {
        self.raw.read_lock();
        ReadGuard { lock: self }
    }

    pub fn try_read(&self) -> Option<ReadGuard<'_, T>> {
        if self.raw.try_read_lock() {
            Some(ReadGuard { lock: self })
        } else {
            None
        }
    }

    pub fn write(&self) -> WriteGuard<'_, T> {
        self.raw.write_lock();
        WriteGuard { lock: self }
    }

    pub fn try_write(&self) -> Result<WriteGuard<'_, T>, TryWriteError> {
        self.raw.try_write_lock()?;
        Ok(WriteGuard { lock: self })
    }

    /// Mutable access without locking (exclusive borrow proves no sharing)
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// The underlying raw lock, for inspecting contention state
    pub fn raw(&self) -> &RawPriorityLock {
        &self.raw
    }
}

impl<T: Default> Default for PriorityRwLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Shared access guard; releases the read lock on drop
pub struct ReadGuard<'a, T: ?Sized> {
    lock: &'a PriorityRwLock<T>,
}

impl<T: ?Sized> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: read lock held for the lifetime of the guard
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.raw.read_unlock();
    }
}

/// Exclusive access guard; releases the write lock on drop
pub struct WriteGuard<'a, T: ?Sized> {
    lock: &'a PriorityRwLock<T>,
}

impl<T: ?Sized> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: write lock held for the lifetime of the guard
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: write lock held, no other guard can exist
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.raw.write_unlock();
    }
}
