// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Drain worker: the single consumer of the pending queue
//!
//! The worker blocks on the semaphore, then pops and writes entries until a
//! zero-timeout poll of the semaphore finds no further permit (batch-drain),
//! then blocks again. Write failures never leave this module: transient
//! errors are retried on the spot, anything else abandons the rest of the
//! current line and the loop moves on.

use super::logger::{ArenaKind, Shared};
use super::output::LogOutput;
use super::rwlock::PriorityRwLock;
use nix::errno::Errno;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Result of pushing one line to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// All bytes written
    Written(usize),
    /// Gave up after `written` bytes
    Abandoned { written: usize },
}

/// Drain counters, updated by the worker only
#[derive(Debug, Default)]
pub struct DrainStats {
    written: AtomicU64,
    abandoned: AtomicU64,
    bytes: AtomicU64,
}

impl DrainStats {
    fn record(&self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written(n) => {
                self.written.fetch_add(1, Ordering::Relaxed);
                self.bytes.fetch_add(n as u64, Ordering::Relaxed);
            }
            WriteOutcome::Abandoned { written } => {
                self.abandoned.fetch_add(1, Ordering::Relaxed);
                self.bytes.fetch_add(written as u64, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> DrainSnapshot {
        DrainSnapshot {
            written: self.written.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`DrainStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainSnapshot {
    /// Lines written completely
    pub written: u64,
    /// Lines abandoned after a terminal write error
    pub abandoned: u64,
    /// Bytes that reached the output
    pub bytes: u64,
}

/// Write `buf` completely, retrying interrupted and would-block writes
///
/// The output lock is taken per attempt, so a `rebind` waiting on a full
/// descriptor gets in and the rest of the line goes to the new output.
/// Zero progress or any other error abandons the remainder.
pub(crate) fn write_entry(output: &PriorityRwLock<LogOutput>, buf: &[u8]) -> WriteOutcome {
    let mut remaining = buf;

    while !remaining.is_empty() {
        let result = output.read().write(remaining);
        match result {
            Ok(0) => break,
            Ok(n) => remaining = &remaining[n..],
            // EWOULDBLOCK aliases EAGAIN
            Err(Errno::EINTR) | Err(Errno::EAGAIN) => continue,
            Err(_) => break,
        }
    }

    if remaining.is_empty() {
        WriteOutcome::Written(buf.len())
    } else {
        WriteOutcome::Abandoned {
            written: buf.len() - remaining.len(),
        }
    }
}

/// Pop and write one entry; `false` if the queue was empty
///
/// The slot is copied into `line` first. A producer that has wrapped round
/// to the same slot may change bytes during the copy; the line then comes
/// out mixed but never longer than its slot.
fn drain_one(shared: &Shared, line: &mut Vec<u8>) -> bool {
    let Some(entry) = shared.pending.write().pop_front() else {
        return false;
    };

    shared
        .arena(entry.arena)
        .read_into(entry.index, entry.len, line);
    shared.stats.record(write_entry(&shared.output, line));
    true
}

/// Worker thread body
pub(crate) fn run(shared: Arc<Shared>) {
    let slot_len = shared
        .arena(ArenaKind::Short)
        .slot_len()
        .max(shared.arena(ArenaKind::Long).slot_len());
    let mut line = Vec::with_capacity(slot_len);

    loop {
        shared.signal.issue();

        loop {
            drain_one(&shared, &mut line);
            if !shared.signal.try_issue(Duration::ZERO) {
                break;
            }
        }

        if shared.is_stopping() {
            // Entries whose permit was consumed by the stop signal
            while drain_one(&shared, &mut line) {}
            return;
        }
    }
}
