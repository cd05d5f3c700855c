// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Fixed-size ring allocator for log line buffers
//!
//! The arena is one contiguous allocation of `count` slots of `len` bytes,
//! both powers of two. `get()` is a single atomic increment of a global
//! sequence number; the slot index is `sequence & (count - 1)`.
//!
//! There is no ownership tracking. The `count` most recent allocations are
//! distinct slots, the next one reuses the oldest. A slot still waiting to
//! be drained when its turn comes round again is silently overwritten.
//! Size the arena for `producers x drain latency` to keep that from
//! happening; it is not detected.
//!
//! Slot bytes are `AtomicU8` and every access is a relaxed load or store, so
//! an overwrite racing a drain yields a line with mixed bytes, never a data
//! race. No reference to plain `u8` slot memory is ever handed out.

use super::error::ConfigError;
use super::format::LineBuf;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Largest permitted slot length exponent (1 MiB slots)
pub const MAX_LEN_LEVEL: u32 = 20;
/// Largest permitted slot count exponent
pub const MAX_COUNT_LEVEL: u32 = 20;
/// Largest permitted total arena size exponent (1 GiB)
pub const MAX_ARENA_LEVEL: u32 = 30;

/// Cache-aligned wrapper to prevent false sharing
#[repr(align(64))]
struct CacheAligned<T>(T);

pub struct RingArena {
    buf: Box<[AtomicU8]>,
    len: usize,
    count: usize,
    seq: CacheAligned<AtomicU64>,
}

/// Check a pair of size exponents against the allocator limits
///
/// `len_field` and `count_field` name the offending setting in the error.
pub fn check_levels(
    (len_field, len_level): (&'static str, u32),
    (count_field, count_level): (&'static str, u32),
) -> Result<(), ConfigError> {
    if len_level > MAX_LEN_LEVEL {
        return Err(ConfigError::LevelOutOfRange {
            field: len_field,
            value: len_level,
            max: MAX_LEN_LEVEL,
        });
    }
    if count_level > MAX_COUNT_LEVEL {
        return Err(ConfigError::LevelOutOfRange {
            field: count_field,
            value: count_level,
            max: MAX_COUNT_LEVEL,
        });
    }
    if len_level + count_level > MAX_ARENA_LEVEL {
        return Err(ConfigError::ArenaTooLarge {
            len_level,
            count_level,
            max: MAX_ARENA_LEVEL,
        });
    }
    Ok(())
}

impl RingArena {
    /// Create an arena of `2^count_level` slots of `2^len_level` bytes
    pub fn new(len_level: u32, count_level: u32) -> Result<Self, ConfigError> {
        check_levels(("len_level", len_level), ("count_level", count_level))?;
        Ok(Self::allocate(1 << len_level, 1 << count_level))
    }

    /// Create an arena from explicit sizes, which must be powers of two
    pub fn with_sizes(len: usize, count: usize) -> Result<Self, ConfigError> {
        if !len.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "len",
                value: len,
            });
        }
        if !count.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "count",
                value: count,
            });
        }
        Self::new(len.trailing_zeros(), count.trailing_zeros())
    }

    fn allocate(len: usize, count: usize) -> Self {
        let buf: Vec<AtomicU8> = (0..len * count).map(|_| AtomicU8::new(0)).collect();

        Self {
            buf: buf.into_boxed_slice(),
            len,
            count,
            seq: CacheAligned(AtomicU64::new(0)),
        }
    }

    /// Hand out the next slot (never blocks, never fails)
    #[inline]
    pub fn get(&self) -> Slot<'_> {
        let seq = self.seq.0.fetch_add(1, Ordering::Relaxed);
        let index = (seq & (self.count as u64 - 1)) as usize;
        Slot {
            bytes: self.slot(index),
            index,
        }
    }

    /// Slot length in bytes
    pub fn slot_len(&self) -> usize {
        self.len
    }

    /// Number of slots
    pub fn slot_count(&self) -> usize {
        self.count
    }

    /// Number of allocations handed out so far
    pub fn sequence(&self) -> u64 {
        self.seq.0.load(Ordering::Relaxed)
    }

    #[inline]
    fn slot(&self, index: usize) -> &[AtomicU8] {
        let start = index * self.len;
        &self.buf[start..start + self.len]
    }

    /// Copy the first `len` bytes of slot `index` into `out`, replacing its
    /// contents
    ///
    /// If the slot is being overwritten concurrently the copy may mix old
    /// and new bytes.
    ///
    /// # Panics
    /// Panics if `index` or `len` is out of range.
    pub fn read_into(&self, index: usize, len: usize, out: &mut Vec<u8>) {
        assert!(index < self.count && len <= self.len);
        out.clear();
        out.extend(
            self.slot(index)[..len]
                .iter()
                .map(|byte| byte.load(Ordering::Relaxed)),
        );
    }
}

/// One slot handed out by [`RingArena::get`]
pub struct Slot<'a> {
    bytes: &'a [AtomicU8],
    index: usize,
}

impl Slot<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Address of the first byte (identity only; never dereferenced)
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr().cast()
    }
}

impl LineBuf for Slot<'_> {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn put(&mut self, at: usize, bytes: &[u8]) {
        for (cell, &byte) in self.bytes[at..at + bytes.len()].iter().zip(bytes) {
            cell.store(byte, Ordering::Relaxed);
        }
    }
}
