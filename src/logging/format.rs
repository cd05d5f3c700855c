// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Line formatting into fixed-capacity slots
//!
//! A line is `[label]{tid}(elapsed): text\n` with the label right-aligned to
//! 9 columns, the thread id to 5 and the elapsed seconds to 14 with 6
//! decimals. Formatting writes straight into the slot and never allocates;
//! whatever does not fit is dropped. The newline always survives.

use std::fmt::{self, Write};

/// Header length with a 9-byte label and in-range tid/elapsed values
pub const HEADER_LEN: usize = 36;

/// Smallest slot that holds a header and the newline
pub const MIN_LINE_LEN: usize = HEADER_LEN + 1;

/// Fixed-capacity byte destination for a formatted line
///
/// Implemented for plain byte slices and for arena slots.
pub trait LineBuf {
    fn capacity(&self) -> usize;

    /// Copy `bytes` to offset `at`; `at + bytes.len()` is within capacity
    fn put(&mut self, at: usize, bytes: &[u8]);
}

impl LineBuf for [u8] {
    fn capacity(&self) -> usize {
        self.len()
    }

    fn put(&mut self, at: usize, bytes: &[u8]) {
        self[at..at + bytes.len()].copy_from_slice(bytes);
    }
}

/// `fmt::Write` adapter that fills a [`LineBuf`] and truncates silently
pub struct SlotWriter<'a, B: LineBuf + ?Sized = [u8]> {
    buf: &'a mut B,
    limit: usize,
    pos: usize,
    truncated: bool,
}

impl<'a, B: LineBuf + ?Sized> SlotWriter<'a, B> {
    pub fn new(buf: &'a mut B) -> Self {
        let limit = buf.capacity();
        Self::with_limit(buf, limit)
    }

    /// Writer that stops after `limit` bytes (at most the capacity)
    pub fn with_limit(buf: &'a mut B, limit: usize) -> Self {
        let limit = limit.min(buf.capacity());
        Self {
            buf,
            limit,
            pos: 0,
            truncated: false,
        }
    }

    pub fn written(&self) -> usize {
        self.pos
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<B: LineBuf + ?Sized> Write for SlotWriter<'_, B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.limit - self.pos;
        let n = s.len().min(room);
        self.buf.put(self.pos, &s.as_bytes()[..n]);
        self.pos += n;

        if n < s.len() {
            // Stop the formatter early: nothing more will fit
            self.truncated = true;
            return Err(fmt::Error);
        }
        Ok(())
    }
}

/// Format one complete line into `buf`, returning the bytes used
///
/// The result is clamped to `buf.len()`. A truncated line may end in the
/// middle of a multi-byte character.
pub fn format_line(
    buf: &mut [u8],
    label: &str,
    tid: u32,
    elapsed: f64,
    args: fmt::Arguments<'_>,
) -> usize {
    format_into(buf, label, tid, elapsed, args)
}

/// [`format_line`] for any [`LineBuf`], such as an arena slot
pub fn format_into<B: LineBuf + ?Sized>(
    buf: &mut B,
    label: &str,
    tid: u32,
    elapsed: f64,
    args: fmt::Arguments<'_>,
) -> usize {
    let Some(body_len) = buf.capacity().checked_sub(1) else {
        return 0;
    };

    let mut writer = SlotWriter::with_limit(&mut *buf, body_len);
    // Errors here only mean "slot full"
    let _ = write!(writer, "[{:>9}]{{{:>5}}}({:>14.6}): ", label, tid, elapsed);
    if !writer.is_truncated() {
        let _ = writer.write_fmt(args);
    }

    let end = writer.written();
    buf.put(end, b"\n");
    end + 1
}

/// Seconds and nanoseconds of the coarse real-time clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallStamp {
    pub secs: i64,
    pub nanos: i64,
}

impl WallStamp {
    /// Sample the coarse real-time clock
    pub fn now() -> Self {
        #[cfg(target_os = "linux")]
        {
            use nix::time::{clock_gettime, ClockId};
            if let Ok(ts) = clock_gettime(ClockId::CLOCK_REALTIME_COARSE) {
                return Self {
                    secs: ts.tv_sec() as i64,
                    nanos: ts.tv_nsec() as i64,
                };
            }
        }

        let since_epoch = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            secs: since_epoch.as_secs() as i64,
            nanos: since_epoch.subsec_nanos() as i64,
        }
    }

    /// Fractional seconds since `earlier` (negative if the clock stepped back)
    pub fn seconds_since(&self, earlier: &WallStamp) -> f64 {
        (self.secs - earlier.secs) as f64 + (self.nanos - earlier.nanos) as f64 / 1_000_000_000.0
    }

    /// Fractional seconds since the Unix epoch
    pub fn as_secs_f64(&self) -> f64 {
        self.secs as f64 + self.nanos as f64 / 1_000_000_000.0
    }
}

/// OS thread id of the caller (truncated to u32)
pub fn current_thread_id() -> u32 {
    #[cfg(target_os = "linux")]
    {
        // SAFETY: gettid has no preconditions
        unsafe { libc::gettid() as u32 }
    }
    #[cfg(not(target_os = "linux"))]
    {
        // SAFETY: pthread_self has no preconditions
        unsafe { libc::pthread_self() as usize as u32 }
    }
}

/// Render an OS error as `"<errno> <description>"`
pub fn format_os_error(err: &std::io::Error) -> String {
    match err.raw_os_error() {
        Some(code) => format!("{} {}", code, nix::errno::Errno::from_raw(code).desc()),
        None => err.to_string(),
    }
}
