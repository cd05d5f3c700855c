// SPDX-License-Identifier: Apache-2.0 OR MIT
// Log facade: format into an arena slot, enqueue, wake the drain worker

use super::arena::RingArena;
use super::category::Category;
use super::drain::{self, DrainSnapshot, DrainStats};
use super::error::LogError;
use super::format::{current_thread_id, format_into, WallStamp};
use super::output::LogOutput;
use super::prefix::{PrefixHandle, PrefixLabel, PrefixRegistry};
use super::rwlock::PriorityRwLock;
use super::semaphore::Semaphore;
use crate::config::LogConfig;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Which arena a line is formatted into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaKind {
    /// Many small slots for ordinary messages
    Short,
    /// Few large slots for dumps
    Long,
}

/// Queue entry: where the formatted line lives and how long it is
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pending {
    pub(crate) arena: ArenaKind,
    pub(crate) index: usize,
    pub(crate) len: usize,
}

/// State shared between producers and the drain worker
pub(crate) struct Shared {
    pub(crate) output: PriorityRwLock<LogOutput>,
    pub(crate) short: RingArena,
    pub(crate) long: RingArena,
    pub(crate) pending: PriorityRwLock<VecDeque<Pending>>,
    pub(crate) signal: Semaphore,
    pub(crate) stats: DrainStats,
    stopping: AtomicBool,
}

impl Shared {
    #[inline]
    pub(crate) fn arena(&self, kind: ArenaKind) -> &RingArena {
        match kind {
            ArenaKind::Short => &self.short,
            ArenaKind::Long => &self.long,
        }
    }

    pub(crate) fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }
}

/// Non-blocking asynchronous logger
///
/// Every call formats its line straight into a pre-allocated slot, queues
/// it and returns; a dedicated `log-drain` thread does the `write(2)`s.
/// Calls never fail and never report errors to the caller.
///
/// Construct one per process and share it (`Arc<Log>` or `&'static`).
/// Dropping the log, or calling [`Log::shutdown`], drains what is queued and
/// joins the worker.
pub struct Log {
    shared: Arc<Shared>,
    verbosity: AtomicI32,
    prefixes: PrefixRegistry,
    start: WallStamp,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Log {
    /// Build a logger and start its drain worker
    ///
    /// The first line queued is `Logger initialized at <local time>(<epoch>)`.
    pub fn new(config: LogConfig, output: LogOutput) -> Result<Self, LogError> {
        config.validate()?;

        let short = RingArena::new(config.short_len_level, config.short_count_level)?;
        let long = RingArena::new(config.long_len_level, config.long_count_level)?;
        // Room for every slot so the common path never reallocates
        let pending = VecDeque::with_capacity(short.slot_count() + long.slot_count());

        let shared = Arc::new(Shared {
            output: PriorityRwLock::new(output),
            short,
            long,
            pending: PriorityRwLock::new(pending),
            signal: Semaphore::new(0),
            stats: DrainStats::default(),
            stopping: AtomicBool::new(false),
        });

        let log = Self {
            shared: Arc::clone(&shared),
            verbosity: AtomicI32::new(config.verbosity),
            prefixes: PrefixRegistry::new(),
            start: WallStamp::now(),
            worker: Mutex::new(None),
        };

        log.message(format_args!(
            "Logger initialized at {}({:.6})",
            chrono::Local::now().format("%z %Y-%m-%d %H:%M:%S"),
            log.start.as_secs_f64()
        ));

        let handle = thread::Builder::new()
            .name("log-drain".to_string())
            .spawn(move || drain::run(shared))
            .map_err(LogError::Spawn)?;
        *log.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        Ok(log)
    }

    /// Logger with default arenas writing to stderr
    pub fn stderr(verbosity: i32) -> Result<Self, LogError> {
        Self::new(LogConfig::default().with_verbosity(verbosity), LogOutput::Stderr)
    }

    fn emit(&self, kind: ArenaKind, label: &str, args: fmt::Arguments<'_>) {
        if self.shared.is_stopping() {
            return;
        }

        let mut slot = self.shared.arena(kind).get();
        let index = slot.index();
        let elapsed = WallStamp::now().seconds_since(&self.start);

        // If the arena wraps back to this slot before it drains, the line
        // comes out with mixed bytes. Slot access is atomic, so no UB.
        let len = format_into(&mut slot, label, current_thread_id(), elapsed, args);

        {
            let mut pending = self.shared.pending.write();
            // Checked again under the lock: once the worker has seen the
            // stop flag, nothing may be queued behind its final drain
            if self.shared.is_stopping() {
                return;
            }
            pending.push_back(Pending {
                arena: kind,
                index,
                len,
            });
        }
        self.shared.signal.release();
    }

    #[inline]
    fn enabled(&self, level: i32) -> bool {
        self.verbosity.load(Ordering::Relaxed) >= level
    }

    /// Queue a line with an explicit category and arena
    #[inline]
    pub fn log(&self, kind: ArenaKind, category: Category, args: fmt::Arguments<'_>) {
        self.emit(kind, category.label(), args);
    }

    #[inline]
    pub fn message(&self, args: fmt::Arguments<'_>) {
        self.emit(ArenaKind::Short, Category::Message.label(), args);
    }

    #[inline]
    pub fn long_message(&self, args: fmt::Arguments<'_>) {
        self.emit(ArenaKind::Long, Category::Message.label(), args);
    }

    #[inline]
    pub fn warning(&self, args: fmt::Arguments<'_>) {
        self.emit(ArenaKind::Short, Category::Warning.label(), args);
    }

    #[inline]
    pub fn long_warning(&self, args: fmt::Arguments<'_>) {
        self.emit(ArenaKind::Long, Category::Warning.label(), args);
    }

    #[inline]
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(ArenaKind::Short, Category::Error.label(), args);
    }

    #[inline]
    pub fn long_error(&self, args: fmt::Arguments<'_>) {
        self.emit(ArenaKind::Long, Category::Error.label(), args);
    }

    /// Queue a verbose line if the threshold is at least `level`
    ///
    /// When suppressed nothing is formatted, allocated or queued.
    #[inline]
    pub fn verbose(&self, level: i32, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.emit(ArenaKind::Short, Category::Verbose.label(), args);
        }
    }

    #[inline]
    pub fn long_verbose(&self, level: i32, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.emit(ArenaKind::Long, Category::Verbose.label(), args);
        }
    }

    /// Queue a line labelled with a registered prefix
    ///
    /// # Panics
    /// Panics if `prefix` was not returned by this log's `add_prefix`.
    pub fn short_log(&self, prefix: PrefixHandle, args: fmt::Arguments<'_>) {
        let label = self.prefixes.get_prefix(prefix);
        self.emit(ArenaKind::Short, label.as_str(), args);
    }

    /// Long-arena form of [`Log::short_log`]
    pub fn long_log(&self, prefix: PrefixHandle, args: fmt::Arguments<'_>) {
        let label = self.prefixes.get_prefix(prefix);
        self.emit(ArenaKind::Long, label.as_str(), args);
    }

    pub fn add_prefix(&self, text: &str) -> PrefixHandle {
        self.prefixes.add_prefix(text)
    }

    pub fn get_prefix(&self, prefix: PrefixHandle) -> PrefixLabel {
        self.prefixes.get_prefix(prefix)
    }

    pub fn verbosity(&self) -> i32 {
        self.verbosity.load(Ordering::Relaxed)
    }

    pub fn set_verbosity(&self, verbosity: i32) {
        self.verbosity.store(verbosity, Ordering::Relaxed);
    }

    /// Redirect output; returns the previous descriptor
    ///
    /// Lines already queued go to whichever output is bound when the worker
    /// reaches them. A line the worker is retrying against a full
    /// non-blocking descriptor continues on the new output from where it
    /// stopped.
    pub fn rebind(&self, output: LogOutput) -> LogOutput {
        std::mem::replace(&mut *self.shared.output.write(), output)
    }

    /// Allocations made so far from one arena
    pub fn arena_sequence(&self, kind: ArenaKind) -> u64 {
        self.shared.arena(kind).sequence()
    }

    /// Lines queued but not yet picked up by the worker
    pub fn pending_len(&self) -> usize {
        self.shared.pending.read().len()
    }

    pub fn stats(&self) -> DrainSnapshot {
        self.shared.stats.snapshot()
    }

    /// Drain everything queued so far, stop the worker and join it
    ///
    /// Idempotent. Lines logged afterwards are dropped.
    pub fn shutdown(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            self.shared.stopping.store(true, Ordering::SeqCst);
            self.shared.signal.release();
            let _ = handle.join();
        }
    }
}

impl Drop for Log {
    fn drop(&mut self) {
        self.shutdown();
    }
}
