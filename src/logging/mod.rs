// Non-blocking asynchronous logging core
//
// Producers format straight into slots of a pre-allocated ring arena and
// queue (slot, length) pairs; one drain thread per Log writes them out.
//
// Building blocks, leaf first:
// - rwlock: writer-priority spin lock guarding the queue and prefix table
// - semaphore: wakes the drain worker, zero-timeout poll for batch-drain
// - arena: fixed-size slots handed out by a single atomic increment
// - prefix: append-only label table referenced by handle

pub mod arena;
mod category;
mod drain;
mod error;
pub mod format;
mod logger;
#[macro_use]
mod macros;
mod output;
mod prefix;
pub mod rwlock;
pub mod semaphore;

// Public exports
pub use arena::{RingArena, Slot};
pub use category::Category;
pub use drain::{DrainSnapshot, WriteOutcome};
pub use error::{ConfigError, LogError};
pub use format::format_os_error;
pub use logger::{ArenaKind, Log};
pub use output::LogOutput;
pub use prefix::{PrefixHandle, PrefixLabel, PrefixRegistry, PREFIX_CAPACITY};
pub use rwlock::{PriorityRwLock, RawPriorityLock, TryWriteError};
pub use semaphore::Semaphore;
