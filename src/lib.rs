//! Logging core of the UDP probing toolkit.
//!
//! The sender and receiver probes log through a [`logging::Log`]: every call
//! formats into a pre-allocated slot and returns, a single drain thread per
//! log does the writing.
//!
//! ```no_run
//! use udp_probe::config::LogConfig;
//! use udp_probe::logging::{Log, LogOutput};
//! use udp_probe::{log_message, log_verbose};
//!
//! let log = Log::new(LogConfig::default().with_verbosity(1), LogOutput::Stderr)?;
//! log_message!(log, "Received start instruction from {}", "10.0.0.2:9000");
//! log_verbose!(log, 1, "Packet {} received", 17);
//! # Ok::<(), udp_probe::logging::LogError>(())
//! ```

pub mod config;
#[macro_use]
pub mod logging;
