// SPDX-License-Identifier: Apache-2.0 OR MIT
// Error types for logger construction

use std::path::PathBuf;
use thiserror::Error;

/// Invalid logger configuration, rejected at construction time
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} = {value} is out of range (maximum {max})")]
    LevelOutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("arena of 2^{len_level} x 2^{count_level} bytes exceeds 2^{max} bytes")]
    ArenaTooLarge {
        len_level: u32,
        count_level: u32,
        max: u32,
    },

    #[error("{field} = {value} is not a power of two")]
    NotPowerOfTwo { field: &'static str, value: usize },

    #[error("{field}: slot length {len} cannot hold the {header}-byte line header")]
    SlotTooSmall {
        field: &'static str,
        len: usize,
        header: usize,
    },

    #[error("cannot read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(String),
}

/// Failure to construct a [`Log`](super::Log)
#[derive(Error, Debug)]
pub enum LogError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to spawn the drain worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}
