// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Logger configuration and parsing.
//!
//! JSON5 configuration format, every field optional:
//!
//! ```json5
//! {
//!     // verbose(level) lines are emitted when verbosity >= level
//!     verbosity: 2,
//!     short_len_level: 9,    // 512-byte slots
//!     short_count_level: 12, // 4096 of them
//!     long_len_level: 13,    // 8 KiB slots for large dumps
//!     long_count_level: 8,
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::logging::arena::check_levels;
use crate::logging::format::MIN_LINE_LEN;
use crate::logging::ConfigError;

pub const DEFAULT_SHORT_LEN_LEVEL: u32 = 9;
pub const DEFAULT_SHORT_COUNT_LEVEL: u32 = 12;
pub const DEFAULT_LONG_LEN_LEVEL: u32 = 13;
pub const DEFAULT_LONG_COUNT_LEVEL: u32 = 8;

/// Construction parameters for a [`Log`](crate::logging::Log)
///
/// Arena sizes are power-of-two exponents: a level of 9 means 512.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Threshold for verbose lines
    pub verbosity: i32,

    /// Short arena: ordinary messages
    pub short_len_level: u32,
    pub short_count_level: u32,

    /// Long arena: large dumps, fewer slots
    pub long_len_level: u32,
    pub long_count_level: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            short_len_level: DEFAULT_SHORT_LEN_LEVEL,
            short_count_level: DEFAULT_SHORT_COUNT_LEVEL,
            long_len_level: DEFAULT_LONG_LEN_LEVEL,
            long_count_level: DEFAULT_LONG_COUNT_LEVEL,
        }
    }
}

impl LogConfig {
    /// Load configuration from a JSON5 file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            json5::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration (JSON is valid JSON5)
    pub fn to_json5(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn with_verbosity(mut self, verbosity: i32) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Check both arenas fit the allocator limits and can hold a line header
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_arena(
            ("short_len_level", self.short_len_level),
            ("short_count_level", self.short_count_level),
        )?;
        validate_arena(
            ("long_len_level", self.long_len_level),
            ("long_count_level", self.long_count_level),
        )
    }

    pub fn short_slot_len(&self) -> usize {
        1 << self.short_len_level
    }

    pub fn long_slot_len(&self) -> usize {
        1 << self.long_len_level
    }
}

fn validate_arena(
    (len_field, len_level): (&'static str, u32),
    (count_field, count_level): (&'static str, u32),
) -> Result<(), ConfigError> {
    check_levels((len_field, len_level), (count_field, count_level))?;

    let len = 1usize << len_level;
    if len < MIN_LINE_LEN {
        return Err(ConfigError::SlotTooSmall {
            field: len_field,
            len,
            header: MIN_LINE_LEN,
        });
    }
    Ok(())
}
