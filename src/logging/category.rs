// SPDX-License-Identifier: Apache-2.0 OR MIT
// Built-in line categories

use serde::{Deserialize, Serialize};

/// Category of a log line, rendered as the bracketed label
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Normal progress (handshake done, packet received)
    Message = 0,
    /// Unexpected but recoverable (packet from unknown sender)
    Warning = 1,
    /// Failure of an operation (socket broken, bad argument)
    Error = 2,
    /// Diagnostic detail, gated by the verbosity threshold
    Verbose = 3,
}

impl Category {
    /// Label text as it appears between the brackets
    pub const fn label(self) -> &'static str {
        match self {
            Category::Message => " Message ",
            Category::Warning => " Warning ",
            Category::Error => "  Error  ",
            Category::Verbose => " Verbose ",
        }
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Category::Message),
            1 => Some(Category::Warning),
            2 => Some(Category::Error),
            3 => Some(Category::Verbose),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label().trim())
    }
}
