// SPDX-License-Identifier: Apache-2.0 OR MIT
// Prefix registry: append-only table of line labels referenced by handle

use super::rwlock::PriorityRwLock;

/// Maximum label length in bytes; longer labels are truncated
pub const PREFIX_CAPACITY: usize = 32;

/// Handle to a registered prefix, valid for the lifetime of the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrefixHandle(usize);

impl PrefixHandle {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Fixed-capacity label, copied out of the registry by value
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PrefixLabel {
    len: u8,
    bytes: [u8; PREFIX_CAPACITY],
}

impl PrefixLabel {
    /// Build a label, truncating to `PREFIX_CAPACITY` bytes on a char boundary
    pub fn new(text: &str) -> Self {
        let mut end = text.len().min(PREFIX_CAPACITY);
        while !text.is_char_boundary(end) {
            end -= 1;
        }

        let mut bytes = [0; PREFIX_CAPACITY];
        bytes[..end].copy_from_slice(&text.as_bytes()[..end]);
        Self {
            len: end as u8,
            bytes,
        }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }
}

impl std::fmt::Debug for PrefixLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl std::fmt::Display for PrefixLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Delegate so width/alignment flags apply to the text
        std::fmt::Display::fmt(self.as_str(), f)
    }
}

/// Append-only prefix table guarded by a writer-priority lock
#[derive(Default)]
pub struct PrefixRegistry {
    prefixes: PriorityRwLock<Vec<PrefixLabel>>,
}

impl PrefixRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a label and return its handle
    pub fn add_prefix(&self, text: &str) -> PrefixHandle {
        let label = PrefixLabel::new(text);
        let mut prefixes = self.prefixes.write();
        prefixes.push(label);
        PrefixHandle(prefixes.len() - 1)
    }

    /// Look up a label by handle
    ///
    /// # Panics
    /// Panics if `handle` did not come from this registry.
    pub fn get_prefix(&self, handle: PrefixHandle) -> PrefixLabel {
        let prefixes = self.prefixes.read();
        match prefixes.get(handle.0) {
            Some(label) => *label,
            None => panic!(
                "prefix handle {} out of range ({} registered)",
                handle.0,
                prefixes.len()
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.prefixes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
