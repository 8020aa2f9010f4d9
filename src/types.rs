use std::fmt;

use crate::num::format_pad9_u64;

/// Log serial number: a dense non-negative integer identifying an entry,
/// assigned in write order starting from 0.
///
/// Stored on disk as a 4-byte big-endian signed integer, hence `i32`.
pub type Lsn = i32;

/// Sentinel commit head value meaning "no entry has been committed yet".
pub const NO_COMMIT: Lsn = -1;

/// The byte range one entry occupies inside the log file.
///
/// Derived from two adjacent index slots: the entry's own offset and the
/// next slot, whose difference is the entry length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    offset: u64,
    size: u64,
}

impl Span {
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Offset of the first byte of the entry in the log file.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Length of the entry in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Offset one past the last byte of the entry.
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) Size({})",
            format_pad9_u64(self.offset),
            format_pad9_u64(self.end()),
            self.size
        )
    }
}
