use std::io;

use crate::types::Lsn;

/// Any failure a WAL operation can surface.
///
/// Three kinds are distinguishable: argument/state assertions
/// ([`EmptyPayload`], [`LsnOutOfRange`], [`TruncateCommitted`],
/// [`NotWritable`], [`InvalidIndexFile`]), the recoverable protocol error
/// ([`OutOfOrderCommit`]), and I/O errors propagated verbatim from the
/// underlying files.
#[derive(Debug)]
#[derive(thiserror::Error)]
pub enum WalError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    OutOfOrderCommit(#[from] OutOfOrderCommit),

    #[error(transparent)]
    TruncateCommitted(#[from] TruncateCommitted),

    #[error(transparent)]
    LsnOutOfRange(#[from] LsnOutOfRange),

    #[error(transparent)]
    EmptyPayload(#[from] EmptyPayload),

    #[error(transparent)]
    NotWritable(#[from] NotWritable),

    #[error(transparent)]
    InvalidIndexFile(#[from] InvalidIndexFile),
}

impl From<WalError> for io::Error {
    fn from(value: WalError) -> Self {
        match value {
            WalError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidInput, other.to_string()),
        }
    }
}

/// Error indicating a commit that skips over uncommitted entries.
///
/// Recoverable: the caller may re-drive the commit with the expected LSN.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(thiserror::Error)]
#[error("Out of order commit; expected {expected} but received {received}")]
pub struct OutOfOrderCommit {
    pub expected: Lsn,
    pub received: Lsn,
}

impl OutOfOrderCommit {
    pub fn new(expected: Lsn, received: Lsn) -> Self {
        Self { expected, received }
    }
}

/// Error indicating a truncation at or below the commit head.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(thiserror::Error)]
#[error("cannot truncate a committed log entry")]
pub struct TruncateCommitted {
    pub lsn: Lsn,
    pub commit: Lsn,
}

impl TruncateCommitted {
    pub fn new(lsn: Lsn, commit: Lsn) -> Self {
        Self { lsn, commit }
    }
}

/// Error indicating an LSN outside the range the index holds slots for.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(thiserror::Error)]
#[error("index out of range: lsn {lsn}, base {base}, head {head}")]
pub struct LsnOutOfRange {
    pub lsn: Lsn,
    pub base: Lsn,
    pub head: Lsn,
}

impl LsnOutOfRange {
    pub fn new(lsn: Lsn, base: Lsn, head: Lsn) -> Self {
        Self { lsn, base, head }
    }
}

/// Error indicating a write of a zero-length payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(thiserror::Error)]
#[error("payload must be a non-empty byte buffer")]
pub struct EmptyPayload;

/// Error indicating a mutating operation on a read-only log.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(thiserror::Error)]
#[error("log is not writable: {path}")]
pub struct NotWritable {
    pub path: String,
}

impl NotWritable {
    pub fn new(path: impl ToString) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

/// Error indicating an index file whose header cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(thiserror::Error)]
#[error("Invalid WAL index file: {path}: {reason}")]
pub struct InvalidIndexFile {
    pub path: String,
    pub reason: String,
}

impl InvalidIndexFile {
    pub fn new(path: impl ToString, reason: impl ToString) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
