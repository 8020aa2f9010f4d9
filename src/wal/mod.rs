mod range_reader;
mod recovery;

use std::io;
use std::sync::Arc;

use log::info;
pub use range_reader::RangeReader;
pub use recovery::Decision;

use crate::access::RandomAccessFile;
use crate::config::Config;
use crate::errors::EmptyPayload;
use crate::errors::LsnOutOfRange;
use crate::errors::NotWritable;
use crate::errors::WalError;
use crate::index::LogIndex;
use crate::types::Lsn;

/// A durable, append-only write-ahead log.
///
/// Composes one log file, holding the opaque concatenation of entry
/// payloads in LSN order, and one index file mapping each LSN to the byte
/// range its payload occupies. Entries are identified by dense LSNs
/// assigned from 0; committing and truncation move the commit head and
/// write head recorded in the index header.
///
/// Every mutating operation takes `&mut self`: overlapping composite
/// mutations of one WAL are rejected at compile time, and no internal
/// mutex is taken. Each WAL exclusively owns its two files for its
/// lifetime.
#[derive(Debug)]
pub struct Wal {
    config: Arc<Config>,
    log: RandomAccessFile,
    index: LogIndex,
}

impl Wal {
    /// Creates both files and initializes the index header.
    ///
    /// Fails if either file already exists.
    pub fn create(config: Config) -> Result<Self, WalError> {
        let mut log = RandomAccessFile::create(&config.path)?;
        log.lock_exclusive()?;

        let index = LogIndex::create(config.index_path(), 0, 0)?;

        info!("Created WAL: {} (index: {})", config.path, config.index_path());

        Ok(Self {
            config: Arc::new(config),
            log,
            index,
        })
    }

    /// Opens both files, read-only or read/write per the config.
    ///
    /// A missing file surfaces as `io::ErrorKind::NotFound`. A writable
    /// open takes an advisory exclusive lock on the log file.
    pub fn open(config: Config) -> Result<Self, WalError> {
        let writable = config.writable();

        let mut log = RandomAccessFile::open(&config.path, writable)?;
        if writable {
            log.lock_exclusive()?;
        }

        let index = LogIndex::open(config.index_path(), writable)?;

        info!(
            "Opened WAL: {} writable={} head={} commit={}",
            config.path,
            writable,
            index.head(),
            index.commit_head()
        );

        Ok(Self {
            config: Arc::new(config),
            log,
            index,
        })
    }

    /// Opens the WAL, creating it first when absent and writable.
    ///
    /// Only `NotFound` triggers the create fallback, and only for a
    /// writable config; everything else propagates.
    pub fn open_or_create(config: Config) -> Result<Self, WalError> {
        match Self::open(config.clone()) {
            Ok(wal) => Ok(wal),
            Err(WalError::Io(e))
                if e.kind() == io::ErrorKind::NotFound && config.writable() =>
            {
                Self::create(config)
            }
            Err(e) => Err(e),
        }
    }

    /// Appends `payload` as the next entry and returns its LSN.
    ///
    /// The payload lands at the sentinel offset `offset(head)`; the index
    /// is incremented only after the payload write completes, so a failure
    /// in between leaves unreachable trailing bytes but a consistent
    /// index.
    pub fn write(&mut self, payload: &[u8]) -> Result<Lsn, WalError> {
        if !self.writable() {
            return Err(self.not_writable().into());
        }
        if payload.is_empty() {
            return Err(EmptyPayload.into());
        }

        let start = self.index.offset(self.index.head())?;
        let end = self.log.write(start, payload)?;
        let lsn = self.index.increment(end)?;

        Ok(lsn)
    }

    /// Reads back the payload of entry `lsn`, byte for byte.
    pub fn read(&self, lsn: Lsn) -> Result<Vec<u8>, WalError> {
        let span = self.index.get(lsn)?;
        let buf = self.log.read(span.offset(), span.size())?;
        Ok(buf)
    }

    /// Returns a lazy sequence over the payloads of `count` entries
    /// starting at `first`; `count` defaults to all remaining entries.
    ///
    /// The index is queried once for the whole range up front; payloads
    /// are read from the log file one at a time as the sequence is pulled.
    pub fn read_range(
        &self,
        first: Lsn,
        count: Option<i32>,
    ) -> Result<RangeReader<'_>, WalError> {
        let head = self.index.head();
        if first < self.index.base_index() || first > head {
            return Err(LsnOutOfRange::new(first, self.index.base_index(), head).into());
        }

        let count = count.unwrap_or(head - first);

        let spans = if count == 0 {
            Vec::new()
        } else {
            self.index.get_range(first, count)?
        };

        Ok(RangeReader::new(&self.log, spans))
    }

    /// Commits `lsn`. See [`LogIndex::commit`] for the ordering contract.
    pub fn commit(&mut self, lsn: Lsn) -> Result<Lsn, WalError> {
        if !self.writable() {
            return Err(self.not_writable().into());
        }
        self.index.commit(lsn)
    }

    /// Whether `lsn` is strictly below the commit head; see
    /// [`LogIndex::is_committed`].
    pub fn is_committed(&self, lsn: Lsn) -> bool {
        self.index.is_committed(lsn)
    }

    /// Whether `lsn` is at or below the commit head.
    pub fn is_committed_or_earlier(&self, lsn: Lsn) -> bool {
        self.index.is_committed_or_earlier(lsn)
    }

    /// Discards entries at `from` and above and shrinks the log file to
    /// the surviving prefix. Returns the new log size in bytes.
    ///
    /// Requires `commit_head() < from <= next()`. Truncating at the write
    /// head is a no-op success; truncated LSNs are re-issued by the next
    /// write.
    pub fn truncate(&mut self, from: Lsn) -> Result<u64, WalError> {
        if !self.writable() {
            return Err(self.not_writable().into());
        }

        if from == self.index.head() {
            return Ok(self.log.size());
        }

        let new_size = self.index.truncate(from)?;
        self.log.truncate(new_size)?;

        info!("Truncated WAL {} to lsn {}: new size {}", self.name(), from, new_size);

        Ok(new_size)
    }

    /// Syncs and closes both files.
    pub fn close(self) -> Result<(), WalError> {
        self.log.close()?;
        self.index.close()?;
        Ok(())
    }

    /// Path of the log file.
    pub fn name(&self) -> &str {
        &self.config.path
    }

    /// The index file.
    pub fn index(&self) -> &LogIndex {
        &self.index
    }

    pub fn writable(&self) -> bool {
        self.log.writable()
    }

    /// Log file size in bytes.
    pub fn size(&self) -> u64 {
        self.log.size()
    }

    /// The LSN the next write will be assigned.
    pub fn next(&self) -> Lsn {
        self.index.head()
    }

    /// The last committed LSN, or [`NO_COMMIT`](crate::NO_COMMIT).
    pub fn commit_head(&self) -> Lsn {
        self.index.commit_head()
    }

    pub(crate) fn not_writable(&self) -> NotWritable {
        NotWritable::new(&self.config.path)
    }
}
