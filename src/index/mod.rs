pub(crate) mod header;

use std::io;

use byteorder::BigEndian;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use log::info;

use crate::access::RandomAccessFile;
use crate::errors::InvalidIndexFile;
use crate::errors::LsnOutOfRange;
use crate::errors::OutOfOrderCommit;
use crate::errors::TruncateCommitted;
use crate::errors::WalError;
use crate::index::header::IndexHeader;
use crate::index::header::COMMIT_FIELD_OFFSET;
use crate::index::header::HEADER_LEN;
use crate::index::header::HEAD_FIELD_OFFSET;
use crate::index::header::MARKER;
use crate::types::Lsn;
use crate::types::Span;

/// The index file: fixed header plus a packed array of 4-byte big-endian
/// offsets, one per LSN in `[base, head]`.
///
/// The slot at `head` is a sentinel holding the log file's current size,
/// so the length of entry `L` is `offset(L + 1) - offset(L)` with no
/// per-entry metadata.
///
/// The decoded header is the single in-memory copy, authoritative after
/// open and flushed piecewise on mutation. Offset slots are never cached;
/// each lookup reads 4 or 8 bytes from the file.
#[derive(Debug)]
pub struct LogIndex {
    f: RandomAccessFile,
    header: IndexHeader,
}

impl LogIndex {
    /// Opens an existing index file and validates its header.
    pub fn open(path: impl ToString, writable: bool) -> Result<Self, WalError> {
        let path = path.to_string();
        let f = RandomAccessFile::open(&path, writable)?;

        if f.size() < HEADER_LEN {
            return Err(InvalidIndexFile::new(
                &path,
                format!("file too short: {} bytes", f.size()),
            )
            .into());
        }

        let buf = f.read(0, HEADER_LEN)?;
        let header = IndexHeader::decode(buf.as_slice())
            .map_err(|e| InvalidIndexFile::new(&path, e.to_string()))?;

        Ok(Self { f, header })
    }

    /// Creates a new index file with `head = base`, no commit, and the
    /// single sentinel slot `offset(base) = byte_offset`.
    ///
    /// Creation is not idempotent; it presumes no file exists.
    pub fn create(
        path: impl ToString,
        base: Lsn,
        byte_offset: u64,
    ) -> Result<Self, WalError> {
        let mut f = RandomAccessFile::create(path.to_string())?;

        let header = IndexHeader::new(base);

        let mut buf = Vec::with_capacity(HEADER_LEN as usize + 4);
        header.encode(&mut buf)?;
        buf.write_i32::<BigEndian>(to_slot(byte_offset)?)?;
        f.write(0, &buf)?;

        Ok(Self { f, header })
    }

    /// The next free LSN, one past the last written entry.
    pub fn head(&self) -> Lsn {
        self.header.head
    }

    /// The last committed LSN, or [`NO_COMMIT`](crate::NO_COMMIT).
    pub fn commit_head(&self) -> Lsn {
        self.header.commit
    }

    /// The first LSN this index holds a slot for. Reserved for
    /// segmentation; always 0 in the creation path.
    pub fn base_index(&self) -> Lsn {
        self.header.base
    }

    /// Marker bytes identifying an index file.
    pub fn marker(&self) -> [u8; 4] {
        MARKER
    }

    pub fn name(&self) -> &str {
        self.f.name()
    }

    /// Whether `lsn` is strictly below the commit head.
    ///
    /// This is a strict comparison: the entry at the commit head itself
    /// reports false. Use [`is_committed_or_earlier`](Self::is_committed_or_earlier)
    /// to include it.
    pub fn is_committed(&self, lsn: Lsn) -> bool {
        lsn < self.header.commit
    }

    /// Whether `lsn` is at or below the commit head.
    pub fn is_committed_or_earlier(&self, lsn: Lsn) -> bool {
        lsn <= self.header.commit
    }

    /// Commits `lsn`.
    ///
    /// Commits must arrive in LSN order: the expected next commit is
    /// `commit_head() + 1`. Committing below that is idempotent success
    /// without touching disk; committing above it is an
    /// [`OutOfOrderCommit`] error. Only the 4 commit header bytes are
    /// persisted.
    pub fn commit(&mut self, lsn: Lsn) -> Result<Lsn, WalError> {
        let expected = self.header.commit + 1;

        if lsn < expected {
            return Ok(lsn);
        }
        if lsn != expected {
            return Err(OutOfOrderCommit::new(expected, lsn).into());
        }

        self.header.commit = lsn;
        self.persist_commit()?;
        Ok(lsn)
    }

    /// Byte offset of entry `lsn` in the log file.
    ///
    /// Valid for `lsn <= head`; `offset(head)` is the sentinel slot equal
    /// to the log file size.
    pub fn offset(&self, lsn: Lsn) -> Result<u64, WalError> {
        if lsn < self.header.base || lsn > self.header.head {
            return Err(self.out_of_range(lsn).into());
        }

        let buf = self.f.read(self.slot_pos(lsn), 4)?;
        let offset = buf.as_slice().read_i32::<BigEndian>()?;
        Ok(offset as u64)
    }

    /// Byte range of entry `lsn` in the log file; valid for `lsn < head`.
    ///
    /// A single 8-byte read resolves both the offset slot and the next
    /// slot; their difference is the entry length.
    pub fn get(&self, lsn: Lsn) -> Result<Span, WalError> {
        if lsn < self.header.base || lsn >= self.header.head {
            return Err(self.out_of_range(lsn).into());
        }

        let buf = self.f.read(self.slot_pos(lsn), 8)?;
        let mut r = buf.as_slice();
        let offset = r.read_i32::<BigEndian>()? as u64;
        let next = r.read_i32::<BigEndian>()? as u64;

        Ok(Span::new(offset, next - offset))
    }

    /// Byte ranges of `count` entries starting at `lsn`, resolved with a
    /// single `(count + 1) * 4`-byte read.
    pub fn get_range(&self, lsn: Lsn, count: i32) -> Result<Vec<Span>, WalError> {
        if lsn < self.header.base || lsn >= self.header.head {
            return Err(self.out_of_range(lsn).into());
        }
        if count < 0 || count > self.header.head - lsn {
            return Err(self.out_of_range(lsn + count).into());
        }

        let buf = self.f.read(self.slot_pos(lsn), (count as u64 + 1) * 4)?;
        let mut r = buf.as_slice();

        let mut offset = r.read_i32::<BigEndian>()? as u64;
        let mut spans = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let next = r.read_i32::<BigEndian>()? as u64;
            spans.push(Span::new(offset, next - offset));
            offset = next;
        }

        Ok(spans)
    }

    /// Records that an entry was just written to the log, ending at
    /// `next_end_offset`, and assigns it the current head LSN.
    ///
    /// Appends `next_end_offset` as the new sentinel slot, then bumps the
    /// head and persists the 4 head header bytes. The sentinel is written
    /// first so a failure between the two steps loses the entry but leaves
    /// the index internally consistent.
    pub fn increment(&mut self, next_end_offset: u64) -> Result<Lsn, WalError> {
        let mut buf = Vec::with_capacity(4);
        buf.write_i32::<BigEndian>(to_slot(next_end_offset)?)?;
        self.f.write(self.slot_pos(self.header.head + 1), &buf)?;

        let lsn = self.header.head;
        self.header.head += 1;
        self.persist_head()?;
        Ok(lsn)
    }

    /// Discards entries at `t` and above: requires `commit < t < head`.
    ///
    /// Persists only the head header bytes; stale slots beyond the new
    /// head stay on disk and are overwritten by later increments.
    ///
    /// Returns the end offset of the surviving log prefix.
    pub fn truncate(&mut self, t: Lsn) -> Result<u64, WalError> {
        if t <= self.header.commit {
            return Err(TruncateCommitted::new(t, self.header.commit).into());
        }
        if t < self.header.base || t >= self.header.head {
            return Err(self.out_of_range(t).into());
        }

        self.header.head = t;
        self.persist_head()?;

        info!("Index {} truncated to head {}", self.f.name(), t);

        if t == self.header.base {
            self.offset(self.header.base)
        } else {
            let last = self.get(t - 1)?;
            Ok(last.end())
        }
    }

    /// Syncs and closes the underlying file.
    pub fn close(self) -> Result<(), WalError> {
        self.f.close()?;
        Ok(())
    }

    fn slot_pos(&self, lsn: Lsn) -> u64 {
        HEADER_LEN + (lsn - self.header.base) as u64 * 4
    }

    fn out_of_range(&self, lsn: Lsn) -> LsnOutOfRange {
        LsnOutOfRange::new(lsn, self.header.base, self.header.head)
    }

    fn persist_head(&mut self) -> Result<(), io::Error> {
        let mut buf = Vec::with_capacity(4);
        buf.write_i32::<BigEndian>(self.header.head)?;
        self.f.write(HEAD_FIELD_OFFSET, &buf)?;
        Ok(())
    }

    fn persist_commit(&mut self) -> Result<(), io::Error> {
        let mut buf = Vec::with_capacity(4);
        buf.write_i32::<BigEndian>(self.header.commit)?;
        self.f.write(COMMIT_FIELD_OFFSET, &buf)?;
        Ok(())
    }
}

fn to_slot(offset: u64) -> Result<i32, io::Error> {
    i32::try_from(offset).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("offset {} exceeds the 4-byte index slot range", offset),
        )
    })
}

#[cfg(test)]
mod tests {
    use crate::errors::WalError;
    use crate::index::LogIndex;
    use crate::types::Span;
    use crate::types::NO_COMMIT;

    fn temp_index() -> (tempfile::TempDir, LogIndex) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("a.log.lix");
        let index = LogIndex::create(path.to_str().unwrap(), 0, 0).unwrap();
        (temp_dir, index)
    }

    #[test]
    fn test_create_on_disk_layout() -> Result<(), WalError> {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("a.log.lix");
        let index = LogIndex::create(path.to_str().unwrap(), 0, 0)?;
        index.close()?;

        let b = vec![
            73, 68, 88, 36, // marker "IDX$"
            0, 0, 0, 0, // base
            0, 0, 0, 0, // head
            255, 255, 255, 255, // commit = -1
            0, 0, 0, 0, // sentinel slot O(0) = 0
        ];
        assert_eq!(std::fs::read(&path).unwrap(), b);

        Ok(())
    }

    #[test]
    fn test_increment_and_get() -> Result<(), WalError> {
        let (_g, mut index) = temp_index();

        assert_eq!(index.head(), 0);
        assert_eq!(index.commit_head(), NO_COMMIT);
        assert_eq!(index.base_index(), 0);
        assert_eq!(&index.marker(), b"IDX$");

        assert_eq!(index.increment(10)?, 0);
        assert_eq!(index.increment(25)?, 1);
        assert_eq!(index.head(), 2);

        assert_eq!(index.offset(0)?, 0);
        assert_eq!(index.offset(1)?, 10);
        assert_eq!(index.offset(2)?, 25);

        assert_eq!(index.get(0)?, Span::new(0, 10));
        assert_eq!(index.get(1)?, Span::new(10, 15));
        assert!(index.get(2).is_err());

        assert_eq!(index.get_range(0, 2)?, vec![
            Span::new(0, 10),
            Span::new(10, 15)
        ]);
        assert_eq!(index.get_range(1, 1)?, vec![Span::new(10, 15)]);
        assert_eq!(index.get_range(0, 0)?, vec![]);
        assert!(index.get_range(0, 3).is_err());

        Ok(())
    }

    #[test]
    fn test_commit_ordering() -> Result<(), WalError> {
        let (_g, mut index) = temp_index();

        index.increment(10)?;
        index.increment(25)?;

        let err = index.commit(1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Out of order commit; expected 0 but received 1"
        );

        assert_eq!(index.commit(0)?, 0);
        assert_eq!(index.commit(1)?, 1);
        assert_eq!(index.commit_head(), 1);

        // Re-committing an earlier LSN is idempotent success.
        assert_eq!(index.commit(0)?, 0);
        assert_eq!(index.commit_head(), 1);

        Ok(())
    }

    #[test]
    fn test_is_committed_is_strict() -> Result<(), WalError> {
        let (_g, mut index) = temp_index();

        index.increment(10)?;
        index.commit(0)?;

        // The commit head itself reports not committed.
        assert!(!index.is_committed(0));
        assert!(index.is_committed_or_earlier(0));
        assert!(!index.is_committed_or_earlier(1));

        Ok(())
    }

    #[test]
    fn test_truncate() -> Result<(), WalError> {
        let (_g, mut index) = temp_index();

        index.increment(10)?;
        index.increment(25)?;
        index.increment(31)?;
        index.commit(0)?;

        let err = index.truncate(0).unwrap_err();
        assert_eq!(err.to_string(), "cannot truncate a committed log entry");

        assert!(index.truncate(3).is_err());

        assert_eq!(index.truncate(1)?, 10);
        assert_eq!(index.head(), 1);
        assert_eq!(index.commit_head(), 0);

        Ok(())
    }

    #[test]
    fn test_truncate_to_base() -> Result<(), WalError> {
        let (_g, mut index) = temp_index();

        index.increment(10)?;

        assert_eq!(index.truncate(0)?, 0);
        assert_eq!(index.head(), 0);

        Ok(())
    }

    #[test]
    fn test_reopen_keeps_header_and_slots() -> Result<(), WalError> {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("a.log.lix");
        let path = path.to_str().unwrap();

        {
            let mut index = LogIndex::create(path, 0, 0)?;
            index.increment(10)?;
            index.increment(25)?;
            index.commit(0)?;
            index.close()?;
        }

        let index = LogIndex::open(path, false)?;
        assert_eq!(index.head(), 2);
        assert_eq!(index.commit_head(), 0);
        assert_eq!(index.get(1)?, Span::new(10, 15));

        Ok(())
    }

    #[test]
    fn test_open_rejects_foreign_file() -> Result<(), WalError> {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("junk");
        let path = path.to_str().unwrap();

        std::fs::write(path, b"not an index file").unwrap();

        let err = LogIndex::open(path, false).unwrap_err();
        assert!(matches!(err, WalError::InvalidIndexFile(_)));

        std::fs::write(path, b"short").unwrap();
        let err = LogIndex::open(path, false).unwrap_err();
        assert!(matches!(err, WalError::InvalidIndexFile(_)));

        Ok(())
    }
}
