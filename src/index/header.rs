use std::io;

use byteorder::BigEndian;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;

use crate::types::Lsn;
use crate::types::NO_COMMIT;

/// Marker bytes identifying an index file: ASCII `IDX$`.
pub(crate) const MARKER: [u8; 4] = *b"IDX$";

/// Encoded header length in bytes.
pub(crate) const HEADER_LEN: u64 = 16;

/// File offset of the encoded `head` field.
pub(crate) const HEAD_FIELD_OFFSET: u64 = 8;

/// File offset of the encoded `commit` field.
pub(crate) const COMMIT_FIELD_OFFSET: u64 = 12;

/// The fixed 16-byte index file header.
///
/// ```text
/// offset  size  field
/// 0       4     marker  = ASCII "IDX$"
/// 4       4     base    (big-endian i32; reserved for segmentation)
/// 8       4     head    (big-endian i32; next free LSN)
/// 12      4     commit  (big-endian i32; last committed LSN, or -1)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IndexHeader {
    pub(crate) base: Lsn,
    pub(crate) head: Lsn,
    pub(crate) commit: Lsn,
}

impl IndexHeader {
    /// Header of a freshly created index: `head = base`, no commit.
    pub(crate) fn new(base: Lsn) -> Self {
        Self {
            base,
            head: base,
            commit: NO_COMMIT,
        }
    }

    pub(crate) fn encode<W: io::Write>(&self, mut w: W) -> Result<usize, io::Error> {
        w.write_all(&MARKER)?;
        w.write_i32::<BigEndian>(self.base)?;
        w.write_i32::<BigEndian>(self.head)?;
        w.write_i32::<BigEndian>(self.commit)?;

        Ok(HEADER_LEN as usize)
    }

    pub(crate) fn decode<R: io::Read>(mut r: R) -> Result<Self, io::Error> {
        let mut marker = [0u8; 4];
        r.read_exact(&mut marker)?;

        if marker != MARKER {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "unexpected marker {:?}, expected {:?}",
                    String::from_utf8_lossy(&marker),
                    String::from_utf8_lossy(&MARKER),
                ),
            ));
        }

        let base = r.read_i32::<BigEndian>()?;
        let head = r.read_i32::<BigEndian>()?;
        let commit = r.read_i32::<BigEndian>()?;

        Ok(Self { base, head, commit })
    }
}
