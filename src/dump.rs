use std::io;

use crate::types::Lsn;
use crate::types::Span;
use crate::wal::Wal;

/// A dump utility that lists the contents of an open WAL in a
/// human-readable format.
///
/// Borrows the WAL; reads go through its index and log file and take no
/// extra lock.
pub struct Dump<'a> {
    wal: &'a Wal,
}

impl Wal {
    /// Returns a dump handle over this WAL.
    pub fn dump(&self) -> Dump<'_> {
        Dump { wal: self }
    }
}

impl Dump<'_> {
    /// Writes the WAL contents to a String.
    pub fn write_to_string(&self) -> Result<String, io::Error> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        String::from_utf8(buf).map_err(io::Error::other)
    }

    /// Writes the WAL contents to the provided writer: one header line,
    /// then one line per entry with its byte range and payload.
    pub fn write<W: io::Write>(&self, mut w: W) -> Result<(), io::Error> {
        let index = self.wal.index();

        writeln!(&mut w, "Wal:")?;
        writeln!(
            &mut w,
            "base={}, head={}, commit={}, size={}",
            index.base_index(),
            index.head(),
            index.commit_head(),
            self.wal.size(),
        )?;

        let write_line = |lsn: Lsn,
                          span: Span,
                          res: Result<Vec<u8>, io::Error>|
         -> Result<(), io::Error> {
            match res {
                Ok(payload) => {
                    writeln!(
                        &mut w,
                        "  L-{:05}: {}: {:?}",
                        lsn,
                        span,
                        String::from_utf8_lossy(&payload)
                    )?;
                }
                Err(io_err) => {
                    writeln!(&mut w, "  L-{:05}: {}: Error: {}", lsn, span, io_err)?;
                }
            }
            Ok(())
        };

        self.write_with(write_line)
    }

    /// Writes the WAL contents using a custom record writer function.
    ///
    /// The callback receives each entry's LSN, its byte range in the log
    /// file, and its payload or the read error.
    pub fn write_with<D>(&self, mut write_record: D) -> Result<(), io::Error>
    where D: FnMut(Lsn, Span, Result<Vec<u8>, io::Error>) -> Result<(), io::Error>
    {
        let index = self.wal.index();
        let base = index.base_index();
        let count = index.head() - base;

        if count == 0 {
            return Ok(());
        }

        let spans = index.get_range(base, count)?;
        for (i, span) in spans.into_iter().enumerate() {
            let lsn = base + i as Lsn;
            let res = self.wal.read(lsn).map_err(io::Error::from);
            write_record(lsn, span, res)?;
        }

        Ok(())
    }
}
