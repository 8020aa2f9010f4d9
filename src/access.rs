use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::Write;

use fs2::FileExt;
use log::info;

/// Byte-addressable access to one OS file.
///
/// Wraps a single [`File`] with positional read/write, truncation, and a
/// cached size. Writes past the current end of file extend it. The handle
/// is single-owner; serialization of mutations is the caller's contract.
#[derive(Debug)]
pub struct RandomAccessFile {
    f: File,
    path: String,
    size: u64,
    writable: bool,
    locked: bool,
}

impl RandomAccessFile {
    /// Opens an existing file.
    ///
    /// A missing file surfaces as `io::ErrorKind::NotFound`.
    pub fn open(path: impl ToString, writable: bool) -> Result<Self, io::Error> {
        let path = path.to_string();
        let f = OpenOptions::new().read(true).write(writable).open(&path)?;
        let size = f.metadata()?.len();

        Ok(Self {
            f,
            path,
            size,
            writable,
            locked: false,
        })
    }

    /// Creates a new empty writable file. Fails if the file already exists.
    pub fn create(path: impl ToString) -> Result<Self, io::Error> {
        let path = path.to_string();
        let f = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;

        Ok(Self {
            f,
            path,
            size: 0,
            writable: true,
            locked: false,
        })
    }

    /// Acquires an advisory exclusive lock on the file.
    ///
    /// A second writable handle on the same file fails with `WouldBlock`
    /// instead of silently interleaving writes.
    pub fn lock_exclusive(&mut self) -> Result<(), io::Error> {
        self.f.try_lock_exclusive().map_err(|e| {
            io::Error::new(
                io::ErrorKind::WouldBlock,
                format!(
                    "File '{}' is already locked by another handle, \
                    close it to continue; error:({})",
                    self.path, e
                ),
            )
        })?;

        self.locked = true;
        info!("File lock acquired: {}", self.path);
        Ok(())
    }

    /// Reads exactly `len` bytes starting at `offset`.
    pub fn read(&self, offset: u64, len: u64) -> Result<Vec<u8>, io::Error> {
        let mut f = &self.f;
        f.seek(io::SeekFrom::Start(offset))?;

        let mut buf = vec![0u8; len as usize];
        f.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Writes `data` starting at `offset`, extending the file if needed.
    ///
    /// Returns the offset one past the last byte written.
    pub fn write(&mut self, offset: u64, data: &[u8]) -> Result<u64, io::Error> {
        let mut f = &self.f;
        f.seek(io::SeekFrom::Start(offset))?;
        f.write_all(data)?;

        let end = offset + data.len() as u64;
        if end > self.size {
            self.size = end;
        }
        Ok(end)
    }

    /// Shrinks the file to `new_size` bytes and syncs.
    pub fn truncate(&mut self, new_size: u64) -> Result<(), io::Error> {
        self.f.set_len(new_size)?;
        self.f.sync_all()?;
        self.size = new_size;
        Ok(())
    }

    /// Syncs (when writable) and closes the file.
    pub fn close(self) -> Result<(), io::Error> {
        if self.writable {
            self.f.sync_all()?;
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn writable(&self) -> bool {
        self.writable
    }
}

impl Drop for RandomAccessFile {
    fn drop(&mut self) {
        if self.locked {
            let _ = self.f.unlock();
            info!("File lock released: {}", self.path);
        }
    }
}
