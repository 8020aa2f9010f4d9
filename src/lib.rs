mod access;
mod config;
mod index;
mod wal;

pub(crate) mod num;
pub(crate) mod testing;

pub mod dump;
pub mod errors;
pub mod types;

pub use access::RandomAccessFile;
pub use config::Config;
pub use dump::Dump;
pub use errors::WalError;
pub use index::LogIndex;
pub use types::Lsn;
pub use types::Span;
pub use types::NO_COMMIT;
pub use wal::Decision;
pub use wal::RangeReader;
pub use wal::Wal;

#[cfg(test)]
mod tests;
