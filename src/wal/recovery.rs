use log::info;
use log::warn;

use crate::errors::WalError;
use crate::types::Lsn;
use crate::wal::Wal;

/// Verdict of a recovery handler on one uncommitted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep the entry: it is committed and recovery moves to the next LSN.
    Accept,
    /// Drop the entry and everything after it.
    Reject,
}

impl Wal {
    /// Drives the caller-supplied handler over the uncommitted tail, in
    /// LSN order.
    ///
    /// For each LSN in `(commit_head, next)` the handler receives the LSN
    /// and its payload and decides:
    ///
    /// - [`Decision::Accept`]: the entry is committed; recovery continues
    ///   with the next LSN.
    /// - [`Decision::Reject`]: the log is truncated at that LSN and
    ///   recovery stops.
    ///
    /// Handler errors propagate and abort recovery. Afterwards every
    /// surviving entry is committed: `next() - 1 == commit_head()`.
    pub fn recover<F>(&mut self, mut handler: F) -> Result<(), WalError>
    where F: FnMut(Lsn, Vec<u8>) -> Result<Decision, WalError> {
        if !self.writable() {
            return Err(self.not_writable().into());
        }

        let head = self.next();

        let mut lsn = self.commit_head() + 1;
        if lsn >= head {
            return Ok(());
        }

        info!(
            "Recovering {}: inspecting uncommitted [{}, {})",
            self.name(),
            lsn,
            head
        );

        loop {
            let payload = self.read(lsn)?;

            match handler(lsn, payload)? {
                Decision::Accept => {
                    self.commit(lsn)?;
                    lsn += 1;

                    if lsn >= head {
                        // Every entry was accepted; the tail truncation
                        // lands on the head and is a no-op.
                        self.truncate(self.commit_head() + 1)?;
                        return Ok(());
                    }
                }
                Decision::Reject => {
                    warn!(
                        "Recovery rejected entry {}; truncating {} at it",
                        lsn,
                        self.name()
                    );
                    self.truncate(lsn)?;
                    return Ok(());
                }
            }
        }
    }

    /// Recovery that rejects every uncommitted entry: truncates the log
    /// right after the commit head.
    pub fn recover_reject_all(&mut self) -> Result<(), WalError> {
        self.recover(|_lsn, _payload| Ok(Decision::Reject))
    }
}
