use std::collections::VecDeque;

use crate::access::RandomAccessFile;
use crate::errors::WalError;
use crate::types::Span;

/// Lazy, pull-driven sequence of entry payloads for a contiguous LSN
/// range.
///
/// The index is queried once for the whole range when the reader is
/// constructed; each payload is read from the log file on demand, one per
/// [`next`](Iterator::next) call. The sequence ends after exactly the
/// requested number of items, or at the first I/O error, which latches
/// the iterator.
pub struct RangeReader<'a> {
    log: &'a RandomAccessFile,
    spans: VecDeque<Span>,
    errored: bool,
}

impl<'a> RangeReader<'a> {
    pub(crate) fn new(log: &'a RandomAccessFile, spans: Vec<Span>) -> Self {
        Self {
            log,
            spans: VecDeque::from(spans),
            errored: false,
        }
    }

    /// Number of entries not yet produced.
    pub fn remaining(&self) -> usize {
        self.spans.len()
    }
}

impl Iterator for RangeReader<'_> {
    type Item = Result<Vec<u8>, WalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.errored {
            return None;
        }

        let span = self.spans.pop_front()?;

        let res = self.log.read(span.offset(), span.size());
        if res.is_err() {
            self.errored = true;
        }

        Some(res.map_err(WalError::from))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.spans.len();
        (0, Some(n))
    }
}
