//! In-memory accumulation of records awaiting a flush.

use std::collections::VecDeque;

/// Ordered pending records plus their derived byte-size counter.
///
/// Owned exclusively by one sink and guarded by that sink's lock; flush
/// order equals append order. Draining is two-phase: [`snapshot`] copies
/// the pending prefix without mutating, and [`consume`] removes it once
/// the backend write succeeded, so a failed write retains every record.
///
/// [`snapshot`]: RecordBuffer::snapshot
/// [`consume`]: RecordBuffer::consume
#[derive(Debug, Default)]
pub struct RecordBuffer {
    records: VecDeque<Vec<u8>>,
    size: usize,
}

impl RecordBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record, returning its byte length.
    pub fn push(&mut self, record: &[u8]) -> usize {
        self.records.push_back(record.to_vec());
        self.size += record.len();
        record.len()
    }

    /// Number of pending records.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Total byte length of the pending records.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy up to `max` pending records (all of them when `None`) into one
    /// contiguous byte vector, oldest first, without mutating the buffer.
    ///
    /// Returns the number of records taken alongside their bytes.
    #[must_use]
    pub fn snapshot(&self, max: Option<usize>) -> (usize, Vec<u8>) {
        let take = match max {
            Some(max) if max < self.records.len() => max,
            _ => self.records.len(),
        };
        let bytes = self
            .records
            .iter()
            .take(take)
            .map(Vec::len)
            .sum::<usize>();
        let mut out = Vec::with_capacity(bytes);
        for record in self.records.iter().take(take) {
            out.extend_from_slice(record);
        }
        (take, out)
    }

    /// Drop the `count` oldest records after they were durably written.
    pub fn consume(&mut self, count: usize) {
        let count = count.min(self.records.len());
        for record in self.records.drain(..count) {
            self.size -= record.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_pushes_and_consumes() {
        let mut buffer = RecordBuffer::new();
        assert!(buffer.is_empty());

        assert_eq!(buffer.push(b"ab"), 2);
        assert_eq!(buffer.push(b"cde"), 3);
        assert_eq!(buffer.count(), 2);
        assert_eq!(buffer.size(), 5);

        buffer.consume(1);
        assert_eq!(buffer.count(), 1);
        assert_eq!(buffer.size(), 3);

        buffer.consume(1);
        assert!(buffer.is_empty());
        assert_eq!(buffer.size(), 0);
    }

    #[test]
    fn snapshot_preserves_order_and_leaves_buffer_intact() {
        let mut buffer = RecordBuffer::new();
        buffer.push(b"a");
        buffer.push(b"b");
        buffer.push(b"c");

        let (taken, bytes) = buffer.snapshot(None);
        assert_eq!(taken, 3);
        assert_eq!(bytes, b"abc");
        // Snapshot is read-only; the records are still pending.
        assert_eq!(buffer.count(), 3);
        assert_eq!(buffer.size(), 3);
    }

    #[test]
    fn snapshot_caps_at_max() {
        let mut buffer = RecordBuffer::new();
        buffer.push(b"one");
        buffer.push(b"two");
        buffer.push(b"three");

        let (taken, bytes) = buffer.snapshot(Some(2));
        assert_eq!(taken, 2);
        assert_eq!(bytes, b"onetwo");

        buffer.consume(taken);
        let (taken, bytes) = buffer.snapshot(Some(2));
        assert_eq!(taken, 1);
        assert_eq!(bytes, b"three");
    }

    #[test]
    fn consume_beyond_len_drains_everything() {
        let mut buffer = RecordBuffer::new();
        buffer.push(b"only");
        buffer.consume(10);
        assert!(buffer.is_empty());
        assert_eq!(buffer.size(), 0);
    }
}
