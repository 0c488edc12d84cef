use std::collections::TryReserveError;

use log::debug;

/// FIFO of decompressed bytes that were produced but not yet delivered.
///
/// Bytes are appended at `tail` and consumed from `head`. The backing
/// storage is a plain `Vec<u8>` whose length is the capacity:
///
/// ```text
///   0         head            tail          capacity
///   ├─────────┼───────────────┼─────────────┤
///   │ drained │ pending bytes │ free        │
///   └─────────┴───────────────┴─────────────┘
/// ```
///
/// When an append does not fit behind `tail`, the pending bytes are first
/// compacted to the front; only if they still do not fit is the capacity
/// doubled, as many times as needed. Capacity never shrinks.
#[derive(Debug)]
pub(crate) struct SavedBuffer {
    bytes: Vec<u8>,
    head: usize,
    tail: usize,
}

impl SavedBuffer {
    /// Create an empty buffer with `capacity` bytes of storage.
    ///
    /// A zero capacity is bumped to one so doubling always makes progress.
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let capacity = capacity.max(1);
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(capacity)?;
        bytes.resize(capacity, 0);
        Ok(Self {
            bytes,
            head: 0,
            tail: 0,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.tail - self.head
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub(crate) fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Append `data` at the tail, growing storage as needed.
    pub(crate) fn push(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }

        if self.tail + data.len() > self.capacity() {
            self.compact();
        }

        let needed = self.tail + data.len();
        if needed > self.capacity() {
            let mut capacity = self.capacity();
            while capacity < needed {
                capacity *= 2;
            }
            debug!("growing saved buffer from {} to {capacity} bytes", self.capacity());
            self.bytes.resize(capacity, 0);
        }

        self.bytes[self.tail..needed].copy_from_slice(data);
        self.tail = needed;
    }

    /// Move up to `dest.len()` bytes from the head into `dest`.
    ///
    /// With `stop_at` set, copying ends right after the first occurrence
    /// of that byte, if it lies within the first `dest.len()` bytes.
    /// Returns the number of bytes moved; `0` when the buffer is empty.
    pub(crate) fn take_into(&mut self, dest: &mut [u8], stop_at: Option<u8>) -> usize {
        let available = &self.bytes[self.head..self.tail];
        let mut count = available.len().min(dest.len());

        if let Some(delim) = stop_at
            && let Some(pos) = available[..count].iter().position(|&b| b == delim)
        {
            count = pos + 1;
        }

        dest[..count].copy_from_slice(&available[..count]);
        self.head += count;
        if self.head == self.tail {
            self.head = 0;
            self.tail = 0;
        }
        count
    }

    /// Shift pending bytes down to offset zero.
    fn compact(&mut self) {
        if self.head == 0 {
            return;
        }
        self.bytes.copy_within(self.head..self.tail, 0);
        self.tail -= self.head;
        self.head = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_yields_nothing() {
        let mut saved = SavedBuffer::try_with_capacity(8).unwrap();
        let mut dest = [0u8; 4];
        assert_eq!(saved.take_into(&mut dest, None), 0);
        assert!(saved.is_empty());
    }

    #[test]
    fn consumes_in_fifo_order() {
        let mut saved = SavedBuffer::try_with_capacity(8).unwrap();
        saved.push(b"abcdef");

        let mut dest = [0u8; 4];
        assert_eq!(saved.take_into(&mut dest, None), 4);
        assert_eq!(&dest, b"abcd");
        assert_eq!(saved.len(), 2);

        saved.push(b"gh");
        let mut rest = [0u8; 8];
        assert_eq!(saved.take_into(&mut rest, None), 4);
        assert_eq!(&rest[..4], b"efgh");
        assert!(saved.is_empty());
    }

    #[test]
    fn stops_after_delimiter() {
        let mut saved = SavedBuffer::try_with_capacity(16).unwrap();
        saved.push(b"one\ntwo\n");

        let mut dest = [0u8; 16];
        assert_eq!(saved.take_into(&mut dest, Some(b'\n')), 4);
        assert_eq!(&dest[..4], b"one\n");
        assert_eq!(saved.take_into(&mut dest, Some(b'\n')), 4);
        assert_eq!(&dest[..4], b"two\n");
    }

    #[test]
    fn delimiter_beyond_limit_is_ignored() {
        let mut saved = SavedBuffer::try_with_capacity(16).unwrap();
        saved.push(b"abcdef\n");

        let mut dest = [0u8; 3];
        assert_eq!(saved.take_into(&mut dest, Some(b'\n')), 3);
        assert_eq!(&dest, b"abc");
        assert_eq!(saved.len(), 4);
    }

    #[test]
    fn capacity_doubles_and_never_shrinks() {
        let mut saved = SavedBuffer::try_with_capacity(4).unwrap();
        saved.push(b"0123456789");
        assert_eq!(saved.capacity(), 16);

        let mut dest = [0u8; 10];
        assert_eq!(saved.take_into(&mut dest, None), 10);
        assert_eq!(saved.capacity(), 16);
    }

    #[test]
    fn compacts_before_growing() {
        let mut saved = SavedBuffer::try_with_capacity(8).unwrap();
        saved.push(b"abcdefgh");

        let mut dest = [0u8; 6];
        saved.take_into(&mut dest, None);
        saved.push(b"ijklmn");

        assert_eq!(saved.capacity(), 8);
        let mut rest = [0u8; 8];
        assert_eq!(saved.take_into(&mut rest, None), 8);
        assert_eq!(&rest, b"ghijklmn");
    }
}
