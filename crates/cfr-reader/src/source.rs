use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

/// A sequential supplier of raw, still-compressed bytes.
///
/// The contract mirrors `fread`: [`read_up_to`](Self::read_up_to) fills as
/// much of `buf` as it can, and a return value smaller than `buf.len()`
/// means the source is exhausted. Any other failure is an `Err`.
pub trait ByteSource {
    /// Read up to `buf.len()` bytes, returning how many were read.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error for anything other than a clean
    /// end-of-stream.
    fn read_up_to(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source could not be closed cleanly.
    fn close(self) -> io::Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Adapts any [`Read`] into a [`ByteSource`].
///
/// A single `Read::read` call may legally return fewer bytes than asked
/// for without being at end-of-stream, so this adapter keeps reading until
/// either `buf` is full or the inner reader returns `0`. Interrupted reads
/// are retried.
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

/// The byte source used by [`CompressedFile::open`](crate::CompressedFile::open).
pub type FileSource = ReadSource<File>;

impl<R: Read> ReadSource<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Acquire a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Return the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl FileSource {
    /// Open `path` for exclusive sequential reading.
    ///
    /// # Errors
    ///
    /// Returns the error from [`File::open`].
    pub fn open(path: &Path) -> io::Result<Self> {
        File::open(path).map(Self::new)
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn read_up_to(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use partial_io::{PartialOp, PartialRead};

    use super::*;

    #[test]
    fn fills_buffer_across_short_reads() {
        let ops = vec![PartialOp::Limited(1), PartialOp::Limited(2), PartialOp::Limited(1)];
        let reader = PartialRead::new(Cursor::new(b"abcdefgh".to_vec()), ops);
        let mut source = ReadSource::new(reader);

        let mut buf = [0u8; 6];
        assert_eq!(source.read_up_to(&mut buf).unwrap(), 6);
        assert_eq!(&buf, b"abcdef");

        assert_eq!(source.read_up_to(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"gh");
        assert_eq!(source.read_up_to(&mut buf).unwrap(), 0);
    }

    #[test]
    fn retries_interrupted_reads() {
        let ops = vec![
            PartialOp::Err(ErrorKind::Interrupted),
            PartialOp::Limited(3),
            PartialOp::Err(ErrorKind::Interrupted),
        ];
        let reader = PartialRead::new(Cursor::new(b"hello".to_vec()), ops);
        let mut source = ReadSource::new(reader);

        let mut buf = [0u8; 5];
        assert_eq!(source.read_up_to(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn surfaces_other_errors() {
        let ops = vec![PartialOp::Limited(2), PartialOp::Err(ErrorKind::WouldBlock)];
        let reader = PartialRead::new(Cursor::new(b"hello".to_vec()), ops);
        let mut source = ReadSource::new(reader);

        let mut buf = [0u8; 5];
        let err = source.read_up_to(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WouldBlock);
    }

    #[test]
    fn opens_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.bin");
        std::fs::write(&path, b"on disk").unwrap();

        let mut source = FileSource::open(&path).unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(source.read_up_to(&mut buf).unwrap(), 7);
        assert_eq!(&buf[..7], b"on disk");
        source.close().unwrap();
    }
}
