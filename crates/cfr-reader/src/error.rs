use std::path::PathBuf;

/// Errors surfaced by [`CompressedFile`](crate::CompressedFile).
///
/// End-of-stream is never an error: a read that delivers fewer bytes than
/// requested (down to zero) is a normal `Ok` result. Everything below is
/// reported to the immediate caller and never retried internally.
///
/// ```text
///   ReaderError
///   ├── FormatMismatch   ← path lacks the codec suffix (open time, recoverable)
///   ├── Open             ← the file itself could not be opened
///   ├── Init             ← decoder construction failed on first read
///   ├── SourceRead       ← transport failure distinct from clean EOF
///   ├── Decode           ← corrupt, truncated, or stalled compressed data
///   └── Close            ← the source failed to close (resources still freed)
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// The path does not end with the configured suffix.
    ///
    /// Raised before any filesystem access, so the caller can simply retry
    /// with another path.
    #[error("invalid input, missing {suffix} suffix: {}", path.display())]
    FormatMismatch { path: PathBuf, suffix: String },

    /// The compressed file could not be opened for reading.
    #[error("failed to open input file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Lazy decoder construction failed.
    #[error("failed to create decompression context: {0}")]
    Init(String),

    /// The byte source failed for a reason other than end-of-stream.
    #[error("failed to read from stream: {0}")]
    SourceRead(#[from] std::io::Error),

    /// The decoder rejected the compressed bytes.
    ///
    /// Carries the codec's own diagnostic string, in the same way the
    /// zstd wrapper errors do.
    #[error("failed to decompress: {0}")]
    Decode(String),

    /// Closing the byte source failed.
    #[error("failed to close file: {0}")]
    Close(#[source] std::io::Error),
}

impl ReaderError {
    /// Whether the reader that produced this error should be abandoned.
    ///
    /// Only a suffix mismatch leaves the caller free to try again, since
    /// no reader was ever created.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::FormatMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_mismatch_is_not_fatal() {
        let err = ReaderError::FormatMismatch {
            path: PathBuf::from("notes.txt"),
            suffix: ".zst".to_string(),
        };
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "invalid input, missing .zst suffix: notes.txt"
        );
    }

    #[test]
    fn io_errors_convert_to_source_read() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: ReaderError = io.into();
        assert!(matches!(err, ReaderError::SourceRead(_)));
        assert!(err.is_fatal());
    }
}
