use std::path::Path;

/// Suffix a path must carry to be accepted by [`CompressedFile::open`](crate::CompressedFile::open).
pub const DEFAULT_SUFFIX: &str = ".zst";

/// Configuration for a [`CompressedFile`](crate::CompressedFile).
///
/// ```text
/// ┌────────────────┬───────────────────────────────────────────────────┐
/// │ Field          │ Purpose                                           │
/// ├────────────────┼───────────────────────────────────────────────────┤
/// │ suffix         │ Required file name suffix checked on open         │
/// │ min_chunk_size │ Floor for the raw chunk pulled per loop iteration │
/// │ header_min     │ Override for the decoder's header-scan minimum    │
/// └────────────────┴───────────────────────────────────────────────────┘
/// ```
///
/// With the defaults, each decode-loop iteration pulls exactly as many raw
/// bytes as the caller requested, and buffers are sized from the codec's
/// maximum frame header size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Suffix enforced on the path passed to `open`.
    pub suffix: String,

    /// Lower bound on the number of raw bytes requested from the source
    /// per iteration. `0` means "use the request size".
    pub min_chunk_size: usize,

    /// Minimum scratch and saved-buffer capacity. `None` uses the
    /// decoder's [`HEADER_SIZE_MAX`](crate::StreamDecoder::HEADER_SIZE_MAX).
    pub header_min: Option<usize>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            min_chunk_size: 0,
            header_min: None,
        }
    }
}

impl ReaderConfig {
    /// Raw chunk size for a request of `size` bytes.
    pub(crate) fn chunk_size(&self, size: usize) -> usize {
        size.max(self.min_chunk_size)
    }

    /// Whether `path` carries the configured suffix.
    ///
    /// A path no longer than the suffix itself never matches, so a bare
    /// `".zst"` is rejected.
    pub fn accepts(&self, path: &Path) -> bool {
        let path = path.as_os_str().as_encoded_bytes();
        let suffix = self.suffix.as_bytes();
        path.len() > suffix.len() && path.ends_with(suffix)
    }
}
