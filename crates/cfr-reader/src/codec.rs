//! The streaming decoder seam.
//!
//! The reader never looks inside the codec. It hands a slice of raw bytes
//! and a scratch output buffer to [`StreamDecoder::decode`] and advances by
//! whatever the decoder reports. Tests substitute scripted decoders through
//! [`DecoderFactory`].

use std::io;

use zstd::stream::raw::{Decoder, Operation};

/// Maximum size of a zstd frame header (`ZSTD_FRAMEHEADERSIZE_MAX`).
pub const ZSTD_HEADER_SIZE_MAX: usize = 18;

/// Outcome of one [`StreamDecoder::decode`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeStatus {
    /// Raw bytes taken from the front of `input`.
    pub consumed: usize,

    /// Decompressed bytes written to the front of `output`.
    pub produced: usize,

    /// The current frame has been fully decoded and flushed.
    pub frame_complete: bool,
}

/// An opaque, stateful streaming decoder.
pub trait StreamDecoder {
    /// Smallest output buffer that guarantees a full stream header can be
    /// parsed.
    const HEADER_SIZE_MAX: usize;

    /// Perform one decoding step.
    ///
    /// May consume any prefix of `input` (including none) and produce
    /// between `0` and `output.len()` bytes.
    ///
    /// # Errors
    ///
    /// Returns the codec's diagnostic when the input is malformed.
    fn decode(&mut self, input: &[u8], output: &mut [u8]) -> io::Result<DecodeStatus>;
}

/// Builds decoders on demand, so construction can be deferred to the
/// first read.
pub trait DecoderFactory {
    type Decoder: StreamDecoder;

    /// Create a fresh decoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoding context cannot be allocated.
    fn create(&mut self) -> io::Result<Self::Decoder>;
}

impl<D, F> DecoderFactory for F
where
    D: StreamDecoder,
    F: FnMut() -> io::Result<D>,
{
    type Decoder = D;

    fn create(&mut self) -> io::Result<D> {
        self()
    }
}

/// zstd streaming decoder over `zstd::stream::raw::Decoder`.
pub struct ZstdDecoder {
    context: Decoder<'static>,
}

impl ZstdDecoder {
    /// Returns a new decoder.
    ///
    /// # Errors
    ///
    /// Returns an error if zstd cannot allocate a decompression context.
    pub fn new() -> io::Result<Self> {
        Decoder::new().map(|context| Self { context })
    }
}

impl StreamDecoder for ZstdDecoder {
    const HEADER_SIZE_MAX: usize = ZSTD_HEADER_SIZE_MAX;

    fn decode(&mut self, input: &[u8], output: &mut [u8]) -> io::Result<DecodeStatus> {
        let status = self.context.run_on_buffers(input, output)?;
        // zstd reports 0 remaining once a frame is completely decoded and flushed.
        Ok(DecodeStatus {
            consumed: status.bytes_read,
            produced: status.bytes_written,
            frame_complete: status.remaining == 0,
        })
    }
}

/// Factory for [`ZstdDecoder`], the default codec of
/// [`CompressedFile`](crate::CompressedFile).
#[derive(Clone, Copy, Debug, Default)]
pub struct ZstdCodec;

impl DecoderFactory for ZstdCodec {
    type Decoder = ZstdDecoder;

    fn create(&mut self) -> io::Result<ZstdDecoder> {
        ZstdDecoder::new()
    }
}
