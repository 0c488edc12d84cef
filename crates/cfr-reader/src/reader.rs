use std::io::{self, Read};
use std::path::Path;

use log::{debug, trace, warn};

use crate::codec::{DecoderFactory, StreamDecoder, ZstdCodec};
use crate::config::ReaderConfig;
use crate::error::ReaderError;
use crate::saved::SavedBuffer;
use crate::source::{ByteSource, FileSource};

/// Line terminator recognised by [`CompressedFile::read_line`].
pub const EOL: u8 = b'\n';

/// File-like reader over a compressed byte stream.
///
/// Offers the three classic read primitives (block, byte, line) on top of a
/// streaming decoder. Decompressed bytes that the decoder produces beyond
/// what the current call can take are kept in a carry-over buffer and
/// handed out first on the next call.
///
/// The decoder and its buffers are created lazily on the first read that
/// asks for at least one byte, and are released together in
/// [`close`](Self::close), which consumes the reader.
///
/// ```text
///   caller ──► saved buffer ──(not enough)──► source ─► decoder ─► scratch
///     ▲                                                               │
///     └──────────── fits in dest ◄────────────┬───────────────────────┘
///                                             └──► overflow ─► saved buffer
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use cfr_reader::CompressedFile;
///
/// let mut file = CompressedFile::open("server.log.zst")?;
/// let mut line = [0u8; 128];
/// while let Some(text) = file.read_line(&mut line)? {
///     print!("{}", String::from_utf8_lossy(text));
/// }
/// file.close()?;
/// # Ok::<(), cfr_reader::ReaderError>(())
/// ```
pub struct CompressedFile<S = FileSource, F = ZstdCodec>
where
    F: DecoderFactory,
{
    source: S,
    factory: F,
    config: ReaderConfig,
    engine: Option<Engine<F::Decoder>>,
}

impl CompressedFile {
    /// Open a compressed file with the default configuration.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::FormatMismatch`] if the path lacks the `.zst` suffix.
    ///   No filesystem access happens in that case.
    /// - [`ReaderError::Open`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReaderError> {
        Self::open_with(path, ReaderConfig::default())
    }

    /// Open a compressed file with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open), using `config.suffix`.
    pub fn open_with(path: impl AsRef<Path>, config: ReaderConfig) -> Result<Self, ReaderError> {
        let path = path.as_ref();
        if !config.accepts(path) {
            return Err(ReaderError::FormatMismatch {
                path: path.to_path_buf(),
                suffix: config.suffix,
            });
        }

        let source = FileSource::open(path).map_err(|source| ReaderError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("opened compressed file {}", path.display());

        Ok(Self::from_source(source, ZstdCodec, config))
    }
}

impl<S: ByteSource, F: DecoderFactory> CompressedFile<S, F> {
    /// Build a reader over an arbitrary byte source and decoder factory.
    ///
    /// Nothing is read and no decoder is created until the first read.
    pub fn from_source(source: S, factory: F, config: ReaderConfig) -> Self {
        Self {
            source,
            factory,
            config,
            engine: None,
        }
    }

    /// Read up to `dest.len()` decompressed bytes.
    ///
    /// Returns the number of bytes written to the front of `dest`. A short
    /// count only happens at end-of-stream, and `0` means the stream is
    /// exhausted (or `dest` is empty).
    ///
    /// # Errors
    ///
    /// [`ReaderError::Init`], [`ReaderError::SourceRead`] or
    /// [`ReaderError::Decode`]. All of them are fatal for this reader.
    pub fn read_block(&mut self, dest: &mut [u8]) -> Result<usize, ReaderError> {
        let size = dest.len();
        self.read_internal(dest, size, None)
    }

    /// Read one decompressed byte, or `None` at end-of-stream.
    ///
    /// # Errors
    ///
    /// Same as [`read_block`](Self::read_block).
    pub fn read_byte(&mut self) -> Result<Option<u8>, ReaderError> {
        let mut byte = [0u8; 1];
        match self.read_block(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Read one line into `dest`.
    ///
    /// `dest` is zero-filled, then receives the bytes up to and including
    /// the next [`EOL`], or as many as fit in `dest.len() - 1` bytes if the
    /// line is longer. The last slot is always left as a NUL terminator.
    /// The rest of a truncated line is returned by the next call.
    ///
    /// Returns the line content (without the terminator), or `None` once
    /// the stream is exhausted. A `dest` shorter than two bytes has no room
    /// for content and always yields `None`.
    ///
    /// # Errors
    ///
    /// Same as [`read_block`](Self::read_block).
    pub fn read_line<'a>(&mut self, dest: &'a mut [u8]) -> Result<Option<&'a [u8]>, ReaderError> {
        dest.fill(0);
        let size = dest.len();
        let Some(room) = size.checked_sub(1) else {
            return Ok(None);
        };

        let delivered = self.read_internal(&mut dest[..room], size, Some(EOL))?;
        let line: &'a [u8] = dest;
        Ok((delivered > 0).then_some(&line[..delivered]))
    }

    /// Close the source and release the decoder and buffers.
    ///
    /// # Errors
    ///
    /// [`ReaderError::Close`] if the source fails to close. The decoder and
    /// buffers are released either way.
    pub fn close(self) -> Result<(), ReaderError> {
        let Self { source, engine, .. } = self;
        if let Some(engine) = engine {
            debug!(
                "releasing decoder (scratch {} bytes, saved {} of {} bytes)",
                engine.scratch.len(),
                engine.saved.len(),
                engine.saved.capacity()
            );
        }
        source.close().map_err(ReaderError::Close)
    }

    /// Whether the decoder and buffers have been created.
    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    /// Decompressed bytes waiting in the carry-over buffer.
    pub fn saved_len(&self) -> usize {
        self.engine.as_ref().map_or(0, |engine| engine.saved.len())
    }

    /// Current carry-over buffer capacity; `0` before initialization.
    pub fn saved_capacity(&self) -> usize {
        self.engine.as_ref().map_or(0, |engine| engine.saved.capacity())
    }

    /// Current scratch buffer capacity; `0` before initialization.
    pub fn scratch_capacity(&self) -> usize {
        self.engine.as_ref().map_or(0, |engine| engine.scratch.len())
    }

    /// Acquire a reference to the underlying byte source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Shared body of all three primitives.
    ///
    /// `size` is the caller's declared buffer size, used to size buffers on
    /// first use. `dest` is the region that may actually be written.
    fn read_internal(
        &mut self,
        dest: &mut [u8],
        size: usize,
        stop_at: Option<u8>,
    ) -> Result<usize, ReaderError> {
        if dest.is_empty() {
            return Ok(0);
        }

        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => Engine::start(&mut self.factory, &self.config, size)?,
        };
        let engine = self.engine.insert(engine);
        engine.read(&mut self.source, &self.config, dest, stop_at)
    }
}

impl<S: ByteSource, F: DecoderFactory> Read for CompressedFile<S, F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_block(buf).map_err(|e| match e {
            ReaderError::SourceRead(io) => io,
            other => io::Error::other(other),
        })
    }
}

/// Decoder state plus both buffers. Exists only once initialized, so the
/// three are always created and dropped together.
struct Engine<D> {
    decoder: D,
    /// Output target for a single decode call.
    scratch: Vec<u8>,
    saved: SavedBuffer,
    /// Raw bytes pulled from the source for the current iteration.
    input: Vec<u8>,
    /// The source returned a short read.
    exhausted: bool,
    /// At least one raw byte has been handed to the decoder.
    fed_any: bool,
    /// The last decoder step that did any work left a frame unfinished.
    frame_open: bool,
}

impl<D: StreamDecoder> Engine<D> {
    fn start<F>(factory: &mut F, config: &ReaderConfig, size: usize) -> Result<Self, ReaderError>
    where
        F: DecoderFactory<Decoder = D>,
    {
        let decoder = factory
            .create()
            .map_err(|e| ReaderError::Init(e.to_string()))?;

        let capacity = size.max(config.header_min.unwrap_or(D::HEADER_SIZE_MAX)).max(1);
        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(capacity)
            .map_err(|e| ReaderError::Init(e.to_string()))?;
        scratch.resize(capacity, 0);
        let saved =
            SavedBuffer::try_with_capacity(capacity).map_err(|e| ReaderError::Init(e.to_string()))?;

        debug!("initialized decoder with {capacity}-byte buffers");
        Ok(Self {
            decoder,
            scratch,
            saved,
            input: Vec::new(),
            exhausted: false,
            fed_any: false,
            frame_open: false,
        })
    }

    fn read<S: ByteSource>(
        &mut self,
        source: &mut S,
        config: &ReaderConfig,
        dest: &mut [u8],
        stop_at: Option<u8>,
    ) -> Result<usize, ReaderError> {
        let room = dest.len();
        if self.scratch.len() < room {
            self.scratch.resize(room, 0);
        }

        let mut out = Delivery::new(dest, stop_at);
        out.drain_saved(&mut self.saved);
        if out.is_satisfied() {
            trace!("served {} bytes from the saved buffer", out.filled);
            return Ok(out.filled);
        }
        debug_assert!(self.saved.is_empty());

        let chunk = config.chunk_size(room);
        while !out.is_satisfied() && !self.exhausted {
            if self.input.len() < chunk {
                self.input.resize(chunk, 0);
            }
            let read = source.read_up_to(&mut self.input[..chunk])?;
            if read < chunk {
                trace!("source exhausted after a {read}-byte read");
                self.exhausted = true;
            }
            self.feed(read, &mut out)?;
        }

        if out.filled == 0 && self.exhausted && self.fed_any && self.frame_open {
            warn!("compressed stream ended in the middle of a frame");
            return Err(ReaderError::Decode("incomplete frame at end of stream".to_string()));
        }

        trace!("delivered {} of {room} bytes", out.filled);
        Ok(out.filled)
    }

    /// Run the first `len` bytes of `input` through the decoder, placing the
    /// output into `out` while it accepts and into the saved buffer after.
    fn feed(&mut self, len: usize, out: &mut Delivery<'_>) -> Result<(), ReaderError> {
        let Self {
            decoder,
            scratch,
            saved,
            input,
            fed_any,
            frame_open,
            ..
        } = self;

        let mut pending = &input[..len];
        let mut flushing = false;
        *fed_any |= !pending.is_empty();

        while !pending.is_empty() || flushing {
            let status = decoder
                .decode(pending, scratch)
                .map_err(|e| ReaderError::Decode(e.to_string()))?;
            let consumed = status.consumed.min(pending.len());
            let produced = status.produced.min(scratch.len());
            trace!("decoder consumed {consumed} and produced {produced} bytes");

            if consumed == 0 && produced == 0 {
                if pending.is_empty() {
                    break;
                }
                return Err(ReaderError::Decode("decoder made no progress".to_string()));
            }

            pending = &pending[consumed..];
            *frame_open = !status.frame_complete;

            let burst = &scratch[..produced];
            let taken = out.accept(burst);
            saved.push(&burst[taken..]);

            // A full scratch buffer may mean the decoder is still holding output.
            flushing = produced == scratch.len();
        }

        Ok(())
    }
}

/// The caller's destination for one read call.
struct Delivery<'a> {
    dest: &'a mut [u8],
    filled: usize,
    stop_at: Option<u8>,
    found: bool,
}

impl<'a> Delivery<'a> {
    fn new(dest: &'a mut [u8], stop_at: Option<u8>) -> Self {
        Self {
            dest,
            filled: 0,
            stop_at,
            found: false,
        }
    }

    fn is_satisfied(&self) -> bool {
        self.found || self.filled == self.dest.len()
    }

    fn drain_saved(&mut self, saved: &mut SavedBuffer) {
        let taken = saved.take_into(&mut self.dest[self.filled..], self.stop_at);
        self.filled += taken;
        if taken > 0 && self.stop_at == Some(self.dest[self.filled - 1]) {
            self.found = true;
        }
    }

    /// Copy the prefix of `burst` that this call may still take.
    ///
    /// Returns how many bytes were taken; the caller keeps the rest.
    fn accept(&mut self, burst: &[u8]) -> usize {
        if self.is_satisfied() {
            return 0;
        }

        let mut take = burst.len().min(self.dest.len() - self.filled);
        if let Some(delim) = self.stop_at
            && let Some(pos) = burst[..take].iter().position(|&b| b == delim)
        {
            take = pos + 1;
            self.found = true;
        }

        self.dest[self.filled..self.filled + take].copy_from_slice(&burst[..take]);
        self.filled += take;
        take
    }
}
