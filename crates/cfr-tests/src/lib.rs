//! Shared fixtures for the cfr integration tests and benchmarks.
//!
//! Every fixture is generated at run time: plaintext is either literal or
//! produced by a seeded RNG, and compressed with `zstd::encode_all`, so no
//! binary golden files are checked in.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use cfr_reader::{CompressedFile, ReadSource, ReaderConfig, ReaderError, ZstdCodec};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A reader over an in-memory compressed buffer.
pub type MemoryReader = CompressedFile<ReadSource<Cursor<Vec<u8>>>, ZstdCodec>;

/// Compress `plain` into a single zstd frame.
pub fn compress(plain: &[u8]) -> Vec<u8> {
    zstd::encode_all(plain, 3).expect("zstd compression of an in-memory buffer")
}

/// Build a reader over already-compressed bytes.
pub fn memory_reader(compressed: Vec<u8>) -> MemoryReader {
    CompressedFile::from_source(
        ReadSource::new(Cursor::new(compressed)),
        ZstdCodec,
        ReaderConfig::default(),
    )
}

/// Compress `plain` and build a reader over the result.
pub fn reader_for(plain: &[u8]) -> MemoryReader {
    memory_reader(compress(plain))
}

/// `len` bytes of seeded pseudo-random data.
pub fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.r#gen::<u8>()).collect()
}

/// Newline-separated text with lines of varying length.
pub fn text_lines(count: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::new();
    for i in 0..count {
        let width = rng.gen_range(0..200);
        out.extend((0..width).map(|j| b'a' + ((i + j) % 26) as u8));
        out.push(b'\n');
    }
    out
}

/// Drain `reader` with `read_block`, cycling through `sizes`.
///
/// # Errors
///
/// Returns the first error the reader reports, together with everything
/// delivered before it.
pub fn drain_blocks<F>(
    reader: &mut CompressedFile<ReadSource<Cursor<Vec<u8>>>, F>,
    sizes: &[usize],
) -> Result<Vec<u8>, (Vec<u8>, ReaderError)>
where
    F: cfr_reader::DecoderFactory,
{
    let mut out = Vec::new();
    let mut buf = vec![0u8; sizes.iter().copied().max().unwrap_or(1)];
    for &size in sizes.iter().cycle() {
        match reader.read_block(&mut buf[..size]) {
            Ok(0) => return Ok(out),
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(e) => return Err((out, e)),
        }
    }
    Ok(out)
}

/// Drain `reader` with `read_line` into a `size`-byte buffer, returning
/// every fragment in order.
pub fn drain_lines(reader: &mut MemoryReader, size: usize) -> Vec<Vec<u8>> {
    let mut buf = vec![0u8; size];
    let mut lines = Vec::new();
    while let Some(line) = reader.read_line(&mut buf).expect("read_line") {
        lines.push(line.to_vec());
    }
    lines
}

/// Write `plain`, compressed, to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, plain: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, compress(plain)).expect("write compressed fixture");
    path
}
