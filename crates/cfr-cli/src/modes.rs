//! The three drain loops behind `cfr <MODE>`.
//!
//! Each loop pulls from a [`CompressedFile`] until end-of-stream and
//! writes what it gets to stdout. The reader is closed on every path, and
//! a read failure takes precedence over a close failure in the report.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use cfr_reader::{ByteSource, CompressedFile, DecoderFactory, EOL, ReaderConfig};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Cli, Mode};

/// Open the file named on the command line and drain it in the chosen mode.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, any read fails, stdout
/// cannot be written, or the file fails to close.
pub fn run(cli: &Cli) -> Result<()> {
    let config = ReaderConfig {
        min_chunk_size: cli.chunk,
        ..ReaderConfig::default()
    };
    let mut reader = CompressedFile::open_with(&cli.file, config)
        .with_context(|| format!("cannot open {}", cli.file.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let drained = match cli.mode {
        Mode::Block => {
            let rng = match cli.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            drain_blocks(&mut reader, &mut out, rng, cli.max_block as usize)
        }
        Mode::Byte => drain_bytes(&mut reader, &mut out),
        Mode::Line => drain_lines(&mut reader, &mut out, cli.line_size as usize),
    };
    let flushed = drained.and_then(|total| {
        out.flush().context("cannot write to stdout")?;
        Ok(total)
    });

    let closed = reader
        .close()
        .with_context(|| format!("cannot close {}", cli.file.display()));

    let total = flushed.with_context(|| format!("failed reading {}", cli.file.display()))?;
    closed?;
    debug!("wrote {total} decompressed bytes");
    Ok(())
}

/// Repeated `read_block` calls with sizes drawn from `1..=max_block`.
pub fn drain_blocks<S, F, W, R>(
    reader: &mut CompressedFile<S, F>,
    out: &mut W,
    mut rng: R,
    max_block: usize,
) -> Result<usize>
where
    S: ByteSource,
    F: DecoderFactory,
    W: Write,
    R: Rng,
{
    let mut buf = vec![0u8; max_block];
    let mut total = 0;
    loop {
        let size = rng.gen_range(1..=max_block);
        let n = reader.read_block(&mut buf[..size])?;
        if n == 0 {
            return Ok(total);
        }
        out.write_all(&buf[..n]).context("cannot write to stdout")?;
        total += n;
    }
}

/// Repeated `read_byte` calls.
pub fn drain_bytes<S, F, W>(reader: &mut CompressedFile<S, F>, out: &mut W) -> Result<usize>
where
    S: ByteSource,
    F: DecoderFactory,
    W: Write,
{
    let mut total = 0;
    while let Some(byte) = reader.read_byte()? {
        out.write_all(&[byte]).context("cannot write to stdout")?;
        total += 1;
    }
    Ok(total)
}

/// Repeated `read_line` calls into a `line_size` buffer.
///
/// A fragment that neither fills the buffer nor ends in [`EOL`] is a
/// final line without a line break, which this mode refuses.
pub fn drain_lines<S, F, W>(
    reader: &mut CompressedFile<S, F>,
    out: &mut W,
    line_size: usize,
) -> Result<usize>
where
    S: ByteSource,
    F: DecoderFactory,
    W: Write,
{
    let mut buf = vec![0u8; line_size];
    let mut total = 0;
    while let Some(line) = reader.read_line(&mut buf)? {
        if line.len() < line_size - 1 && !line.contains(&EOL) {
            bail!("unterminated final line ({} bytes)", line.len());
        }
        out.write_all(line).context("cannot write to stdout")?;
        total += line.len();
    }
    Ok(total)
}
