#![no_main]

use std::io::Cursor;

use cfr_reader::{CompressedFile, ReadSource, ReaderConfig, ZstdCodec};
use libfuzzer_sys::fuzz_target;

// Fuzz target: arbitrary bytes presented as a compressed stream.
//
// Input format:
//   byte 0: request size for read_block (1..=256)
//   byte 1: line buffer size for read_line (2..=257)
//   bytes 2..: compressed stream
//
// Catches bugs in:
// - Decoder errors escaping as panics
// - Saved buffer bookkeeping on partial frames
// - Delivered byte counts exceeding the request
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let block = usize::from(data[0]) + 1;
    let line = usize::from(data[1]) + 2;
    let source = ReadSource::new(Cursor::new(data[2..].to_vec()));
    let mut reader = CompressedFile::from_source(source, ZstdCodec, ReaderConfig::default());

    let mut block_buf = vec![0u8; block];
    let mut line_buf = vec![0u8; line];
    for _ in 0..64 {
        match reader.read_block(&mut block_buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => assert!(n <= block),
        }
        match reader.read_line(&mut line_buf) {
            Ok(Some(text)) => assert!(text.len() < line),
            Ok(None) | Err(_) => break,
        }
    }
    let _ = reader.close();
});
