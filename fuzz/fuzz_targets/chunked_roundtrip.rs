#![no_main]

use std::io::Cursor;

use arbitrary::Arbitrary;
use cfr_reader::{CompressedFile, ReadSource, ReaderConfig, ZstdCodec};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Step {
    Block(u8),
    Byte,
    Line(u8),
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    plain: Vec<u8>,
    steps: Vec<Step>,
    min_chunk: u16,
}

// Fuzz target: compress -> read back with a mix of primitives.
//
// Every primitive draws from the same ordered stream, so the concatenation
// of everything delivered must equal the plaintext.
fuzz_target!(|input: FuzzInput| {
    if input.steps.is_empty() {
        return;
    }

    let compressed = zstd::encode_all(&input.plain[..], 1).unwrap();
    let config = ReaderConfig {
        min_chunk_size: usize::from(input.min_chunk),
        ..ReaderConfig::default()
    };
    let source = ReadSource::new(Cursor::new(compressed));
    let mut reader = CompressedFile::from_source(source, ZstdCodec, config);

    let mut out = Vec::new();
    let mut buf = vec![0u8; 257];
    'drain: loop {
        for step in &input.steps {
            let got = match *step {
                Step::Block(size) => {
                    let size = usize::from(size) + 1;
                    let n = reader.read_block(&mut buf[..size]).unwrap();
                    out.extend_from_slice(&buf[..n]);
                    n
                }
                Step::Byte => match reader.read_byte().unwrap() {
                    Some(byte) => {
                        out.push(byte);
                        1
                    }
                    None => 0,
                },
                Step::Line(size) => {
                    let size = usize::from(size) + 2;
                    match reader.read_line(&mut buf[..size]).unwrap() {
                        Some(text) => {
                            out.extend_from_slice(text);
                            text.len()
                        }
                        None => 0,
                    }
                }
            };
            if got == 0 {
                break 'drain;
            }
        }
    }

    assert_eq!(out, input.plain);
    reader.close().unwrap();
});
