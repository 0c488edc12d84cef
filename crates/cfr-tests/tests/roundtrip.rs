//! Round-trip tests: whatever the chunking, `read_block` reproduces the
//! plaintext in order with no duplication or loss.
//!
//! Request sizes are chosen to land on both sides of the internal buffer
//! sizes (the 18-byte header minimum, zstd's 128 KiB block size), and the
//! property test lets quickcheck pick arbitrary size sequences.

use cfr_reader::{CompressedFile, ReadSource, ReaderConfig, ZstdCodec};
use cfr_tests::{compress, drain_blocks, memory_reader, noise, reader_for, text_lines};
use partial_io::{PartialOp, PartialRead};
use quickcheck::{QuickCheck, TestResult};

#[test]
fn one_byte_at_a_time() {
    let plain = text_lines(100, 1);
    let mut reader = reader_for(&plain);
    let mut out = Vec::new();
    while let Some(byte) = reader.read_byte().unwrap() {
        out.push(byte);
    }
    assert_eq!(out, plain);
}

#[test]
fn one_giant_read() {
    let plain = noise(200_000, 5);
    let mut reader = reader_for(&plain);
    let mut buf = vec![0u8; 1 << 20];

    let n = reader.read_block(&mut buf).unwrap();
    assert_eq!(n, plain.len());
    assert_eq!(&buf[..n], &plain[..]);
    assert_eq!(reader.read_block(&mut buf).unwrap(), 0);
}

#[test]
fn sizes_around_buffer_boundaries() {
    let plain = noise(400_000, 11);
    for sizes in [
        &[17, 18, 19][..],
        &[1, 4096, 3],
        &[128 * 1024 - 1, 1, 128 * 1024 + 1],
        &[100_000],
    ] {
        let mut reader = reader_for(&plain);
        let out = drain_blocks(&mut reader, sizes).unwrap();
        assert_eq!(out.len(), plain.len(), "sizes {sizes:?}");
        assert!(out == plain, "content mismatch for sizes {sizes:?}");
    }
}

#[test]
fn concatenated_frames_read_as_one_stream() {
    let first = text_lines(50, 2);
    let second = noise(5_000, 8);
    let mut compressed = compress(&first);
    compressed.extend(compress(&second));

    let mut reader = memory_reader(compressed);
    let out = drain_blocks(&mut reader, &[13, 2, 77]).unwrap();
    assert_eq!(out, [first, second].concat());
}

#[test]
fn growing_requests_after_small_ones() {
    // A burst of small reads first, then a large one that must grow the
    // scratch buffer past its initial size.
    let plain = noise(50_000, 21);
    let mut reader = reader_for(&plain);
    let mut out = Vec::new();

    let mut small = [0u8; 3];
    for _ in 0..10 {
        let n = reader.read_block(&mut small).unwrap();
        out.extend_from_slice(&small[..n]);
    }
    let initial = reader.scratch_capacity();

    let mut large = vec![0u8; 40_000];
    let n = reader.read_block(&mut large).unwrap();
    out.extend_from_slice(&large[..n]);
    assert!(reader.scratch_capacity() > initial);

    out.extend(drain_blocks(&mut reader, &[4096]).unwrap());
    assert_eq!(out, plain);
}

#[test]
fn short_reads_from_the_source_are_absorbed() {
    let plain = text_lines(300, 4);
    let ops = std::iter::repeat_n(PartialOp::Limited(1), 64)
        .chain([PartialOp::Err(std::io::ErrorKind::Interrupted), PartialOp::Limited(3)])
        .collect::<Vec<_>>();
    let source = ReadSource::new(PartialRead::new(std::io::Cursor::new(compress(&plain)), ops));
    let mut reader = CompressedFile::from_source(source, ZstdCodec, ReaderConfig::default());

    let mut out = Vec::new();
    let mut buf = [0u8; 9];
    loop {
        let n = reader.read_block(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    assert_eq!(out, plain);
}

#[test]
fn arbitrary_chunking_reconstructs_plaintext() {
    fn prop(plain: Vec<u8>, sizes: Vec<u8>) -> TestResult {
        let sizes: Vec<usize> = sizes.into_iter().map(|s| usize::from(s) % 64 + 1).collect();
        if sizes.is_empty() {
            return TestResult::discard();
        }

        let mut reader = reader_for(&plain);
        match drain_blocks(&mut reader, &sizes) {
            Ok(out) => TestResult::from_bool(out == plain),
            Err((_, e)) => TestResult::error(e.to_string()),
        }
    }

    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(Vec<u8>, Vec<u8>) -> TestResult);
}
