#![warn(clippy::pedantic)]
//! File-like reads over zstd-compressed streams.
//!
//! [`CompressedFile`] exposes block, byte and line reads over a compressed
//! file, carrying decoded-but-undelivered bytes across calls so callers
//! never see codec frame boundaries.

pub mod codec;
pub mod config;
pub mod error;
pub mod reader;
pub mod source;

mod saved;

pub use codec::{DecodeStatus, DecoderFactory, StreamDecoder, ZstdCodec, ZstdDecoder};
pub use config::ReaderConfig;
pub use error::ReaderError;
pub use reader::{CompressedFile, EOL};
pub use source::{ByteSource, FileSource, ReadSource};
