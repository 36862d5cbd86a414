//! huffzip: a chunked, parallel, static Huffman compressor.
//!
//! The input buffer is split into fixed-size chunks, each chunk is
//! Huffman-coded independently on a pool of worker threads, and the encoded
//! chunks are reassembled into an archive in chunk-id order. Every chunk
//! carries its own serialized code tree, so decompression fans out over the
//! same pool with no shared state between tasks.
//!
//! Basic usage to compress a file:
//!
//! `$> huffzip test.txt`
//!
//! This creates test.txt.hfz; `huffzip -d test.txt.hfz` restores the
//! original. Library users can call [`compression::compress_buffer`] and
//! [`compression::decompress_buffer`] directly.

pub mod bitstream;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;
