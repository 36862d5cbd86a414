//! The compression module manages the chunked, parallel side of huffzip.
//!
//! Compression happens in the following steps:
//! - Chunking: split the input buffer into fixed-size chunks, final chunk
//!   possibly shorter, ids dense from 0 in split order.
//! - Fan-out: one independent codec task per chunk on the worker pool.
//! - Coding: each task builds that chunk's frequency table, tree, and code
//!   table, packs the code stream, and serializes the tree alongside it.
//! - Collection: results come back keyed by chunk id and are reassembled in
//!   ascending id order into the archive.
//!
//! Decompression runs the same fan-out in reverse. It parallelizes exactly
//! because every encoded chunk is self-contained: its own tree, its own
//! padding, its own original size.

pub mod archive;
pub mod compress;
pub mod decompress;
pub mod parallel;

use crate::error::Result;
use crate::huffman_coding::Huffman;
use crate::tools::chunker;

/// The codec capability the orchestrator fans out over. Any algorithm
/// satisfying this trait can substitute for Huffman without touching the
/// chunking or orchestration layers.
pub trait Compressor {
    /// The self-contained encoded form of one chunk.
    type Encoded: Send + Sync;

    /// Encode one chunk of bytes.
    fn compress(&mut self, chunk: &[u8]) -> Result<Self::Encoded>;

    /// Decode one encoded chunk back to its original bytes.
    fn decompress(&mut self, encoded: &Self::Encoded) -> Result<Vec<u8>>;
}

/// One encoded chunk tagged with the id of the chunk it came from. The id
/// is the sole ordering key for reassembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChunk<E> {
    pub id: u32,
    pub encoded: E,
}

/// Compress a buffer into packed archive bytes. Library-level entry point;
/// the CLI wraps this with file I/O.
pub fn compress_buffer(data: &[u8], chunk_size: usize, threads: usize) -> Result<Vec<u8>> {
    let chunks = chunker::split(data, chunk_size)?;
    let orchestrator = parallel::ParallelCompressor::<Huffman>::new(threads)?;
    let encoded = orchestrator.compress_chunks(chunks)?;
    archive::pack(&encoded)
}

/// Decompress packed archive bytes back to the original buffer.
pub fn decompress_buffer(packed: &[u8], threads: usize) -> Result<Vec<u8>> {
    let encoded = archive::unpack(packed)?;
    let orchestrator = parallel::ParallelCompressor::<Huffman>::new(threads)?;
    orchestrator.decompress_chunks(encoded)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn buffer_roundtrip_test() {
        let data = b"round and round the buffer goes".repeat(50);
        let packed = compress_buffer(&data, 64, 2).unwrap();
        assert_eq!(decompress_buffer(&packed, 2).unwrap(), data);
    }

    #[test]
    fn empty_buffer_roundtrip_test() {
        let packed = compress_buffer(&[], 1024, 2).unwrap();
        assert_eq!(decompress_buffer(&packed, 2).unwrap(), Vec::<u8>::new());
    }
}
