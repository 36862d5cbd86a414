//! The parallel orchestrator: a fixed-size worker pool that fans chunk
//! codec tasks out and reassembles results in chunk-id order.

use std::marker::PhantomData;

use log::{debug, info};
use rayon::prelude::*;

use super::{Compressor, EncodedChunk};
use crate::error::{HuffzipError, Result};
use crate::tools::chunker::Chunk;

/// Owns the worker pool and dispatches one independent codec instance per
/// chunk. Tasks share no mutable state: each owns its chunk and a fresh
/// codec, and publishes its result into its own output slot. Ordering is
/// re-established at collection time only; nothing is guaranteed during
/// dispatch. The calling thread blocks until every task completes.
pub struct ParallelCompressor<C> {
    pool: rayon::ThreadPool,
    codec: PhantomData<C>,
}

impl<C> ParallelCompressor<C>
where
    C: Compressor + Default,
{
    /// Build an orchestrator over a pool of `threads` workers. Pass the
    /// machine's available parallelism for the usual default.
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(HuffzipError::InvalidConfiguration(
                "worker pool size must be at least 1".to_string(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| HuffzipError::TaskFailure(e.to_string()))?;
        debug!("Worker pool ready with {} threads", threads);
        Ok(Self {
            pool,
            codec: PhantomData,
        })
    }

    /// Compress every chunk on the pool and return the archive in ascending
    /// id order. The first failing chunk (by id) fails the whole call; no
    /// partial archive is returned.
    pub fn compress_chunks(&self, chunks: Vec<Chunk>) -> Result<Vec<EncodedChunk<C::Encoded>>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }
        info!("Compressing {} chunks", chunks.len());

        // The indexed parallel collect keeps results in input order, which
        // is ascending id order straight from the chunker.
        let results: Vec<Result<EncodedChunk<C::Encoded>>> = self.pool.install(|| {
            chunks
                .into_par_iter()
                .map(|chunk| {
                    let mut codec = C::default();
                    let encoded = codec.compress(&chunk.data)?;
                    Ok(EncodedChunk {
                        id: chunk.id,
                        encoded,
                    })
                })
                .collect()
        });

        // Scan in id order so the reported failure is the first one.
        results.into_iter().collect()
    }

    /// Decode every chunk on the pool and concatenate the outputs in
    /// ascending id order to reproduce the original buffer.
    pub fn decompress_chunks(&self, mut archive: Vec<EncodedChunk<C::Encoded>>) -> Result<Vec<u8>> {
        if archive.is_empty() {
            return Ok(Vec::new());
        }
        info!("Decompressing {} chunks", archive.len());

        // The id is the sole ordering key, whatever order the chunks
        // arrived in.
        archive.sort_by_key(|chunk| chunk.id);

        let results: Vec<Result<Vec<u8>>> = self.pool.install(|| {
            archive
                .par_iter()
                .map(|chunk| {
                    let mut codec = C::default();
                    codec.decompress(&chunk.encoded)
                })
                .collect()
        });

        let mut out = Vec::new();
        for decoded in results {
            out.extend(decoded?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::huffman_coding::Huffman;
    use crate::tools::chunker::split;

    #[test]
    fn zero_threads_rejected() {
        assert!(matches!(
            ParallelCompressor::<Huffman>::new(0),
            Err(HuffzipError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn no_chunks_no_tasks() {
        let orchestrator = ParallelCompressor::<Huffman>::new(2).unwrap();
        assert!(orchestrator.compress_chunks(Vec::new()).unwrap().is_empty());
        assert!(orchestrator.decompress_chunks(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn ids_ascend_in_archive() {
        let data: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
        let orchestrator = ParallelCompressor::<Huffman>::new(4).unwrap();
        let archive = orchestrator
            .compress_chunks(split(&data, 512).unwrap())
            .unwrap();
        for (i, chunk) in archive.iter().enumerate() {
            assert_eq!(chunk.id, i as u32);
        }
    }

    #[test]
    fn reassembly_follows_ids_not_arrival() {
        let data = b"abcdefghijklmnopqrstuvwxyz".repeat(40);
        let orchestrator = ParallelCompressor::<Huffman>::new(2).unwrap();
        let mut archive = orchestrator
            .compress_chunks(split(&data, 100).unwrap())
            .unwrap();
        archive.reverse();
        assert_eq!(orchestrator.decompress_chunks(archive).unwrap(), data);
    }

    #[test]
    fn pool_size_does_not_change_output() {
        let data = b"determinism across pool sizes".repeat(100);
        let chunks = |n| {
            let orchestrator = ParallelCompressor::<Huffman>::new(n).unwrap();
            orchestrator.compress_chunks(split(&data, 64).unwrap()).unwrap()
        };
        let one = chunks(1);
        let four = chunks(4);
        assert_eq!(one, four);
    }

    #[test]
    fn corrupt_chunk_fails_whole_call() {
        let data = b"some data worth keeping intact".repeat(20);
        let orchestrator = ParallelCompressor::<Huffman>::new(2).unwrap();
        let mut archive = orchestrator
            .compress_chunks(split(&data, 64).unwrap())
            .unwrap();
        archive[1].encoded.tree = vec![0x07];
        assert!(matches!(
            orchestrator.decompress_chunks(archive),
            Err(HuffzipError::CorruptStream(_))
        ));
    }
}
