//! Splits an input buffer into the ordered, fixed-size chunks the worker
//! pool compresses independently.

use crate::error::{HuffzipError, Result};

/// A contiguous slice of the original buffer, compressed independently.
/// Created by split(), consumed by exactly one compress task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Ordinal index, 0-based and dense, assigned in split order. The sole
    /// reassembly key.
    pub id: u32,
    /// The chunk's bytes.
    pub data: Vec<u8>,
    /// Byte length before compression. Always equals data.len().
    pub original_size: usize,
}

/// Split a buffer into ceil(len / chunk_size) chunks. Chunk `i` covers
/// `[i*chunk_size, min((i+1)*chunk_size, len))`; the final chunk may be
/// shorter but is never empty. An empty buffer yields no chunks, which is
/// valid, not an error. Pure function of its inputs.
pub fn split(input: &[u8], chunk_size: usize) -> Result<Vec<Chunk>> {
    if chunk_size == 0 {
        return Err(HuffzipError::InvalidConfiguration(
            "chunk size must be at least 1 byte".to_string(),
        ));
    }
    chunk_count(input.len(), chunk_size)?;

    Ok(input
        .chunks(chunk_size)
        .enumerate()
        .map(|(i, data)| Chunk {
            id: i as u32,
            data: data.to_vec(),
            original_size: data.len(),
        })
        .collect())
}

/// Number of chunks a buffer of `len` bytes splits into. Ids are 32 bit,
/// so a count past u32::MAX would wrap into duplicates; refuse it up front.
fn chunk_count(len: usize, chunk_size: usize) -> Result<u32> {
    let count = len.div_ceil(chunk_size);
    u32::try_from(count).map_err(|_| {
        HuffzipError::InvalidConfiguration(format!(
            "{} chunks exceed the 32 bit chunk id range",
            count
        ))
    })
}
