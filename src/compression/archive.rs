//! The archive wire format: a signature, a chunk count, and the encoded
//! chunks in ascending id order.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! header:    "hfz1"  chunk_count: u32
//! per chunk: id: u32  serialized_tree  padding: u8
//!            original_size: u32  bits_len: u32  packed_bits
//! ```
//!
//! The serialized tree is self-delimiting (its markers describe their own
//! extent), so no length prefix precedes it; the packed bit buffer is not,
//! so `bits_len` is stored ahead of it. Chunk ids are dense and ascending
//! from 0; unpack rejects any other sequence.

use log::error;

use super::EncodedChunk;
use crate::error::{HuffzipError, Result};
use crate::huffman_coding::huffman::{EMPTY_MARKER, INTERNAL_MARKER, LEAF_MARKER};
use crate::huffman_coding::EncodedBlock;

/// Stream signature, checked before anything else on unpack.
const MAGIC: [u8; 4] = *b"hfz1";

/// Serialize an archive into its on-disk byte form. Fails when a count or
/// length cannot be represented in its fixed-width field.
pub fn pack(archive: &[EncodedChunk<EncodedBlock>]) -> Result<Vec<u8>> {
    let count = u32::try_from(archive.len()).map_err(|_| {
        HuffzipError::InvalidConfiguration(format!(
            "{} chunks exceed the 32 bit chunk id range",
            archive.len()
        ))
    })?;

    let payload: usize = archive
        .iter()
        .map(|c| 13 + c.encoded.tree.len() + c.encoded.bits.len())
        .sum();
    let mut out = Vec::with_capacity(8 + payload);

    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&count.to_le_bytes());
    for chunk in archive {
        let bits_len = u32::try_from(chunk.encoded.bits.len()).map_err(|_| {
            HuffzipError::InvalidConfiguration(
                "chunk code stream exceeds the 32 bit length field".to_string(),
            )
        })?;
        out.extend_from_slice(&chunk.id.to_le_bytes());
        out.extend_from_slice(&chunk.encoded.tree);
        out.push(chunk.encoded.padding);
        out.extend_from_slice(&chunk.encoded.original_size.to_le_bytes());
        out.extend_from_slice(&bits_len.to_le_bytes());
        out.extend_from_slice(&chunk.encoded.bits);
    }
    Ok(out)
}

/// Parse on-disk bytes back into an archive. Every truncation, overrun, or
/// marker violation is a `CorruptStream`.
pub fn unpack(buf: &[u8]) -> Result<Vec<EncodedChunk<EncodedBlock>>> {
    let mut pos = 0;

    let magic = take(buf, &mut pos, 4)?;
    if magic != MAGIC {
        error!("Input is not a huffzip archive.");
        return Err(HuffzipError::CorruptStream(
            "missing archive signature".to_string(),
        ));
    }
    let count = read_u32(buf, &mut pos)? as usize;

    let mut archive = Vec::with_capacity(count);
    for i in 0..count {
        let id = read_u32(buf, &mut pos)?;
        // Ids are dense and ascending from 0 by construction; anything
        // else (duplicates included) is a malformed archive.
        if id != i as u32 {
            return Err(HuffzipError::CorruptStream(format!(
                "chunk id {} out of sequence (expected {})",
                id, i
            )));
        }

        let tree_len = tree_span(&buf[pos..])?;
        let tree = buf[pos..pos + tree_len].to_vec();
        pos += tree_len;

        let padding = *take(buf, &mut pos, 1)?.first().ok_or_else(truncated)?;
        let original_size = read_u32(buf, &mut pos)?;
        let bits_len = read_u32(buf, &mut pos)? as usize;
        let bits = take(buf, &mut pos, bits_len)?.to_vec();

        archive.push(EncodedChunk {
            id,
            encoded: EncodedBlock {
                tree,
                padding,
                original_size,
                bits,
            },
        });
    }

    if pos != buf.len() {
        return Err(HuffzipError::CorruptStream(
            "trailing bytes after final chunk".to_string(),
        ));
    }
    Ok(archive)
}

/// Measure the extent of a serialized tree without building it: walk the
/// markers, tracking how many subtrees remain unparsed.
fn tree_span(buf: &[u8]) -> Result<usize> {
    if buf.first() == Some(&EMPTY_MARKER) {
        return Ok(1);
    }
    let mut pending = 1_usize; // subtrees still expected
    let mut pos = 0;
    while pending > 0 {
        match buf.get(pos) {
            Some(&INTERNAL_MARKER) => {
                // consumes one expected subtree, adds two children
                pending += 1;
                pos += 1;
            }
            Some(&LEAF_MARKER) => {
                if buf.len() < pos + 2 {
                    return Err(truncated());
                }
                pending -= 1;
                pos += 2;
            }
            Some(&marker) => {
                return Err(HuffzipError::CorruptStream(format!(
                    "unknown tree node marker {:#04x}",
                    marker
                )))
            }
            None => return Err(truncated()),
        }
        // More subtrees outstanding than a 256 symbol tree can produce
        // means the markers are garbage; stop before scanning the whole
        // buffer as a "tree".
        if pending > 256 {
            return Err(HuffzipError::CorruptStream(
                "serialized tree wider than a 256 symbol alphabet allows".to_string(),
            ));
        }
    }
    Ok(pos)
}

fn take<'a>(buf: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = pos.checked_add(len).ok_or_else(truncated)?;
    let slice = buf.get(*pos..end).ok_or_else(truncated)?;
    *pos = end;
    Ok(slice)
}

fn read_u32(buf: &[u8], pos: &mut usize) -> Result<u32> {
    let bytes = take(buf, pos, 4)?;
    Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
}

fn truncated() -> HuffzipError {
    HuffzipError::CorruptStream("archive truncated".to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::Compressor;
    use crate::huffman_coding::Huffman;

    fn sample_archive() -> Vec<EncodedChunk<EncodedBlock>> {
        [b"first chunk of data".as_slice(), b"second", b""]
            .iter()
            .enumerate()
            .map(|(i, chunk)| EncodedChunk {
                id: i as u32,
                encoded: Huffman::new().compress(chunk).unwrap(),
            })
            .collect()
    }

    #[test]
    fn pack_unpack_roundtrip() {
        let archive = sample_archive();
        let packed = pack(&archive).unwrap();
        assert_eq!(unpack(&packed).unwrap(), archive);
    }

    #[test]
    fn empty_archive_roundtrip() {
        let packed = pack(&[]).unwrap();
        assert_eq!(packed.len(), 8);
        assert!(unpack(&packed).unwrap().is_empty());
    }

    #[test]
    fn bad_magic_rejected() {
        let mut packed = pack(&sample_archive()).unwrap();
        packed[0] = b'x';
        assert!(matches!(
            unpack(&packed),
            Err(HuffzipError::CorruptStream(_))
        ));
    }

    #[test]
    fn truncation_rejected() {
        let packed = pack(&sample_archive()).unwrap();
        for end in [3, 7, 10, packed.len() - 1] {
            assert!(unpack(&packed[..end]).is_err());
        }
    }

    #[test]
    fn trailing_garbage_rejected() {
        let mut packed = pack(&sample_archive()).unwrap();
        packed.push(0);
        assert!(unpack(&packed).is_err());
    }

    #[test]
    fn out_of_sequence_ids_rejected() {
        // duplicate id
        let mut archive = sample_archive();
        archive[1].id = 0;
        assert!(matches!(
            unpack(&pack(&archive).unwrap()),
            Err(HuffzipError::CorruptStream(_))
        ));

        // ids present but not ascending from 0
        let mut archive = sample_archive();
        archive.swap(0, 1);
        assert!(matches!(
            unpack(&pack(&archive).unwrap()),
            Err(HuffzipError::CorruptStream(_))
        ));
    }

    #[test]
    fn tree_span_test() {
        // internal(leaf 'a', leaf 'b')
        assert_eq!(tree_span(&[0x00, 0x01, b'a', 0x01, b'b']).unwrap(), 5);
        // lone leaf
        assert_eq!(tree_span(&[0x01, b'z']).unwrap(), 2);
        // empty tree marker
        assert_eq!(tree_span(&[0x02]).unwrap(), 1);
        // truncated internal node
        assert!(tree_span(&[0x00, 0x01, b'a']).is_err());
    }
}
