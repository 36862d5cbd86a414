//! Bit-level packing and unpacking for the chunk code streams.
//!
//! Huffman codes are variable length, so encoded chunks are assembled and
//! consumed a bit at a time, most significant bit first within each byte.
//! The packer reports how many unused low-order bits pad the final byte so
//! the reader can stop exactly where the code stream ends.

pub mod bitpacker;
pub mod bitreader;
