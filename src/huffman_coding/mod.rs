//! The huffman_coding module holds the static Huffman codec used on each
//! chunk of input data.
//!
//! Every chunk is coded independently: its own frequency table, its own
//! tree, its own code table. That is what makes chunks self-contained and
//! lets the orchestrator compress and decompress them in parallel without
//! any shared codec state. The price is one serialized tree per chunk,
//! which is small (at most a few hundred bytes) next to typical chunk
//! sizes.
//!
//! Tree construction is deterministic. Equal-weight nodes are ordered by a
//! secondary key (byte value for leaves, creation order for merged nodes),
//! so two runs over identical input always produce an identical tree and
//! therefore a byte-identical archive.

pub mod huffman;

pub use huffman::{EncodedBlock, Huffman};
