use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::trace;
use rustc_hash::FxHashMap;

use crate::bitstream::bitpacker::BitPacker;
use crate::bitstream::bitreader::BitReader;
use crate::compression::Compressor;
use crate::error::{HuffzipError, Result};

/// Serialized tree marker: internal node, followed by left then right subtree.
pub(crate) const INTERNAL_MARKER: u8 = 0x00;
/// Serialized tree marker: leaf node, followed by the raw byte value.
pub(crate) const LEAF_MARKER: u8 = 0x01;
/// Serialized tree marker: no tree at all (empty chunk).
pub(crate) const EMPTY_MARKER: u8 = 0x02;

/// Maximum plausible tree depth. A tree over a 256 symbol alphabet has at
/// most 255 internal levels; anything deeper in a serialized tree is
/// corrupt data, not a tree.
const MAX_DEPTH: usize = 255;

/// Handle into the node arena.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeData {
    /// Internal node: left and right child handles.
    Kids(NodeId, NodeId),
    /// Leaf node: the byte value it codes.
    Leaf(u8),
}

/// One node of the Huffman tree. Nodes live in the codec's arena and refer
/// to each other by handle, so the whole tree drops with its codec.
#[derive(Debug, Clone, Copy)]
pub struct Node {
    pub weight: u64,
    pub node_data: NodeData,
}

/// A bit code for one byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    /// Code bits, right-aligned.
    pub bits: u64,
    /// Code length in bits (1-64).
    pub len: u8,
}

/// One chunk's worth of encoded output. Self-contained: decoding needs
/// nothing but this struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBlock {
    /// Compact preorder encoding of the Huffman tree.
    pub tree: Vec<u8>,
    /// Unused low-order bits in the final byte of `bits` (0-7).
    pub padding: u8,
    /// Byte length of the chunk before compression.
    pub original_size: u32,
    /// The bit-packed code stream.
    pub bits: Vec<u8>,
}

/// Static Huffman codec for a single chunk. One instance per parallel task;
/// nothing here is shared across chunks or threads.
pub struct Huffman {
    /// Arena owning every node created during construction.
    nodes: Vec<Node>,
    /// Handle of the tree root, if a tree has been built.
    root: Option<NodeId>,
    /// Code table indexed by byte value. None for bytes absent from the chunk.
    codes: Vec<Option<Code>>,
}

impl Huffman {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            codes: vec![None; 256],
        }
    }

    /// Count occurrences of each byte value in the chunk. Bytes that do not
    /// occur are absent from the table.
    pub fn build_frequency_table(chunk: &[u8]) -> FxHashMap<u8, u64> {
        let mut freqs = FxHashMap::default();
        freqs.reserve(256);
        for &byte in chunk {
            *freqs.entry(byte).or_insert(0) += 1;
        }
        freqs
    }

    fn alloc(&mut self, weight: u64, node_data: NodeData) -> NodeId {
        self.nodes.push(Node { weight, node_data });
        self.nodes.len() - 1
    }

    /// Build the Huffman tree from a frequency table by repeatedly merging
    /// the two lightest nodes. The heap orders on (weight, seq) where seq is
    /// the byte value for leaves and 256 + creation order for merged nodes,
    /// which makes the build fully deterministic. The first node popped
    /// becomes the left child.
    pub fn build_tree(&mut self, freqs: &FxHashMap<u8, u64>) {
        self.nodes.clear();
        self.root = None;

        // Hash map iteration order is not stable, so sort the symbols first.
        let mut symbols: Vec<(u8, u64)> = freqs.iter().map(|(&b, &f)| (b, f)).collect();
        symbols.sort_unstable_by_key(|&(byte, _)| byte);

        let mut heap: BinaryHeap<Reverse<(u64, u32, NodeId)>> = BinaryHeap::new();
        for (byte, freq) in symbols {
            let id = self.alloc(freq, NodeData::Leaf(byte));
            heap.push(Reverse((freq, byte as u32, id)));
        }

        // Empty chunk: no symbols, no tree.
        if heap.is_empty() {
            return;
        }

        let mut next_seq = 256_u32;
        while heap.len() > 1 {
            let Reverse((left_weight, _, left)) = heap.pop().unwrap();
            let Reverse((right_weight, _, right)) = heap.pop().unwrap();
            let weight = left_weight + right_weight;
            let id = self.alloc(weight, NodeData::Kids(left, right));
            heap.push(Reverse((weight, next_seq, id)));
            next_seq += 1;
        }

        let Reverse((_, _, root)) = heap.pop().unwrap();
        self.root = Some(root);
        trace!(
            "Built tree: {} nodes, root weight {}",
            self.nodes.len(),
            self.nodes[root].weight
        );
    }

    /// Generate the code table by depth-first traversal: left edge appends
    /// a 0, right edge appends a 1, codes recorded at leaves only.
    pub fn generate_codes(&mut self) {
        self.codes = vec![None; 256];
        let root = match self.root {
            Some(root) => root,
            None => return,
        };
        // A lone leaf is the whole tree; an empty code is invalid, so the
        // single symbol gets the one-bit code "0".
        if let NodeData::Leaf(byte) = self.nodes[root].node_data {
            self.codes[byte as usize] = Some(Code { bits: 0, len: 1 });
            return;
        }
        self.assign_codes(root, 0, 0);
    }

    // The accumulated code travels by value, so each branch backtracks for
    // free when the call returns.
    fn assign_codes(&mut self, id: NodeId, bits: u64, len: u8) {
        match self.nodes[id].node_data {
            NodeData::Leaf(byte) => self.codes[byte as usize] = Some(Code { bits, len }),
            NodeData::Kids(left, right) => {
                self.assign_codes(left, bits << 1, len + 1);
                self.assign_codes(right, (bits << 1) | 1, len + 1);
            }
        }
    }

    /// Look up the code for a byte value, if the byte occurred in the chunk
    /// this codec was built from.
    pub fn code_for(&self, byte: u8) -> Option<Code> {
        self.codes[byte as usize]
    }

    /// Pack the chunk's bytes into a code stream. Returns the packed bytes
    /// and the padding count of the final byte.
    pub fn encode_data(&self, chunk: &[u8]) -> Result<(Vec<u8>, u8)> {
        let mut packer = BitPacker::new(chunk.len());
        for &byte in chunk {
            let code = self.codes[byte as usize].ok_or_else(|| {
                HuffzipError::TaskFailure(format!("byte {:#04x} missing from code table", byte))
            })?;
            packer.push_bits(code.bits, code.len);
        }
        packer.flush();
        Ok((packer.output, packer.padding))
    }

    /// Walk the packed bit buffer through the tree, emitting a byte each
    /// time a leaf is reached, until `original_size` bytes are out. The
    /// trailing `padding` bits carry no symbol and must be exactly the
    /// declared count, or the stream is corrupt.
    pub fn decode_data(&self, block: &EncodedBlock) -> Result<Vec<u8>> {
        let original_size = block.original_size as usize;

        let root = match self.root {
            Some(root) => root,
            None => {
                // An absent tree codes nothing; any bits or padding
                // alongside it are not a valid empty chunk.
                return if original_size == 0 && block.bits.is_empty() && block.padding == 0 {
                    Ok(Vec::new())
                } else {
                    Err(HuffzipError::CorruptStream(
                        "payload alongside an absent tree".to_string(),
                    ))
                }
            }
        };

        if block.padding > 7 {
            return Err(HuffzipError::CorruptStream(format!(
                "padding {} out of range",
                block.padding
            )));
        }
        let total_bits = block.bits.len() * 8;
        if (block.padding as usize) > total_bits {
            return Err(HuffzipError::CorruptStream(
                "padding exceeds bit buffer".to_string(),
            ));
        }
        let usable_bits = total_bits - block.padding as usize;

        let mut out = Vec::with_capacity(original_size);
        let mut reader = BitReader::new(&block.bits);

        while out.len() < original_size {
            let mut id = root;
            loop {
                match self.nodes[id].node_data {
                    NodeData::Leaf(byte) => {
                        // A lone-leaf tree still costs one bit per symbol.
                        if id == root {
                            if reader.consumed() >= usable_bits || reader.bit().is_none() {
                                return Err(exhausted(out.len(), original_size));
                            }
                        }
                        out.push(byte);
                        break;
                    }
                    NodeData::Kids(left, right) => {
                        if reader.consumed() >= usable_bits {
                            return Err(exhausted(out.len(), original_size));
                        }
                        let right_edge = match reader.bool_bit() {
                            Some(bit) => bit,
                            None => return Err(exhausted(out.len(), original_size)),
                        };
                        id = if right_edge { right } else { left };
                    }
                }
            }
        }

        if reader.consumed() != usable_bits {
            return Err(HuffzipError::CorruptStream(format!(
                "{} bits left over beyond the declared padding",
                usable_bits - reader.consumed()
            )));
        }
        Ok(out)
    }

    /// Serialize the tree in preorder: one marker byte per node, leaves
    /// followed by their raw byte value. An absent tree is a single marker.
    pub fn serialize_tree(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 * self.nodes.len() + 1);
        match self.root {
            Some(root) => self.serialize_node(root, &mut out),
            None => out.push(EMPTY_MARKER),
        }
        out
    }

    fn serialize_node(&self, id: NodeId, out: &mut Vec<u8>) {
        match self.nodes[id].node_data {
            NodeData::Leaf(byte) => {
                out.push(LEAF_MARKER);
                out.push(byte);
            }
            NodeData::Kids(left, right) => {
                out.push(INTERNAL_MARKER);
                self.serialize_node(left, out);
                self.serialize_node(right, out);
            }
        }
    }

    /// Rebuild the tree from its serialized form, replacing any tree this
    /// codec held. Returns the count of bytes consumed, so a caller parsing
    /// a larger buffer knows where the tree ends.
    pub fn deserialize_tree(&mut self, buf: &[u8]) -> Result<usize> {
        self.nodes.clear();
        self.root = None;

        match buf.first() {
            None => Err(HuffzipError::CorruptStream(
                "serialized tree is empty".to_string(),
            )),
            Some(&EMPTY_MARKER) => Ok(1),
            Some(_) => {
                let (root, end) = self.deserialize_node(buf, 0, 0)?;
                self.root = Some(root);
                Ok(end)
            }
        }
    }

    // Depth-first parse; `index` is the cursor into `buf`, threaded through
    // the recursion and returned so sequential nodes never overlap.
    fn deserialize_node(&mut self, buf: &[u8], index: usize, depth: usize) -> Result<(NodeId, usize)> {
        if depth > MAX_DEPTH {
            return Err(HuffzipError::CorruptStream(
                "serialized tree nests deeper than a 256 symbol alphabet allows".to_string(),
            ));
        }
        match buf.get(index) {
            Some(&LEAF_MARKER) => {
                let byte = *buf.get(index + 1).ok_or_else(|| {
                    HuffzipError::CorruptStream("serialized tree truncated at a leaf".to_string())
                })?;
                let id = self.alloc(0, NodeData::Leaf(byte));
                Ok((id, index + 2))
            }
            Some(&INTERNAL_MARKER) => {
                let (left, after_left) = self.deserialize_node(buf, index + 1, depth + 1)?;
                let (right, after_right) = self.deserialize_node(buf, after_left, depth + 1)?;
                let id = self.alloc(0, NodeData::Kids(left, right));
                Ok((id, after_right))
            }
            Some(&marker) => Err(HuffzipError::CorruptStream(format!(
                "unknown tree node marker {:#04x}",
                marker
            ))),
            None => Err(HuffzipError::CorruptStream(
                "serialized tree truncated".to_string(),
            )),
        }
    }

    /// Handle of the tree root, if a tree is resident.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Read access to an arena node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

impl Default for Huffman {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for Huffman {
    type Encoded = EncodedBlock;

    fn compress(&mut self, chunk: &[u8]) -> Result<EncodedBlock> {
        let original_size: u32 = chunk.len().try_into().map_err(|_| {
            HuffzipError::InvalidConfiguration("chunk exceeds 4 GiB".to_string())
        })?;
        let freqs = Self::build_frequency_table(chunk);
        self.build_tree(&freqs);
        self.generate_codes();
        let (bits, padding) = self.encode_data(chunk)?;
        Ok(EncodedBlock {
            tree: self.serialize_tree(),
            padding,
            original_size,
            bits,
        })
    }

    fn decompress(&mut self, block: &EncodedBlock) -> Result<Vec<u8>> {
        let used = self.deserialize_tree(&block.tree)?;
        if used != block.tree.len() {
            return Err(HuffzipError::CorruptStream(
                "trailing bytes after serialized tree".to_string(),
            ));
        }
        self.decode_data(block)
    }
}

fn exhausted(emitted: usize, wanted: usize) -> HuffzipError {
    HuffzipError::CorruptStream(format!(
        "bit buffer exhausted after {} of {} bytes",
        emitted, wanted
    ))
}
