//! BitReader: reads a packed bitstream from an in-memory buffer.
//!
//! Encoded chunks are fully resident by the time they are decoded, so this
//! reader works over a borrowed slice rather than an I/O source.

const BIT_MASK: u8 = 0xff;

/// Reads a packed bit buffer one bit at a time, most significant bit first.
#[derive(Debug)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
    bit_index: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new BitReader over the given buffer.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            cursor: 0,
            bit_index: 0,
        }
    }

    /// Return the next bit as Option<usize> (1 or 0), or None if the buffer
    /// is exhausted.
    pub fn bit(&mut self) -> Option<usize> {
        if self.cursor >= self.buffer.len() {
            return None;
        }
        let bit =
            (self.buffer[self.cursor] & BIT_MASK >> self.bit_index) >> (7 - self.bit_index);
        self.bit_index += 1;
        self.bit_index %= 8;
        if self.bit_index == 0 {
            self.cursor += 1;
        }
        Some(bit as usize)
    }

    /// Return Option<bool> *true* if the next bit is 1, *false* if 0,
    /// consuming the bit, or None if the buffer is exhausted.
    pub fn bool_bit(&mut self) -> Option<bool> {
        self.bit().map(|bit| bit == 1)
    }

    /// Count of bits consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor * 8 + self.bit_index
    }
}
