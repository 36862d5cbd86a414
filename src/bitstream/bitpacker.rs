//! BitPacker: packs variable-length bit codes into a byte buffer.

/// Packs bit codes into a byte buffer, most significant bit first. Call
/// flush() before reading the output or bits may be left in the internal
/// queue.
pub struct BitPacker {
    /// Packed output bytes.
    pub output: Vec<u8>,
    /// Unused low-order bits in the final output byte (0-7). Valid after
    /// flush(). Normalized to 0 when the bit stream divides evenly by 8.
    pub padding: u8,
    /// Queue of bits waiting to be written out as full bytes.
    queue: u64,
    /// Count of valid bits in the queue.
    q_bits: u8,
}

impl BitPacker {
    /// Create a new BitPacker with an output buffer of the size specified.
    /// Suggest the size be set to the chunk size.
    pub fn new(size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            padding: 0,
            queue: 0,
            q_bits: 0,
        }
    }

    /// Internal bitstream write function. Drains full bytes from the queue.
    fn write_stream(&mut self) {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
        }
    }

    /// Append the `len` low-order bits of `bits` to the stream, most
    /// significant of those bits first. `len` may be 0-64.
    pub fn push_bits(&mut self, bits: u64, len: u8) {
        if len == 0 {
            return;
        }
        // The queue holds at most 7 residual bits, so anything over 32 goes
        // in two pieces to stay within the 64 bit queue.
        if len > 32 {
            self.push_bits(bits >> 32, len - 32);
            self.push_bits(bits & 0xffff_ffff, 32);
            return;
        }
        self.queue <<= len; //shift queue by bit length
        self.queue |= bits & ((1u64 << len) - 1); //add data portion to queue
        self.q_bits += len; //update depth of queue bits
        self.write_stream();
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in
    /// the least significant bits, and records the padding count.
    pub fn flush(&mut self) {
        self.padding = (8 - self.q_bits % 8) % 8;
        if self.q_bits > 0 {
            self.queue <<= self.padding; //pad the queue with zeros
            self.q_bits += self.padding;
            self.write_stream(); // write out all that is left
        }
    }
}

#[cfg(test)]
mod test {
    use super::BitPacker;

    #[test]
    fn single_bits_test() {
        let mut bp = BitPacker::new(8);
        for bit in [1, 1, 0, 0, 0, 0, 0, 1] {
            bp.push_bits(bit, 1);
        }
        bp.flush();
        assert_eq!(bp.output, vec![0b1100_0001]);
        assert_eq!(bp.padding, 0);
    }

    #[test]
    fn partial_byte_padding_test() {
        let mut bp = BitPacker::new(8);
        bp.push_bits(0b110, 3);
        bp.flush();
        assert_eq!(bp.output, vec![0b1100_0000]);
        assert_eq!(bp.padding, 5);
    }

    #[test]
    fn aligned_stream_has_zero_padding() {
        let mut bp = BitPacker::new(8);
        bp.push_bits(0xAB, 8);
        bp.push_bits(0xCD, 8);
        bp.flush();
        assert_eq!(bp.output, vec![0xAB, 0xCD]);
        assert_eq!(bp.padding, 0);
    }

    #[test]
    fn wide_code_test() {
        let mut bp = BitPacker::new(8);
        // 40 bit value crosses the internal 32 bit split
        bp.push_bits(0xAA_BBCC_DDEE, 40);
        bp.flush();
        assert_eq!(bp.output, vec![0xAA, 0xBB, 0xCC, 0xDD, 0xEE]);
        assert_eq!(bp.padding, 0);
    }

    #[test]
    fn empty_flush_test() {
        let mut bp = BitPacker::new(8);
        bp.flush();
        assert!(bp.output.is_empty());
        assert_eq!(bp.padding, 0);
    }
}
