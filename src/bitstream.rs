/// LSB-first bit cursor over a byte buffer.
///
/// Bit `k` of the stream is `(data[k / 8] >> (k % 8)) & 1`. Multi-bit reads
/// place the first bit read in the least significant position of the result.
/// Reading past the end of the buffer is a caller bug and panics.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bits_read: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> BitReader<'a> {
        BitReader { data, bits_read: 0 }
    }

    /// Total number of bits consumed so far.
    pub fn bits_read(&self) -> usize {
        self.bits_read
    }

    /// Bits left before the end of the buffer.
    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.bits_read
    }

    pub fn read_bit(&mut self) -> u32 {
        assert!(
            self.bits_read < self.data.len() * 8,
            "bit read past the end of a {} byte buffer",
            self.data.len()
        );
        let byte = self.data[self.bits_read / 8];
        let bit = (byte >> (self.bits_read % 8)) & 1;
        self.bits_read += 1;
        bit as u32
    }

    pub fn read_bits(&mut self, n_bits: u32) -> u32 {
        assert!(n_bits <= 32);
        let mut ret = 0;
        for i in 0..n_bits {
            ret |= self.read_bit() << i;
        }
        ret
    }
}

/// Bit field view over a small integer.
pub(crate) struct Bits(pub u32);

impl Bits {
    pub fn get(&self, pos: u32) -> u32 {
        (self.0 >> pos) & 1
    }

    /// Inclusive range `[start, end]`.
    pub fn range(&self, start: u32, end: u32) -> u32 {
        let mask = (1 << (end - start + 1)) - 1;
        (self.0 >> start) & mask
    }
}

// Widens the low `num_bits` of `val` to `to_bit` bits by repeating the
// pattern from the top down, truncating the last copy.
pub(crate) fn replicate(val: u32, mut num_bits: u32, to_bit: u32) -> u32 {
    if num_bits == 0 || to_bit == 0 {
        return 0;
    }
    let v = val & ((1 << num_bits) - 1);
    let mut res = v;
    let mut reslen = num_bits;
    while reslen < to_bit {
        let mut comp = 0;
        if num_bits > to_bit - reslen {
            let newshift = to_bit - reslen;
            comp = num_bits - newshift;
            num_bits = newshift;
        }
        res <<= num_bits;
        res |= v >> comp;
        reslen += num_bits;
    }
    res
}
