//! Bounded integer sequence encoding (ISE), ASTC section C.2.12.
//!
//! Values with a range that is not a power of two are packed as a base-3
//! (trit) or base-5 (quint) digit on top of a few raw low bits. Five trits
//! share eight bits and three quints share seven, interleaved with the raw
//! bits of the values they belong to.

use crate::bitstream::{BitReader, Bits};
use std::ops::Deref;

/// Largest number of values a single sequence decode may request. This is the
/// ASTC limit on weights per block.
pub const MAX_SEQUENCE_VALUES: usize = 64;

// Whole trit/quint blocks are always decoded, so up to four extra values may
// trail the requested ones.
const SEQUENCE_CAPACITY: usize = MAX_SEQUENCE_VALUES + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerEncodingType {
    JustBits,
    Quint,
    Trit,
}

/// Decoded digit of a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerEncoding {
    JustBits,
    Quint(u32),
    Trit(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerEncodedValue {
    pub encoding: IntegerEncoding,
    pub num_bits: u32,
    pub bit_value: u32,
}

impl IntegerEncodedValue {
    const EMPTY: IntegerEncodedValue = IntegerEncodedValue {
        encoding: IntegerEncoding::JustBits,
        num_bits: 0,
        bit_value: 0,
    };

    /// The integer this element represents.
    pub fn value(&self) -> u32 {
        match self.encoding {
            IntegerEncoding::JustBits => self.bit_value,
            IntegerEncoding::Trit(digit) | IntegerEncoding::Quint(digit) => {
                (digit << self.num_bits) + self.bit_value
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerEncodedFormat {
    pub encoding: IntegerEncodingType,
    pub num_bits: u32,
}

impl IntegerEncodedFormat {
    /// Bits that a sequence of `n_vals` values in this format occupies.
    pub fn bit_length(&self, n_vals: u32) -> u32 {
        let mut total_bits = self.num_bits * n_vals;
        match self.encoding {
            IntegerEncodingType::JustBits => (),
            IntegerEncodingType::Trit => total_bits += (n_vals * 8 + 4) / 5,
            IntegerEncodingType::Quint => total_bits += (n_vals * 7 + 2) / 3,
        }
        total_bits
    }

    /// Largest value representable with this format.
    pub fn max_value(&self) -> u32 {
        let low = (1 << self.num_bits) - 1;
        match self.encoding {
            IntegerEncodingType::JustBits => low,
            IntegerEncodingType::Trit => (3 << self.num_bits) - 1,
            IntegerEncodingType::Quint => (5 << self.num_bits) - 1,
        }
    }
}

/// Returns the encoding that can represent every value in `0..=max_val`
/// using the largest ASTC range not exceeding `max_val`.
pub const fn create_encoding(mut max_val: u32) -> IntegerEncodedFormat {
    while max_val > 0 {
        let check = max_val + 1;

        // 2^n - 1: plain bits.
        if (check & (check - 1)) == 0 {
            return IntegerEncodedFormat {
                encoding: IntegerEncodingType::JustBits,
                num_bits: max_val.count_ones(),
            };
        }

        // 3 * 2^n - 1: one trit plus n bits.
        if (check % 3 == 0) && ((check / 3) & ((check / 3) - 1)) == 0 {
            return IntegerEncodedFormat {
                encoding: IntegerEncodingType::Trit,
                num_bits: (check / 3 - 1).count_ones(),
            };
        }

        // 5 * 2^n - 1: one quint plus n bits.
        if (check % 5 == 0) && ((check / 5) & ((check / 5) - 1)) == 0 {
            return IntegerEncodedFormat {
                encoding: IntegerEncodingType::Quint,
                num_bits: (check / 5 - 1).count_ones(),
            };
        }

        // Not an ASTC range, try the next smaller one.
        max_val -= 1;
    }
    IntegerEncodedFormat {
        encoding: IntegerEncodingType::JustBits,
        num_bits: 0,
    }
}

static ENCODINGS_VALUES: [IntegerEncodedFormat; 256] = {
    let mut result = [IntegerEncodedFormat {
        encoding: IntegerEncodingType::JustBits,
        num_bits: 0,
    }; 256];
    let mut i = 0;
    while i < 256 {
        result[i as usize] = create_encoding(i);
        i += 1;
    }
    result
};

/// Table lookup of [`create_encoding`] for ranges up to 255.
pub fn encoding_for(max_range: u32) -> IntegerEncodedFormat {
    match ENCODINGS_VALUES.get(max_range as usize) {
        Some(format) => *format,
        None => create_encoding(max_range),
    }
}

/// Values produced by [`decode_integer_sequence`], in decode order.
#[derive(Clone)]
pub struct IntegerSequence {
    values: [IntegerEncodedValue; SEQUENCE_CAPACITY],
    len: usize,
}

impl IntegerSequence {
    fn new() -> IntegerSequence {
        IntegerSequence {
            values: [IntegerEncodedValue::EMPTY; SEQUENCE_CAPACITY],
            len: 0,
        }
    }

    fn push(&mut self, value: IntegerEncodedValue) {
        self.values[self.len] = value;
        self.len += 1;
    }
}

impl Deref for IntegerSequence {
    type Target = [IntegerEncodedValue];

    fn deref(&self) -> &[IntegerEncodedValue] {
        &self.values[..self.len]
    }
}

impl std::fmt::Debug for IntegerSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

fn decode_trit_block(bits: &mut BitReader, result: &mut IntegerSequence, bits_per_value: u32) {
    let mut m = [0u32; 5];
    let mut t = [0u32; 5];
    let mut tt: u32;

    // Table C.2.14
    m[0] = bits.read_bits(bits_per_value);
    tt = bits.read_bits(2);
    m[1] = bits.read_bits(bits_per_value);
    tt |= bits.read_bits(2) << 2;
    m[2] = bits.read_bits(bits_per_value);
    tt |= bits.read_bit() << 4;
    m[3] = bits.read_bits(bits_per_value);
    tt |= bits.read_bits(2) << 5;
    m[4] = bits.read_bits(bits_per_value);
    tt |= bits.read_bit() << 7;

    let c: u32;

    let tb = Bits(tt);
    if tb.range(2, 4) == 7 {
        c = (tb.range(5, 7) << 2) | tb.range(0, 1);
        t[3] = 2;
        t[4] = 2;
    } else {
        c = tb.range(0, 4);
        if tb.range(5, 6) == 3 {
            t[4] = 2;
            t[3] = tb.get(7);
        } else {
            t[4] = tb.get(7);
            t[3] = tb.range(5, 6);
        }
    }

    let cb = Bits(c);
    if cb.range(0, 1) == 3 {
        t[2] = 2;
        t[1] = cb.get(4);
        t[0] = (cb.get(3) << 1) | (cb.get(2) & !cb.get(3));
    } else if cb.range(2, 3) == 3 {
        t[2] = 2;
        t[1] = 2;
        t[0] = cb.range(0, 1);
    } else {
        t[2] = cb.get(4);
        t[1] = cb.range(2, 3);
        t[0] = (cb.get(1) << 1) | (cb.get(0) & !cb.get(1));
    }

    for (&bit_value, &trit) in m.iter().zip(t.iter()) {
        debug_assert!(trit < 3);
        result.push(IntegerEncodedValue {
            encoding: IntegerEncoding::Trit(trit),
            num_bits: bits_per_value,
            bit_value,
        });
    }
}

fn decode_quint_block(bits: &mut BitReader, result: &mut IntegerSequence, bits_per_value: u32) {
    let mut m = [0u32; 3];
    let mut q = [0u32; 3];
    let mut qq: u32;

    // Table C.2.15
    m[0] = bits.read_bits(bits_per_value);
    qq = bits.read_bits(3);
    m[1] = bits.read_bits(bits_per_value);
    qq |= bits.read_bits(2) << 3;
    m[2] = bits.read_bits(bits_per_value);
    qq |= bits.read_bits(2) << 5;

    let qb = Bits(qq);
    if qb.range(1, 2) == 3 && qb.range(5, 6) == 0 {
        q[0] = 4;
        q[1] = 4;
        q[2] = (qb.get(0) << 2) | ((qb.get(4) & !qb.get(0)) << 1) | (qb.get(3) & !qb.get(0));
    } else {
        let c;
        if qb.range(1, 2) == 3 {
            q[2] = 4;
            c = (qb.range(3, 4) << 3) | ((!qb.range(5, 6) & 3) << 1) | qb.get(0);
        } else {
            q[2] = qb.range(5, 6);
            c = qb.range(0, 4);
        }

        let cb = Bits(c);
        if cb.range(0, 2) == 5 {
            q[1] = 4;
            q[0] = cb.range(3, 4);
        } else {
            q[1] = cb.range(3, 4);
            q[0] = cb.range(0, 2);
        }
    }

    for (&bit_value, &quint) in m.iter().zip(q.iter()) {
        debug_assert!(quint < 5);
        result.push(IntegerEncodedValue {
            encoding: IntegerEncoding::Quint(quint),
            num_bits: bits_per_value,
            bit_value,
        });
    }
}

/// Decodes at least `n_values` values of range `0..=max_range` from `bits`.
///
/// Trit and quint blocks are always decoded whole, so the returned sequence
/// may hold up to four values past `n_values`. Callers that need an exact
/// count slice the front of the sequence, and must give the reader room for
/// the whole final block.
pub fn decode_integer_sequence(
    bits: &mut BitReader,
    max_range: u32,
    n_values: u32,
) -> IntegerSequence {
    assert!(n_values as usize <= MAX_SEQUENCE_VALUES);

    let val = encoding_for(max_range);
    let mut result = IntegerSequence::new();

    while result.len() < n_values as usize {
        match val.encoding {
            IntegerEncodingType::Quint => decode_quint_block(bits, &mut result, val.num_bits),
            IntegerEncodingType::Trit => decode_trit_block(bits, &mut result, val.num_bits),
            IntegerEncodingType::JustBits => {
                let bit_value = bits.read_bits(val.num_bits);
                result.push(IntegerEncodedValue {
                    encoding: IntegerEncoding::JustBits,
                    num_bits: val.num_bits,
                    bit_value,
                });
            }
        }
    }

    result
}


#[cfg(test)]
mod tests {
    use super::test_encoder::*;
    use super::*;
    use rand::*;
    use rand_pcg::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case(1, IntegerEncodingType::JustBits, 1)]
    #[case(2, IntegerEncodingType::Trit, 0)]
    #[case(3, IntegerEncodingType::JustBits, 2)]
    #[case(4, IntegerEncodingType::Quint, 0)]
    #[case(5, IntegerEncodingType::Trit, 1)]
    #[case(7, IntegerEncodingType::JustBits, 3)]
    #[case(9, IntegerEncodingType::Quint, 1)]
    #[case(11, IntegerEncodingType::Trit, 2)]
    #[case(15, IntegerEncodingType::JustBits, 4)]
    #[case(19, IntegerEncodingType::Quint, 2)]
    #[case(23, IntegerEncodingType::Trit, 3)]
    #[case(31, IntegerEncodingType::JustBits, 5)]
    #[case(255, IntegerEncodingType::JustBits, 8)]
    #[case(191, IntegerEncodingType::Trit, 6)]
    #[case(159, IntegerEncodingType::Quint, 5)]
    fn encoding_table(#[case] max: u32, #[case] encoding: IntegerEncodingType, #[case] bits: u32) {
        let format = create_encoding(max);
        assert_eq!(format.encoding, encoding);
        assert_eq!(format.num_bits, bits);
        assert_eq!(format.max_value(), max);
        assert_eq!(encoding_for(max), format);
    }

    #[test]
    fn encoding_rounds_down_to_an_astc_range() {
        assert_eq!(create_encoding(0).num_bits, 0);
        assert_eq!(create_encoding(6), create_encoding(5));
        assert_eq!(create_encoding(254), create_encoding(191));
        assert_eq!(create_encoding(170), create_encoding(159));
        for max in 1..256 {
            assert!(create_encoding(max).max_value() <= max);
        }
    }

    #[test]
    fn bit_lengths() {
        let trit = create_encoding(2);
        assert_eq!(trit.bit_length(5), 8);
        assert_eq!(trit.bit_length(1), 2);
        let quint = create_encoding(4);
        assert_eq!(quint.bit_length(3), 7);
        assert_eq!(quint.bit_length(1), 3);
        assert_eq!(create_encoding(23).bit_length(5), 5 * 3 + 8);
        assert_eq!(create_encoding(19).bit_length(4), 4 * 2 + 10);
        assert_eq!(create_encoding(15).bit_length(16), 64);
    }

    #[test]
    fn trit_block_consumes_eight_bits_without_raw_bits() {
        let data = [0xFFu8; 4];
        let mut strm = BitReader::new(&data);
        let values = decode_integer_sequence(&mut strm, 2, 5);
        assert_eq!(values.len(), 5);
        assert_eq!(strm.bits_read(), 8);
    }

    #[rstest]
    #[case(5, 5 * 1 + 8)]
    #[case(11, 5 * 2 + 8)]
    #[case(23, 5 * 3 + 8)]
    #[case(4, 7)]
    #[case(9, 3 * 1 + 7)]
    #[case(19, 3 * 2 + 7)]
    fn single_block_consumption(#[case] max: u32, #[case] expected_bits: usize) {
        let per_block = match create_encoding(max).encoding {
            IntegerEncodingType::Trit => 5,
            _ => 3,
        };
        let data = [0xA5u8; 16];
        let mut strm = BitReader::new(&data);
        let values = decode_integer_sequence(&mut strm, max, per_block);
        assert_eq!(values.len(), per_block as usize);
        assert_eq!(strm.bits_read(), expected_bits);
    }

    #[test]
    fn overshoot_values_are_returned() {
        let data = [0u8; 16];
        let mut strm = BitReader::new(&data);
        let values = decode_integer_sequence(&mut strm, 11, 7);
        assert_eq!(values.len(), 10);
        let mut strm = BitReader::new(&data);
        let values = decode_integer_sequence(&mut strm, 9, 4);
        assert_eq!(values.len(), 6);
        let mut strm = BitReader::new(&data);
        let values = decode_integer_sequence(&mut strm, 7, 4);
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn every_trit_combination_is_reachable() {
        let mut seen = HashSet::new();
        for t in 0..256u32 {
            let data = [t as u8];
            let mut strm = BitReader::new(&data);
            let values = decode_integer_sequence(&mut strm, 2, 5);
            let digits: Vec<u32> = values.iter().map(|v| v.value()).collect();
            assert!(digits.iter().all(|&d| d < 3));
            seen.insert(digits);
        }
        assert_eq!(seen.len(), 243);
    }

    #[test]
    fn every_quint_combination_is_reachable() {
        let mut seen = HashSet::new();
        for q in 0..128u32 {
            let data = [q as u8];
            let mut strm = BitReader::new(&data);
            let values = decode_integer_sequence(&mut strm, 4, 3);
            let digits: Vec<u32> = values.iter().map(|v| v.value()).collect();
            assert!(digits.iter().all(|&d| d < 5));
            seen.insert(digits);
        }
        assert_eq!(seen.len(), 125);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    #[case(9)]
    #[case(11)]
    #[case(19)]
    #[case(23)]
    #[case(31)]
    #[case(47)]
    #[case(79)]
    #[case(191)]
    #[case(255)]
    fn decodes_packed_sequences(#[case] max: u32) {
        let mut rng = Pcg64::seed_from_u64(u64::from(max));
        for count in 1..=12usize {
            let values: Vec<u32> = (0..count).map(|_| rng.gen_range(0..=max)).collect();
            let mut writer = BitWriter::default();
            encode_integer_sequence(&mut writer, max, &values);
            assert!(writer.pos >= create_encoding(max).bit_length(count as u32));

            let data = writer.data.to_le_bytes();
            let mut strm = BitReader::new(&data);
            let decoded = decode_integer_sequence(&mut strm, max, count as u32);
            let decoded: Vec<u32> = decoded[..count].iter().map(|v| v.value()).collect();
            assert_eq!(decoded, values);
        }
    }

    #[test]
    fn values_carry_their_digits() {
        let mut writer = BitWriter::default();
        encode_integer_sequence(&mut writer, 23, &[0, 8, 23, 17, 5]);
        let data = writer.data.to_le_bytes();
        let mut strm = BitReader::new(&data);
        let decoded = decode_integer_sequence(&mut strm, 23, 5);
        assert_eq!(decoded[1].encoding, IntegerEncoding::Trit(1));
        assert_eq!(decoded[1].bit_value, 0);
        assert_eq!(decoded[2].encoding, IntegerEncoding::Trit(2));
        assert_eq!(decoded[2].bit_value, 7);
        assert_eq!(decoded[3].num_bits, 3);
    }
}
