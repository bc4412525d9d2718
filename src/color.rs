//! Colour endpoint decoding: ISE range selection, unquantization (C.2.13)
//! and the LDR endpoint modes (C.2.14).

use crate::bitstream::{replicate, BitReader};
use crate::error::BlockError;
use crate::integer_sequence::{
    create_encoding, decode_integer_sequence, IntegerEncodedValue, IntegerEncoding,
};

/// Upper bound on endpoint values in one block.
pub const MAX_COLOR_VALUES: usize = 18;

// Endpoint ISE ranges from the largest to the smallest permitted.
const COLOR_RANGES: [u32; 17] = [
    255, 191, 159, 127, 95, 79, 63, 47, 39, 31, 23, 19, 15, 11, 9, 7, 5,
];

/// An RGBA endpoint pair.
pub type Endpoints = [[u8; 4]; 2];

/// Number of endpoint values a colour endpoint mode consumes.
pub fn color_values_for_mode(mode: u32) -> u32 {
    ((mode >> 2) + 1) << 1
}

/// Picks the largest endpoint range whose encoding of `n_values` fits in
/// `n_bits`.
pub fn select_color_range(n_values: u32, n_bits: u32) -> Option<u32> {
    COLOR_RANGES
        .iter()
        .copied()
        .find(|&range| create_encoding(range).bit_length(n_values) <= n_bits)
}

/// Maps one endpoint value to `0..=255`.
pub fn unquantize_color_value(val: &IntegerEncodedValue) -> u8 {
    let bitlen = val.num_bits;
    let bitval = val.bit_value;

    // Nine copies of the low bit.
    let a = replicate(bitval & 1, 1, 9);
    let mut b = 0;
    let c;
    let d;

    match val.encoding {
        IntegerEncoding::JustBits => return replicate(bitval, bitlen, 8) as u8,

        IntegerEncoding::Trit(trit_value) => {
            d = trit_value;

            match bitlen {
                1 => {
                    c = 204;
                }

                2 => {
                    c = 93;
                    // b = b000b0bb0
                    let x = (bitval >> 1) & 1;
                    b = (x << 8) | (x << 4) | (x << 2) | (x << 1);
                }

                3 => {
                    c = 44;
                    // b = cb000cbcb
                    let cb = (bitval >> 1) & 3;
                    b = (cb << 7) | (cb << 2) | cb;
                }

                4 => {
                    c = 22;
                    // b = dcb000dcb
                    let dcb = (bitval >> 1) & 7;
                    b = (dcb << 6) | dcb;
                }

                5 => {
                    c = 11;
                    // b = edcb000ed
                    let edcb = (bitval >> 1) & 0xF;
                    b = (edcb << 5) | (edcb >> 2);
                }

                6 => {
                    c = 5;
                    // b = fedcb000f
                    let fedcb = (bitval >> 1) & 0x1F;
                    b = (fedcb << 4) | (fedcb >> 4);
                }

                _ => unreachable!("no endpoint range uses trits with {} bits", bitlen),
            }
        }

        IntegerEncoding::Quint(quint_value) => {
            d = quint_value;

            match bitlen {
                1 => {
                    c = 113;
                }

                2 => {
                    c = 54;
                    // b = b0000bb00
                    let x = (bitval >> 1) & 1;
                    b = (x << 8) | (x << 3) | (x << 2);
                }

                3 => {
                    c = 26;
                    // b = cb0000cbc
                    let cb = (bitval >> 1) & 3;
                    b = (cb << 7) | (cb << 1) | (cb >> 1);
                }

                4 => {
                    c = 13;
                    // b = dcb0000dc
                    let dcb = (bitval >> 1) & 7;
                    b = (dcb << 6) | (dcb >> 1);
                }

                5 => {
                    c = 6;
                    // b = edcb0000e
                    let edcb = (bitval >> 1) & 0xF;
                    b = (edcb << 5) | (edcb >> 3);
                }

                _ => unreachable!("no endpoint range uses quints with {} bits", bitlen),
            }
        }
    }

    let mut t = d * c + b;
    t ^= a;
    t = (a & 0x80) | (t >> 2);
    t as u8
}

/// Decodes the unquantized endpoint values of all partitions from the colour
/// data region. `data` holds exactly `n_bits` meaningful bits starting at bit
/// zero; everything above is zero.
pub fn decode_color_values(
    out: &mut [u8; MAX_COLOR_VALUES],
    data: &[u8],
    modes: &[u32],
    n_bits: u32,
) -> Result<u32, BlockError> {
    let n_values: u32 = modes.iter().map(|&m| color_values_for_mode(m)).sum();
    if n_values as usize > MAX_COLOR_VALUES {
        return Err(BlockError::TooManyColorValues(n_values));
    }

    let range = select_color_range(n_values, n_bits).ok_or(BlockError::InsufficientColorBits {
        values: n_values,
        available: n_bits,
    })?;

    let mut color_stream = BitReader::new(data);
    let values = decode_integer_sequence(&mut color_stream, range, n_values);

    for (out, val) in out.iter_mut().zip(values[..n_values as usize].iter()) {
        *out = unquantize_color_value(val);
    }

    Ok(n_values)
}

// C.2.14 bit transfer: moves the top bit of `a` into `b`, leaving `a` a
// signed 6-bit offset.
fn bit_transfer_signed(a: &mut i32, b: &mut i32) {
    *b >>= 1;
    *b |= *a & 0x80;
    *a >>= 1;
    *a &= 0x3F;
    if (*a & 0x20) != 0 {
        *a -= 0x40;
    }
}

// C.2.14 blue contraction, applied when the endpoint sums are swapped.
fn blue_contract(a: i32, r: i32, g: i32, b: i32) -> [u8; 4] {
    [
        ((r + b) >> 1).clamp(0, 255) as u8,
        ((g + b) >> 1).clamp(0, 255) as u8,
        b.clamp(0, 255) as u8,
        a.clamp(0, 255) as u8,
    ]
}

fn clamp_color(a: i32, r: i32, g: i32, b: i32) -> [u8; 4] {
    [
        r.clamp(0, 255) as u8,
        g.clamp(0, 255) as u8,
        b.clamp(0, 255) as u8,
        a.clamp(0, 255) as u8,
    ]
}

/// Builds the endpoint pair of one partition, consuming its values from the
/// front of `color_values`.
pub fn compute_endpoints(color_values: &mut &[u8], mode: u32) -> Result<Endpoints, BlockError> {
    let count = color_values_for_mode(mode) as usize;
    if !matches!(mode, 0 | 1 | 4 | 5 | 6 | 8 | 9 | 10 | 12 | 13) {
        return Err(BlockError::UnsupportedEndpointMode(mode));
    }
    debug_assert!(color_values.len() >= count);

    let mut v = [0i32; 8];
    for (v, &c) in v.iter_mut().zip(color_values[..count].iter()) {
        *v = i32::from(c);
    }
    *color_values = &color_values[count..];

    macro_rules! bts {
        ($a:expr, $b: expr) => {{
            let mut a = v[$a];
            let mut b = v[$b];
            bit_transfer_signed(&mut a, &mut b);
            v[$a] = a;
            v[$b] = b;
        }};
    }

    let endpoints = match mode {
        // Luminance, direct
        0 => [
            clamp_color(0xFF, v[0], v[0], v[0]),
            clamp_color(0xFF, v[1], v[1], v[1]),
        ],

        // Luminance, base + offset
        1 => {
            let l0 = (v[0] >> 2) | (v[1] & 0xC0);
            let l1 = std::cmp::min(l0 + (v[1] & 0x3F), 0xFF);
            [
                clamp_color(0xFF, l0, l0, l0),
                clamp_color(0xFF, l1, l1, l1),
            ]
        }

        // Luminance + alpha, direct
        4 => [
            clamp_color(v[2], v[0], v[0], v[0]),
            clamp_color(v[3], v[1], v[1], v[1]),
        ],

        // Luminance + alpha, base + offset
        5 => {
            bts!(1, 0);
            bts!(3, 2);
            [
                clamp_color(v[2], v[0], v[0], v[0]),
                clamp_color(v[2] + v[3], v[0] + v[1], v[0] + v[1], v[0] + v[1]),
            ]
        }

        // RGB, base + scale
        6 => [
            clamp_color(
                0xFF,
                (v[0] * v[3]) >> 8,
                (v[1] * v[3]) >> 8,
                (v[2] * v[3]) >> 8,
            ),
            clamp_color(0xFF, v[0], v[1], v[2]),
        ],

        // RGB, direct
        8 => {
            if v[1] + v[3] + v[5] >= v[0] + v[2] + v[4] {
                [
                    clamp_color(0xFF, v[0], v[2], v[4]),
                    clamp_color(0xFF, v[1], v[3], v[5]),
                ]
            } else {
                [
                    blue_contract(0xFF, v[1], v[3], v[5]),
                    blue_contract(0xFF, v[0], v[2], v[4]),
                ]
            }
        }

        // RGB, base + offset
        9 => {
            bts!(1, 0);
            bts!(3, 2);
            bts!(5, 4);
            if v[1] + v[3] + v[5] >= 0 {
                [
                    clamp_color(0xFF, v[0], v[2], v[4]),
                    clamp_color(0xFF, v[0] + v[1], v[2] + v[3], v[4] + v[5]),
                ]
            } else {
                [
                    blue_contract(0xFF, v[0] + v[1], v[2] + v[3], v[4] + v[5]),
                    blue_contract(0xFF, v[0], v[2], v[4]),
                ]
            }
        }

        // RGB, base + scale, plus two alpha
        10 => [
            clamp_color(
                v[4],
                (v[0] * v[3]) >> 8,
                (v[1] * v[3]) >> 8,
                (v[2] * v[3]) >> 8,
            ),
            clamp_color(v[5], v[0], v[1], v[2]),
        ],

        // RGBA, direct
        12 => {
            if v[1] + v[3] + v[5] >= v[0] + v[2] + v[4] {
                [
                    clamp_color(v[6], v[0], v[2], v[4]),
                    clamp_color(v[7], v[1], v[3], v[5]),
                ]
            } else {
                [
                    blue_contract(v[7], v[1], v[3], v[5]),
                    blue_contract(v[6], v[0], v[2], v[4]),
                ]
            }
        }

        // RGBA, base + offset
        13 => {
            bts!(1, 0);
            bts!(3, 2);
            bts!(5, 4);
            bts!(7, 6);
            if v[1] + v[3] + v[5] >= 0 {
                [
                    clamp_color(v[6], v[0], v[2], v[4]),
                    clamp_color(v[7] + v[6], v[0] + v[1], v[2] + v[3], v[4] + v[5]),
                ]
            } else {
                [
                    blue_contract(v[6] + v[7], v[0] + v[1], v[2] + v[3], v[4] + v[5]),
                    blue_contract(v[6], v[0], v[2], v[4]),
                ]
            }
        }

        _ => unreachable!(),
    };

    Ok(endpoints)
}
