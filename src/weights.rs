//! Texel weight unquantization (C.2.17) and infill (C.2.18).

use crate::bitstream::replicate;
use crate::block_mode::TexelWeightParams;
use crate::footprint::{Footprint, MAX_BLOCK_TEXELS};
use crate::integer_sequence::{IntegerEncodedValue, IntegerEncoding, MAX_SEQUENCE_VALUES};

/// Per-texel weights of both planes, in `0..=64`.
pub type WeightPlanes = [[u32; MAX_BLOCK_TEXELS]; 2];

/// Maps one weight value to `0..=64`.
pub fn unquantize_texel_weight(val: &IntegerEncodedValue) -> u32 {
    let bitval = val.bit_value;
    let bitlen = val.num_bits;

    let a = replicate(bitval & 1, 1, 7);
    let mut result = 0;

    let (d, c, b) = match val.encoding {
        IntegerEncoding::JustBits => {
            result = replicate(bitval, bitlen, 6);
            (0, 0, 0)
        }

        IntegerEncoding::Trit(d) => match bitlen {
            0 => {
                result = [0, 32, 63][d as usize];
                (d, 0, 0)
            }
            1 => (d, 50, 0),
            2 => {
                let x = (bitval >> 1) & 1;
                (d, 23, (x << 6) | (x << 2) | x)
            }
            3 => {
                let cb = (bitval >> 1) & 3;
                (d, 11, (cb << 5) | cb)
            }
            _ => unreachable!("no weight range uses trits with {} bits", bitlen),
        },

        IntegerEncoding::Quint(d) => match bitlen {
            0 => {
                result = [0, 16, 32, 47, 63][d as usize];
                (d, 0, 0)
            }
            1 => (d, 28, 0),
            2 => {
                let x = (bitval >> 1) & 1;
                (d, 13, (x << 6) | (x << 1))
            }
            _ => unreachable!("no weight range uses quints with {} bits", bitlen),
        },
    };

    if val.encoding != IntegerEncoding::JustBits && bitlen > 0 {
        result = d * c + b;
        result ^= a;
        result = (a & 0x20) | (result >> 2);
    }

    debug_assert!(result < 64);

    // Stretch 0..=63 onto 0..=64.
    if result > 32 {
        result += 1;
    }

    result
}

/// Unquantizes the decoded weight grid and resamples it to every texel of the
/// footprint. Plane 1 is only filled for dual plane blocks.
pub fn infill_weights(
    weights: &[IntegerEncodedValue],
    params: &TexelWeightParams,
    footprint: Footprint,
) -> WeightPlanes {
    let block_width = footprint.block_width();
    let block_height = footprint.block_height();
    let grid_size = params.width * params.height;
    let plane_count = if params.is_dual_plane { 2 } else { 1 };

    let mut unquantized = [[0; MAX_SEQUENCE_VALUES]; 2];
    let grid_values = weights
        .chunks_exact(plane_count)
        .take(grid_size as usize)
        .enumerate();
    for (weight_idx, planes) in grid_values {
        for (plane, w) in planes.iter().enumerate() {
            unquantized[plane][weight_idx] = unquantize_texel_weight(w);
        }
    }

    let ds = (1024 + (block_width / 2)) / (block_width - 1);
    let dt = (1024 + (block_height / 2)) / (block_height - 1);

    let mut out = [[0; MAX_BLOCK_TEXELS]; 2];
    for plane in 0..plane_count {
        for t in 0..block_height {
            for s in 0..block_width {
                let cs = ds * s;
                let ct = dt * t;

                let gs = (cs * (params.width - 1) + 32) >> 6;
                let gt = (ct * (params.height - 1) + 32) >> 6;

                let js = gs >> 4;
                let fs = gs & 0xF;

                let jt = gt >> 4;
                let ft = gt & 0x0F;

                let w11 = (fs * ft + 8) >> 4;
                let w10 = ft - w11;
                let w01 = fs - w11;
                let w00 = 16 + w11 - fs - ft;

                let v0 = js + jt * params.width;
                let grid = |i: u32| {
                    if i < grid_size {
                        unquantized[plane][i as usize]
                    } else {
                        0
                    }
                };

                let p00 = grid(v0);
                let p01 = grid(v0 + 1);
                let p10 = grid(v0 + params.width);
                let p11 = grid(v0 + params.width + 1);

                out[plane][(t * block_width + s) as usize] =
                    (p00 * w00 + p01 * w01 + p10 * w10 + p11 * w11 + 8) >> 4;
            }
        }
    }

    out
}
