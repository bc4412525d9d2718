//! Partition selection, ASTC C.2.21.

use std::num::Wrapping;

/// Most partitions a block can have.
pub const MAX_PARTITIONS: usize = 4;

fn hash52(p: u32) -> u32 {
    let mut p = Wrapping(p);
    p ^= p >> 15;
    p -= p << 17;
    p += p << 7;
    p += p << 4;
    p ^= p >> 5;
    p += p << 16;
    p ^= p >> 7;
    p ^= p >> 3;
    p ^= p << 6;
    p ^= p >> 17;
    p.0
}

/// Returns the partition in `0..partition_count` of texel `(x, y)`.
///
/// `small_block` is set for footprints of fewer than 32 texels, which
/// sample the pattern at double resolution.
pub fn select_2d_partition(
    mut seed: u32,
    mut x: u32,
    mut y: u32,
    partition_count: usize,
    small_block: bool,
) -> usize {
    debug_assert!((1..=MAX_PARTITIONS).contains(&partition_count));
    if partition_count == 1 {
        return 0;
    }

    if small_block {
        x <<= 1;
        y <<= 1;
    }

    seed += (partition_count as u32 - 1) * 1024;

    let rnum = hash52(seed);
    let mut seeds = [0; 8];
    for (i, s) in seeds.iter_mut().enumerate() {
        let nibble = (rnum >> (4 * i)) & 0xF;
        *s = nibble * nibble;
    }

    let (sh1, sh2) = if seed & 1 != 0 {
        (
            if seed & 2 != 0 { 4 } else { 5 },
            if partition_count == 3 { 6 } else { 5 },
        )
    } else {
        (
            if partition_count == 3 { 6 } else { 5 },
            if seed & 2 != 0 { 4 } else { 5 },
        )
    };

    for (i, s) in seeds.iter_mut().enumerate() {
        *s >>= if i % 2 == 0 { sh1 } else { sh2 };
    }

    let mut a = seeds[0] * x + seeds[1] * y + (rnum >> 14);
    let mut b = seeds[2] * x + seeds[3] * y + (rnum >> 10);
    let mut c = seeds[4] * x + seeds[5] * y + (rnum >> 6);
    let mut d = seeds[6] * x + seeds[7] * y + (rnum >> 2);

    a &= 0x3F;
    b &= 0x3F;
    c &= 0x3F;
    d &= 0x3F;

    if partition_count < 4 {
        d = 0;
    }

    if partition_count < 3 {
        c = 0;
    }

    if a >= b && a >= c && a >= d {
        0
    } else if b >= c && b >= d {
        1
    } else if c >= d {
        2
    } else {
        3
    }
}
