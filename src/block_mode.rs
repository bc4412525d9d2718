//! The 11-bit block mode header, ASTC tables C.2.7 and C.2.8.

use crate::bitstream::BitReader;
use crate::integer_sequence::encoding_for;

const VOID_EXTENT_MASK: u32 = 0x1FF;
const VOID_EXTENT_BITS: u32 = 0x1FC;

const MAX_WEIGHTS_LOW: [u32; 6] = [1, 2, 3, 4, 5, 7];
const MAX_WEIGHTS_HIGH: [u32; 6] = [9, 11, 15, 19, 23, 31];

/// One row of table C.2.8: a header matches when `mode & mask == value`.
struct LayoutRow {
    mask: u32,
    value: u32,
    layout: u32,
}

// Bits 0..1 non-zero. Decided by bits 2, 3 and 8.
static LAYOUTS_LOW_R: [LayoutRow; 5] = [
    LayoutRow { mask: 0x00C, value: 0x000, layout: 0 },
    LayoutRow { mask: 0x00C, value: 0x004, layout: 1 },
    LayoutRow { mask: 0x00C, value: 0x008, layout: 2 },
    LayoutRow { mask: 0x10C, value: 0x00C, layout: 3 },
    LayoutRow { mask: 0x10C, value: 0x10C, layout: 4 },
];

// Bits 0..1 zero. Decided by bits 5, 7 and 8; bit 6 is zero for layouts 7
// and 8 once reserved headers are filtered out.
static LAYOUTS_HIGH_R: [LayoutRow; 5] = [
    LayoutRow { mask: 0x180, value: 0x000, layout: 5 },
    LayoutRow { mask: 0x180, value: 0x080, layout: 6 },
    LayoutRow { mask: 0x1E0, value: 0x180, layout: 7 },
    LayoutRow { mask: 0x1E0, value: 0x1A0, layout: 8 },
    LayoutRow { mask: 0x180, value: 0x100, layout: 9 },
];

/// Weight grid description of a normal (non void-extent) block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TexelWeightParams {
    pub width: u32,
    pub height: u32,
    pub is_dual_plane: bool,
    pub max_weight: u32,
    /// Row of table C.2.8 the header matched, `0..=9`.
    pub layout: u32,
    /// The `R` weight range selector, `2..=7`.
    pub range_selector: u32,
    pub is_high_precision: bool,
}

impl TexelWeightParams {
    pub fn num_weight_values(&self) -> u32 {
        let mut ret = self.width * self.height;
        if self.is_dual_plane {
            ret *= 2;
        }
        ret
    }

    /// Size in bits of the weight payload.
    pub fn packed_bit_size(&self) -> u32 {
        encoding_for(self.max_weight).bit_length(self.num_weight_values())
    }

    /// Rebuilds the 11 header bits this description was decoded from.
    pub fn encode(&self) -> u16 {
        let (w, h) = (self.width, self.height);
        let r = self.range_selector;
        let mut bits = (r & 1) << 4;
        if self.layout < 5 {
            bits |= r >> 1;
        } else {
            bits |= (r >> 1) << 2;
        }
        if self.layout != 9 {
            bits |= (self.is_high_precision as u32) << 9;
            bits |= (self.is_dual_plane as u32) << 10;
        }

        bits |= match self.layout {
            0 => ((w - 4) << 7) | ((h - 2) << 5),
            1 => 0x004 | ((w - 8) << 7) | ((h - 2) << 5),
            2 => 0x008 | ((h - 8) << 7) | ((w - 2) << 5),
            3 => 0x00C | ((h - 6) << 7) | ((w - 2) << 5),
            4 => 0x10C | ((w - 2) << 7) | ((h - 2) << 5),
            5 => (h - 2) << 5,
            6 => 0x080 | ((w - 2) << 5),
            7 => 0x180,
            8 => 0x1A0,
            9 => 0x100 | ((h - 6) << 9) | ((w - 6) << 5),
            _ => unreachable!("layout {} out of range", self.layout),
        };

        bits as u16
    }
}

/// Result of parsing a block mode header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockMode {
    /// Constant colour block. No weight grid or partition fields follow.
    VoidExtent { hdr: bool },
    /// Reserved header pattern.
    Reserved,
    Weights(TexelWeightParams),
}

fn select_layout(mode_bits: u32) -> u32 {
    let rows = if mode_bits & 0x3 != 0 {
        &LAYOUTS_LOW_R
    } else {
        &LAYOUTS_HIGH_R
    };
    let row = rows.iter().find(|row| mode_bits & row.mask == row.value);
    match row {
        Some(row) => row.layout,
        None => unreachable!("block mode {:#05x} matches no layout", mode_bits),
    }
}

/// Decodes the block mode from the 11 bits at the reader's position.
pub fn decode_block_mode(strm: &mut BitReader) -> BlockMode {
    decode_mode_bits(strm.read_bits(11))
}

/// Decodes an 11-bit block mode value.
pub fn decode_mode_bits(mode_bits: u32) -> BlockMode {
    debug_assert!(mode_bits < 0x800);

    if (mode_bits & VOID_EXTENT_MASK) == VOID_EXTENT_BITS {
        return BlockMode::VoidExtent {
            hdr: mode_bits & 0x200 != 0,
        };
    }

    // Reserved: low nibble clear,
    if (mode_bits & 0xF) == 0 {
        return BlockMode::Reserved;
    }

    // or low two bits clear with bits 6..8 set.
    if (mode_bits & 0x3) == 0 && (mode_bits & 0x1C0) == 0x1C0 {
        return BlockMode::Reserved;
    }

    let layout = select_layout(mode_bits);

    let mut r = (mode_bits & 0x10) >> 4;
    if layout < 5 {
        r |= (mode_bits & 0x3) << 1;
    } else {
        r |= (mode_bits & 0xC) >> 1;
    }
    debug_assert!((2..=7).contains(&r));

    let a = (mode_bits >> 5) & 0x3;
    let b = (mode_bits >> 7) & 0x3;
    let (width, height) = match layout {
        0 => (b + 4, a + 2),
        1 => (b + 8, a + 2),
        2 => (a + 2, b + 8),
        3 => (a + 2, (b & 0x1) + 6),
        4 => ((b & 0x1) + 2, a + 2),
        5 => (12, a + 2),
        6 => (a + 2, 12),
        7 => (6, 10),
        8 => (10, 6),
        9 => (a + 6, ((mode_bits >> 9) & 0x3) + 6),
        _ => unreachable!("layout {} out of range", layout),
    };

    // Layout 9 stores its height in the bits others use for D and H.
    let is_dual_plane = layout != 9 && (mode_bits & 0x400) != 0;
    let is_high_precision = layout != 9 && (mode_bits & 0x200) != 0;

    let max_weight = if is_high_precision {
        MAX_WEIGHTS_HIGH[(r - 2) as usize]
    } else {
        MAX_WEIGHTS_LOW[(r - 2) as usize]
    };

    BlockMode::Weights(TexelWeightParams {
        width,
        height,
        is_dual_plane,
        max_weight,
        layout,
        range_selector: r,
        is_high_precision,
    })
}
