//! Decoding of one 128-bit block.

use crate::bitstream::{replicate, BitReader};
use crate::block_mode::{decode_block_mode, BlockMode, TexelWeightParams};
use crate::color::{compute_endpoints, decode_color_values, Endpoints, MAX_COLOR_VALUES};
use crate::error::BlockError;
use crate::footprint::{Footprint, MAX_BLOCK_TEXELS};
use crate::integer_sequence::{decode_integer_sequence, MAX_SEQUENCE_VALUES};
use crate::partition::{select_2d_partition, MAX_PARTITIONS};
use crate::weights::infill_weights;
use log::trace;

/// Size in bytes of one compressed block.
pub const BLOCK_SIZE: usize = 16;

/// Colour written to every texel of a block that fails to decode.
pub const ERROR_COLOR: [u8; 4] = [0xFF, 0x00, 0xFF, 0xFF];

// Weight payloads outside this range are illegal.
const MIN_WEIGHT_BITS: u32 = 24;
const MAX_WEIGHT_BITS: u32 = 96;

// Integer sequences always decode whole trit/quint blocks, which can run
// past the end of the 128-bit block. The tail reads zeros.
type ScratchBits = [u8; 2 * BLOCK_SIZE];

fn low_bits(value: u128, n_bits: u32) -> u128 {
    match n_bits {
        0 => 0,
        n if n >= 128 => value,
        n => value & ((1u128 << n) - 1),
    }
}

fn field(value: u128, start: u32, n_bits: u32) -> u32 {
    low_bits(value >> start, n_bits) as u32
}

fn scratch(bits: u128) -> ScratchBits {
    let mut out = [0; 2 * BLOCK_SIZE];
    out[..BLOCK_SIZE].copy_from_slice(&bits.to_le_bytes());
    out
}

fn fill_void_extent_ldr<F: FnMut(u32, u32, [u8; 4])>(
    strm: &mut BitReader,
    writer: &mut F,
    footprint: Footprint,
) -> Result<(), BlockError> {
    strm.read_bit();

    // min_s, max_s, min_t, max_t. All ones means the extent is unspecified.
    let mut coords = [0; 4];
    for c in &mut coords {
        *c = strm.read_bits(13);
    }
    let unspecified = coords.iter().all(|&c| c == 0x1FFF);
    if !unspecified && (coords[0] >= coords[1] || coords[2] >= coords[3]) {
        return Err(BlockError::InvalidVoidExtent);
    }

    // Colour is UNORM16; keep the high byte.
    let r = strm.read_bits(16) >> 8;
    let g = strm.read_bits(16) >> 8;
    let b = strm.read_bits(16) >> 8;
    let a = strm.read_bits(16) >> 8;

    for j in 0..footprint.block_height() {
        for i in 0..footprint.block_width() {
            writer(i, j, [r as u8, g as u8, b as u8, a as u8]);
        }
    }

    Ok(())
}

fn fill_error<F: FnMut(u32, u32, [u8; 4])>(writer: &mut F, footprint: Footprint) {
    for j in 0..footprint.block_height() {
        for i in 0..footprint.block_width() {
            writer(i, j, ERROR_COLOR);
        }
    }
}

fn check_weight_grid(params: &TexelWeightParams, footprint: Footprint) -> Result<(), BlockError> {
    if params.width > footprint.block_width() || params.height > footprint.block_height() {
        return Err(BlockError::OversizedGrid {
            grid_width: params.width,
            grid_height: params.height,
            block_width: footprint.block_width(),
            block_height: footprint.block_height(),
        });
    }

    let n_weights = params.num_weight_values();
    if n_weights as usize > MAX_SEQUENCE_VALUES {
        return Err(BlockError::TooManyWeights(n_weights));
    }

    let n_weight_bits = params.packed_bit_size();
    if !(MIN_WEIGHT_BITS..=MAX_WEIGHT_BITS).contains(&n_weight_bits) {
        return Err(BlockError::WeightBitsOutOfRange(n_weight_bits));
    }

    Ok(())
}

/// Decodes one block, calling `writer(x, y, rgba)` for every texel of the
/// footprint.
///
/// Every check runs before the first texel is written, so `writer` is never
/// called when this returns an error.
pub fn try_decode_block<F: FnMut(u32, u32, [u8; 4])>(
    block: &[u8; BLOCK_SIZE],
    footprint: Footprint,
    mut writer: F,
) -> Result<(), BlockError> {
    let block_width = footprint.block_width();
    let block_height = footprint.block_height();
    let raw = u128::from_le_bytes(*block);

    let mut strm = BitReader::new(block);
    let weight_params = match decode_block_mode(&mut strm) {
        BlockMode::Reserved => return Err(BlockError::MalformedHeader(field(raw, 0, 11) as u16)),
        BlockMode::VoidExtent { hdr: true } => return Err(BlockError::HdrVoidExtent),
        BlockMode::VoidExtent { hdr: false } => {
            // Bits 10 and 11 are reserved and must be set.
            if field(raw, 10, 2) != 3 {
                return Err(BlockError::ReservedVoidExtent);
            }
            return fill_void_extent_ldr(&mut strm, &mut writer, footprint);
        }
        BlockMode::Weights(params) => params,
    };

    check_weight_grid(&weight_params, footprint)?;

    let n_partitions = (strm.read_bits(2) + 1) as usize;
    if n_partitions == MAX_PARTITIONS && weight_params.is_dual_plane {
        return Err(BlockError::IncompatibleDualPlane);
    }

    let mut partition_index = 0;
    let mut endpoint_modes = [0; MAX_PARTITIONS];
    let mut base_cem = 0;
    if n_partitions == 1 {
        endpoint_modes[0] = strm.read_bits(4);
    } else {
        partition_index = strm.read_bits(10);
        base_cem = strm.read_bits(6);
    }
    let base_mode = base_cem & 3;

    // Extra CEM bits sit right below the weights and the plane selector
    // right below those.
    let n_weight_bits = weight_params.packed_bit_size();
    let extra_cem_bits = if base_mode != 0 {
        3 * n_partitions as u32 - 4
    } else {
        0
    };
    let plane_selector_bits = if weight_params.is_dual_plane { 2 } else { 0 };

    let extra_cem_start = 128 - n_weight_bits - extra_cem_bits;
    let plane_selector_start = extra_cem_start - plane_selector_bits;
    let color_start = strm.bits_read() as u32;
    let color_data_bits = plane_selector_start.saturating_sub(color_start);

    let plane_idx = field(raw, plane_selector_start, plane_selector_bits);

    if base_mode != 0 {
        let extra_cem = field(raw, extra_cem_start, extra_cem_bits);
        let mut cem = (extra_cem << 6) | base_cem;
        cem >>= 2;

        let mut c = [false; MAX_PARTITIONS];
        for c in &mut c[..n_partitions] {
            *c = (cem & 1) != 0;
            cem >>= 1;
        }

        let mut m = [0; MAX_PARTITIONS];
        for m in &mut m[..n_partitions] {
            *m = cem & 3;
            cem >>= 2;
        }

        for (i, endpoint_mode) in endpoint_modes[..n_partitions].iter_mut().enumerate() {
            *endpoint_mode = base_mode;
            if !c[i] {
                *endpoint_mode -= 1;
            }
            *endpoint_mode <<= 2;
            *endpoint_mode |= m[i];
        }
    } else if n_partitions > 1 {
        let cem = base_cem >> 2;
        endpoint_modes[..n_partitions].fill(cem);
    }
    debug_assert!(endpoint_modes.iter().all(|&m| m < 16));

    let color_data = scratch(low_bits(raw >> color_start, color_data_bits));
    let mut color_values = [0; MAX_COLOR_VALUES];
    decode_color_values(
        &mut color_values,
        &color_data,
        &endpoint_modes[..n_partitions],
        color_data_bits,
    )?;

    let mut endpoints: [Endpoints; MAX_PARTITIONS] = [[[0; 4]; 2]; MAX_PARTITIONS];
    let mut color_values_ptr = &color_values[..];
    for (endpoint, &mode) in endpoints.iter_mut().zip(&endpoint_modes[..n_partitions]) {
        *endpoint = compute_endpoints(&mut color_values_ptr, mode)?;
    }

    // Weights are stored bit reversed from the top of the block, and the
    // bits above the weight payload belong to other fields.
    let weight_data = scratch(low_bits(raw.reverse_bits(), n_weight_bits));
    let mut weight_stream = BitReader::new(&weight_data);
    let n_weights = weight_params.num_weight_values();
    let texel_weight_values =
        decode_integer_sequence(&mut weight_stream, weight_params.max_weight, n_weights);
    let weights = infill_weights(
        &texel_weight_values[..n_weights as usize],
        &weight_params,
        footprint,
    );

    let small_block = block_width * block_height < 32;
    for j in 0..block_height {
        for i in 0..block_width {
            let partition =
                select_2d_partition(partition_index, i, j, n_partitions, small_block);
            debug_assert!(partition < n_partitions);

            let mut p = [0; 4];
            for (c, p) in p.iter_mut().enumerate() {
                let c0 = replicate(u32::from(endpoints[partition][0][c]), 8, 16);
                let c1 = replicate(u32::from(endpoints[partition][1][c]), 8, 16);

                let mut plane = 0;
                if weight_params.is_dual_plane && (plane_idx == c as u32) {
                    plane = 1;
                }

                let weight = weights[plane][(j * block_width + i) as usize];
                let color = (c0 * (64 - weight) + c1 * weight + 32) / 64;
                *p = (color >> 8) as u8;
            }

            writer(i, j, p);
        }
    }

    Ok(())
}

/// Decodes one block, calling `writer(x, y, rgba)` for every texel of the
/// footprint.
///
/// Blocks that fail to decode, HDR content included, write [`ERROR_COLOR`]
/// to every texel and return `false`.
pub fn astc_decode_block<F: FnMut(u32, u32, [u8; 4])>(
    block: &[u8; BLOCK_SIZE],
    footprint: Footprint,
    mut writer: F,
) -> bool {
    match try_decode_block(block, footprint, &mut writer) {
        Ok(()) => true,
        Err(err) => {
            trace!("block {:02x?} decoded to the error colour: {}", block, err);
            fill_error(&mut writer, footprint);
            false
        }
    }
}

/// Texels of one decoded block, row-major, packed as `u32` with red in the
/// least significant byte.
#[derive(Clone)]
pub struct DecodedBlock {
    texels: [u32; MAX_BLOCK_TEXELS],
    footprint: Footprint,
    is_error: bool,
}

impl DecodedBlock {
    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    /// Whether the block was replaced by the error colour.
    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn texels(&self) -> &[u32] {
        &self.texels[..self.footprint.num_texels()]
    }

    pub fn texel(&self, x: u32, y: u32) -> u32 {
        assert!(x < self.footprint.block_width() && y < self.footprint.block_height());
        self.texels[(y * self.footprint.block_width() + x) as usize]
    }

    pub fn texel_rgba(&self, x: u32, y: u32) -> [u8; 4] {
        self.texel(x, y).to_le_bytes()
    }
}

impl std::fmt::Debug for DecodedBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedBlock")
            .field("footprint", &self.footprint)
            .field("is_error", &self.is_error)
            .field("texels", &self.texels())
            .finish()
    }
}

/// Decodes one block into packed texels.
pub fn decode_block(block: &[u8; BLOCK_SIZE], footprint: Footprint) -> DecodedBlock {
    let mut texels = [0; MAX_BLOCK_TEXELS];
    let block_width = footprint.block_width();
    let ok = astc_decode_block(block, footprint, |x, y, v| {
        texels[(y * block_width + x) as usize] = u32::from_le_bytes(v);
    });
    DecodedBlock {
        texels,
        footprint,
        is_error: !ok,
    }
}
