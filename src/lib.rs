//! Software decoder for ASTC compressed textures.
//!
//! Decodes 2D LDR blocks of all 14 ASTC footprints into 8-bit RGBA. Blocks
//! that cannot be decoded, HDR blocks among them, come out as
//! [`ERROR_COLOR`], the magenta that hardware decoders produce for them.
//!
//! ```
//! use astc_block_decode::{decode_block, Footprint};
//!
//! // A constant colour (void extent) block of opaque red.
//! let bits: u128 = 0xDFC | (((1 << 52) - 1) << 12) | (0xFF00 << 64) | (0xFFFF << 112);
//! let decoded = decode_block(&bits.to_le_bytes(), Footprint::F6X6);
//! assert!(!decoded.is_error());
//! assert_eq!(decoded.texel_rgba(5, 5), [0xFF, 0x00, 0x00, 0xFF]);
//! ```

mod bitstream;
mod block;
mod block_mode;
mod color;
mod error;
mod footprint;
mod image;
mod integer_sequence;
mod partition;
mod weights;

pub use bitstream::BitReader;
pub use block::{
    astc_decode_block, decode_block, try_decode_block, DecodedBlock, BLOCK_SIZE, ERROR_COLOR,
};
pub use block_mode::{decode_block_mode, decode_mode_bits, BlockMode, TexelWeightParams};
pub use error::{BlockError, Error};
pub use footprint::{AstcFormat, Footprint, MAX_BLOCK_TEXELS};
pub use image::{astc_decode, compressed_size, decode_image, decode_image_into};
pub use integer_sequence::{
    create_encoding, decode_integer_sequence, encoding_for, IntegerEncodedFormat,
    IntegerEncodedValue, IntegerEncoding, IntegerEncodingType, IntegerSequence,
    MAX_SEQUENCE_VALUES,
};
