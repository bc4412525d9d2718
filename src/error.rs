//! Error types.

use thiserror::Error;

/// Reasons a single block decodes to the error colour.
///
/// These never escape the image level entry points; a failing block is
/// replaced by magenta and decoding carries on with the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BlockError {
    /// The block mode header is a reserved bit pattern.
    #[error("reserved block mode {0:#05x}")]
    MalformedHeader(u16),

    /// The weight grid is larger than the block footprint.
    #[error("{grid_width}x{grid_height} weight grid does not fit a {block_width}x{block_height} block")]
    OversizedGrid {
        grid_width: u32,
        grid_height: u32,
        block_width: u32,
        block_height: u32,
    },

    /// Dual plane weights were combined with four partitions.
    #[error("dual plane blocks cannot have four partitions")]
    IncompatibleDualPlane,

    #[error("{0} weights exceed the limit of 64 per block")]
    TooManyWeights(u32),

    #[error("weight payload of {0} bits is outside 24..=96")]
    WeightBitsOutOfRange(u32),

    #[error("{0} colour endpoint values exceed the limit of 18 per block")]
    TooManyColorValues(u32),

    /// Fewer bits are left for colour endpoints than the coarsest range needs.
    #[error("{available} bits cannot hold {values} colour endpoint values")]
    InsufficientColorBits { values: u32, available: u32 },

    /// HDR colour endpoint modes are not decoded.
    #[error("unsupported colour endpoint mode {0}")]
    UnsupportedEndpointMode(u32),

    #[error("HDR void extent blocks are not supported")]
    HdrVoidExtent,

    /// The two bits after a void extent header must be set.
    #[error("void extent block with cleared reserved bits")]
    ReservedVoidExtent,

    /// The void extent coordinates are set but describe an empty area.
    #[error("void extent block with an empty extent")]
    InvalidVoidExtent,
}

/// Errors returned by the public decoding API.
#[derive(Debug, Error)]
pub enum Error {
    /// Not one of the 14 two dimensional ASTC block footprints.
    #[error("invalid ASTC footprint {width}x{height}")]
    InvalidFootprint { width: u32, height: u32 },

    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The compressed input is shorter than the image requires.
    #[error("input too small: need {needed} bytes, but only {actual} bytes available")]
    InputTooSmall { needed: usize, actual: usize },

    /// The output buffer is shorter than the image requires.
    #[error("output buffer too small: need {needed} bytes, but only {actual} bytes available")]
    OutputTooSmall { needed: usize, actual: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
