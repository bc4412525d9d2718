//! Block footprints.

use crate::error::Error;

/// Largest number of texels in one block (12x12).
pub const MAX_BLOCK_TEXELS: usize = 144;

/// Dimensions of one ASTC block in texels.
///
/// Only the 14 two dimensional footprints of the ASTC format can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Footprint {
    block_width: u32,
    block_height: u32,
}

impl Footprint {
    pub const F4X4: Footprint = Footprint {
        block_width: 4,
        block_height: 4,
    };
    pub const F5X4: Footprint = Footprint {
        block_width: 5,
        block_height: 4,
    };
    pub const F5X5: Footprint = Footprint {
        block_width: 5,
        block_height: 5,
    };
    pub const F6X5: Footprint = Footprint {
        block_width: 6,
        block_height: 5,
    };
    pub const F6X6: Footprint = Footprint {
        block_width: 6,
        block_height: 6,
    };
    pub const F8X5: Footprint = Footprint {
        block_width: 8,
        block_height: 5,
    };
    pub const F8X6: Footprint = Footprint {
        block_width: 8,
        block_height: 6,
    };
    pub const F10X5: Footprint = Footprint {
        block_width: 10,
        block_height: 5,
    };
    pub const F10X6: Footprint = Footprint {
        block_width: 10,
        block_height: 6,
    };
    pub const F8X8: Footprint = Footprint {
        block_width: 8,
        block_height: 8,
    };
    pub const F10X8: Footprint = Footprint {
        block_width: 10,
        block_height: 8,
    };
    pub const F10X10: Footprint = Footprint {
        block_width: 10,
        block_height: 10,
    };
    pub const F12X10: Footprint = Footprint {
        block_width: 12,
        block_height: 10,
    };
    pub const F12X12: Footprint = Footprint {
        block_width: 12,
        block_height: 12,
    };

    /// Every legal footprint, smallest first.
    pub const ALL: [Footprint; 14] = [
        Footprint::F4X4,
        Footprint::F5X4,
        Footprint::F5X5,
        Footprint::F6X5,
        Footprint::F6X6,
        Footprint::F8X5,
        Footprint::F8X6,
        Footprint::F10X5,
        Footprint::F10X6,
        Footprint::F8X8,
        Footprint::F10X8,
        Footprint::F10X10,
        Footprint::F12X10,
        Footprint::F12X12,
    ];

    pub fn new(block_width: u32, block_height: u32) -> Result<Footprint, Error> {
        let footprint = Footprint {
            block_width,
            block_height,
        };
        if Footprint::ALL.contains(&footprint) {
            Ok(footprint)
        } else {
            Err(Error::InvalidFootprint {
                width: block_width,
                height: block_height,
            })
        }
    }

    pub fn block_width(&self) -> u32 {
        self.block_width
    }

    pub fn block_height(&self) -> u32 {
        self.block_height
    }

    pub fn num_texels(&self) -> usize {
        (self.block_width * self.block_height) as usize
    }

    /// Number of blocks needed to cover a `width` x `height` image.
    pub fn blocks_for(&self, width: u32, height: u32) -> (u32, u32) {
        (
            width.div_ceil(self.block_width),
            height.div_ceil(self.block_height),
        )
    }
}

/// The ASTC 2D LDR texture formats, named by footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstcFormat {
    Astc4x4,
    Astc5x4,
    Astc5x5,
    Astc6x5,
    Astc6x6,
    Astc8x5,
    Astc8x6,
    Astc8x8,
    Astc10x5,
    Astc10x6,
    Astc10x8,
    Astc10x10,
    Astc12x10,
    Astc12x12,
}

impl AstcFormat {
    pub fn footprint(self) -> Footprint {
        match self {
            AstcFormat::Astc4x4 => Footprint::F4X4,
            AstcFormat::Astc5x4 => Footprint::F5X4,
            AstcFormat::Astc5x5 => Footprint::F5X5,
            AstcFormat::Astc6x5 => Footprint::F6X5,
            AstcFormat::Astc6x6 => Footprint::F6X6,
            AstcFormat::Astc8x5 => Footprint::F8X5,
            AstcFormat::Astc8x6 => Footprint::F8X6,
            AstcFormat::Astc8x8 => Footprint::F8X8,
            AstcFormat::Astc10x5 => Footprint::F10X5,
            AstcFormat::Astc10x6 => Footprint::F10X6,
            AstcFormat::Astc10x8 => Footprint::F10X8,
            AstcFormat::Astc10x10 => Footprint::F10X10,
            AstcFormat::Astc12x10 => Footprint::F12X10,
            AstcFormat::Astc12x12 => Footprint::F12X12,
        }
    }
}

impl From<AstcFormat> for Footprint {
    fn from(format: AstcFormat) -> Footprint {
        format.footprint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(4, 4)]
    #[case(5, 4)]
    #[case(6, 6)]
    #[case(10, 5)]
    #[case(12, 12)]
    fn accepts_astc_footprints(#[case] w: u32, #[case] h: u32) {
        let fp = Footprint::new(w, h).unwrap();
        assert_eq!((fp.block_width(), fp.block_height()), (w, h));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(4, 5)]
    #[case(3, 3)]
    #[case(7, 7)]
    #[case(16, 16)]
    fn rejects_other_sizes(#[case] w: u32, #[case] h: u32) {
        match Footprint::new(w, h) {
            Err(Error::InvalidFootprint { width, height }) => assert_eq!((width, height), (w, h)),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn formats_cover_every_footprint() {
        let formats = [
            AstcFormat::Astc4x4,
            AstcFormat::Astc5x4,
            AstcFormat::Astc5x5,
            AstcFormat::Astc6x5,
            AstcFormat::Astc6x6,
            AstcFormat::Astc8x5,
            AstcFormat::Astc8x6,
            AstcFormat::Astc8x8,
            AstcFormat::Astc10x5,
            AstcFormat::Astc10x6,
            AstcFormat::Astc10x8,
            AstcFormat::Astc10x10,
            AstcFormat::Astc12x10,
            AstcFormat::Astc12x12,
        ];
        let mut footprints: Vec<Footprint> = formats.iter().map(|f| Footprint::from(*f)).collect();
        footprints.sort();
        let mut all = Footprint::ALL.to_vec();
        all.sort();
        assert_eq!(footprints, all);
        assert!(all.iter().all(|fp| fp.num_texels() <= MAX_BLOCK_TEXELS));
    }

    #[test]
    fn block_counts_round_up() {
        assert_eq!(Footprint::F4X4.blocks_for(8, 8), (2, 2));
        assert_eq!(Footprint::F6X5.blocks_for(13, 5), (3, 1));
        assert_eq!(Footprint::F12X12.blocks_for(1, 1), (1, 1));
    }
}
