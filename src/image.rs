//! Whole image decoding.

use crate::block::{astc_decode_block, BLOCK_SIZE};
use crate::error::Error;
use crate::footprint::Footprint;
use log::debug;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::io::Read;

/// Bytes of compressed data covering a `width` x `height` image.
pub fn compressed_size(width: u32, height: u32, footprint: Footprint) -> usize {
    let (blocks_wide, blocks_high) = footprint.blocks_for(width, height);
    blocks_wide as usize * blocks_high as usize * BLOCK_SIZE
}

// Returns the size in bytes of the RGBA8 image.
fn decoded_size(width: u32, height: u32) -> Result<usize, Error> {
    let invalid = Error::InvalidDimensions { width, height };
    if width == 0 || height == 0 {
        return Err(invalid);
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or(invalid)
}

/// Decodes an image streamed from `input`, calling `writer(x, y, rgba)` for
/// every texel inside the image.
///
/// Blocks are read in raster order, 16 bytes each. Texels of edge blocks
/// that fall outside the image are dropped.
pub fn astc_decode<R: Read, F: FnMut(u32, u32, [u8; 4])>(
    mut input: R,
    width: u32,
    height: u32,
    footprint: Footprint,
    mut writer: F,
) -> Result<(), Error> {
    decoded_size(width, height)?;

    let block_width = footprint.block_width();
    let block_height = footprint.block_height();
    let (blocks_wide, blocks_high) = footprint.blocks_for(width, height);
    debug!(
        "decoding {}x{} image from {}x{} blocks of {}x{}",
        width, height, blocks_wide, blocks_high, block_width, block_height
    );

    let mut failed = 0;
    for by in 0..blocks_high {
        for bx in 0..blocks_wide {
            let mut block_buf = [0; BLOCK_SIZE];
            input.read_exact(&mut block_buf)?;
            let ok = astc_decode_block(&block_buf, footprint, |x, y, v| {
                let x = bx * block_width + x;
                let y = by * block_height + y;
                if x < width && y < height {
                    writer(x, y, v)
                }
            });
            if !ok {
                failed += 1;
            }
        }
    }

    if failed > 0 {
        debug!("{} blocks decoded to the error colour", failed);
    }

    Ok(())
}

/// Decodes an image in memory into row-major RGBA8.
///
/// * `data`   - The compressed blocks in raster order
/// * `width`  - The width of the image in texels
/// * `height` - The height of the image in texels
/// * `output` - At least `width * height * 4` bytes of storage
pub fn decode_image_into(
    data: &[u8],
    width: u32,
    height: u32,
    footprint: Footprint,
    output: &mut [u8],
) -> Result<(), Error> {
    let output_size = decoded_size(width, height)?;
    let input_size = compressed_size(width, height, footprint);
    if data.len() < input_size {
        return Err(Error::InputTooSmall {
            needed: input_size,
            actual: data.len(),
        });
    }
    if output.len() < output_size {
        return Err(Error::OutputTooSmall {
            needed: output_size,
            actual: output.len(),
        });
    }

    let (blocks_wide, blocks_high) = footprint.blocks_for(width, height);
    debug!(
        "decoding {}x{} image from {}x{} blocks of {}x{}",
        width,
        height,
        blocks_wide,
        blocks_high,
        footprint.block_width(),
        footprint.block_height()
    );

    let width = width as usize;
    let blocks_wide = blocks_wide as usize;
    let block_width = footprint.block_width() as usize;
    let block_height = footprint.block_height() as usize;

    let row_bytes = width * 4;
    let output = &mut output[..output_size];

    #[cfg(feature = "rayon")]
    let output_rows = output.par_chunks_mut(row_bytes * block_height);
    #[cfg(not(feature = "rayon"))]
    let output_rows = output.chunks_mut(row_bytes * block_height);

    // loop over rows of blocks
    let failed: usize = output_rows
        .enumerate()
        .map(|(by, output_row)| {
            let rows = output_row.len() / row_bytes;
            let mut failed = 0;
            for bx in 0..blocks_wide {
                let bidx = (bx + by * blocks_wide) * BLOCK_SIZE;
                let mut block = [0; BLOCK_SIZE];
                block.copy_from_slice(&data[bidx..bidx + BLOCK_SIZE]);

                let ok = astc_decode_block(&block, footprint, |x, y, v| {
                    let sx = bx * block_width + x as usize;
                    let sy = y as usize;
                    if sx < width && sy < rows {
                        let i = 4 * (sx + sy * width);
                        output_row[i..i + 4].copy_from_slice(&v);
                    }
                });
                if !ok {
                    failed += 1;
                }
            }
            failed
        })
        .sum();

    if failed > 0 {
        debug!("{} blocks decoded to the error colour", failed);
    }

    Ok(())
}

/// Decodes an image in memory into a new row-major RGBA8 buffer.
pub fn decode_image(
    data: &[u8],
    width: u32,
    height: u32,
    footprint: Footprint,
) -> Result<Vec<u8>, Error> {
    let mut output = vec![0; decoded_size(width, height)?];
    decode_image_into(data, width, height, footprint, &mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ERROR_COLOR;
    use ::image::{Pixel, Rgba, RgbaImage};

    fn void_extent(rgba: [u8; 4]) -> [u8; 16] {
        let mut bits = 0xDFC | (((1u128 << 52) - 1) << 12);
        for (i, &c) in rgba.iter().enumerate() {
            bits |= u128::from(c) << (72 + 16 * i);
        }
        bits.to_le_bytes()
    }

    // Luminance ramp 0, 84, 171, 255 along x in a 4x4 grid.
    fn gradient() -> [u8; 16] {
        let bits = 0x042 | 255 << 25 | 0xE4E4_E4E4u128.reverse_bits();
        bits.to_le_bytes()
    }

    const GRADIENT: [u8; 4] = [0, 84, 171, 255];

    fn psnr(a: &RgbaImage, b: &RgbaImage) -> f64 {
        assert_eq!(a.dimensions(), b.dimensions());
        let mut sum = 0.0;
        let mut n = 0.0;
        for (p, q) in a.pixels().zip(b.pixels()) {
            for (&x, &y) in p.channels().iter().zip(q.channels()) {
                let d = f64::from(x) - f64::from(y);
                sum += d * d;
                n += 1.0;
            }
        }
        let mse = sum / n;
        if mse == 0.0 {
            f64::INFINITY
        } else {
            10.0 * (255.0 * 255.0 / mse).log10()
        }
    }

    // 3x2 blocks of 4x4 covering a 10x7 image: gradients on the diagonal,
    // solid colours elsewhere.
    fn test_image() -> (Vec<u8>, RgbaImage) {
        let solid = [[200, 10, 30, 255], [0, 128, 255, 64], [17, 17, 17, 17], [1, 2, 3, 4]];
        let mut data = vec![];
        let mut solid_iter = solid.iter();
        let mut colors = vec![];
        for by in 0..2 {
            for bx in 0..3 {
                if bx == by {
                    data.extend_from_slice(&gradient());
                    colors.push(None);
                } else {
                    let c = *solid_iter.next().unwrap();
                    data.extend_from_slice(&void_extent(c));
                    colors.push(Some(c));
                }
            }
        }

        let expected = RgbaImage::from_fn(10, 7, |x, y| {
            match colors[(y / 4 * 3 + x / 4) as usize] {
                Some(c) => Rgba(c),
                None => {
                    let l = GRADIENT[(x % 4) as usize];
                    Rgba([l, l, l, 255])
                }
            }
        });

        (data, expected)
    }

    #[test]
    fn decodes_synthetic_image() {
        let (data, expected) = test_image();
        assert_eq!(data.len(), compressed_size(10, 7, Footprint::F4X4));

        let decoded = decode_image(&data, 10, 7, Footprint::F4X4).unwrap();
        let decoded = RgbaImage::from_raw(10, 7, decoded).unwrap();
        assert!(psnr(&decoded, &expected) > 60.0);
        assert_eq!(decoded, expected);
    }

    #[test]
    fn streaming_matches_buffer_decode() {
        let (data, expected) = test_image();
        let mut streamed = RgbaImage::new(10, 7);
        let mut calls = 0;
        astc_decode(&data[..], 10, 7, Footprint::F4X4, |x, y, v| {
            assert!(x < 10 && y < 7);
            streamed.put_pixel(x, y, Rgba(v));
            calls += 1;
        })
        .unwrap();
        assert_eq!(calls, 70);
        assert_eq!(streamed, expected);
    }

    #[test]
    fn failed_blocks_are_error_colored() {
        let mut data = vec![0; 16];
        data.extend_from_slice(&void_extent([9, 9, 9, 9]));
        let decoded = decode_image(&data, 12, 6, Footprint::F6X6).unwrap();
        for y in 0..6 {
            for x in 0..12 {
                let i = 4 * (y * 12 + x);
                let expected = if x < 6 { ERROR_COLOR } else { [9, 9, 9, 9] };
                assert_eq!(decoded[i..i + 4], expected);
            }
        }
    }

    #[test]
    fn output_beyond_the_image_is_untouched() {
        let data = void_extent([1, 1, 1, 1]);
        let mut output = vec![0xAA; 5 * 5 * 4 + 8];
        decode_image_into(&data, 5, 5, Footprint::F5X5, &mut output).unwrap();
        assert!(output[..100].iter().all(|&b| b == 1));
        assert!(output[100..].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(
            decode_image(&[], 0, 4, Footprint::F4X4),
            Err(Error::InvalidDimensions { width: 0, height: 4 })
        ));
        assert!(matches!(
            astc_decode(&[0u8; 0][..], 4, 0, Footprint::F4X4, |_, _, _| ()),
            Err(Error::InvalidDimensions { width: 4, height: 0 })
        ));
    }

    #[test]
    fn rejects_short_buffers() {
        let data = vec![0; 16 * 3];
        assert!(matches!(
            decode_image(&data, 8, 8, Footprint::F4X4),
            Err(Error::InputTooSmall {
                needed: 64,
                actual: 48
            })
        ));

        let mut output = vec![0; 127];
        assert!(matches!(
            decode_image_into(&data, 8, 4, Footprint::F4X4, &mut output),
            Err(Error::OutputTooSmall {
                needed: 128,
                actual: 127
            })
        ));
    }

    #[test]
    fn truncated_stream_is_an_io_error() {
        let data = void_extent([0; 4]);
        match astc_decode(&data[..], 8, 4, Footprint::F4X4, |_, _, _| ()) {
            Err(Error::Io(err)) => assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("{:?}", other),
        }
    }
}
