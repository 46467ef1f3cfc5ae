//! Average Hash (aHash) implementation.
//!
//! aHash works by:
//! 1. Converting the image to grayscale
//! 2. Box-averaging it into a GRID_SIZE x GRID_SIZE grid of cells
//! 3. Computing the mean luminance of the grid
//! 4. For each cell: if at or above the mean, set bit to 1, else 0
//!
//! Cells are read row by row; cell (0, 0) lands in the most significant bit.
//! Uniform brightness changes keep the bits, crops and rotations do not.

use super::traits::{PerceptualSignature, SignatureAlgorithm, GRID_SIZE};
use crate::error::HashError;
use image::{DynamicImage, GrayImage};

/// Average Hash (aHash) implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct AverageHasher;

impl AverageHasher {
    pub fn new() -> Self {
        Self
    }
}

impl SignatureAlgorithm for AverageHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<PerceptualSignature, HashError> {
        let gray = image.to_luma8();
        let cells = luminance_grid(&gray);

        let total: u64 = cells.iter().sum();
        let count = cells.len() as u64;

        let mut bits: u64 = 0;
        for (index, &cell) in cells.iter().enumerate() {
            // cell >= total / count, without rounding
            if cell * count >= total {
                bits |= 1u64 << (cells.len() - 1 - index);
            }
        }

        Ok(PerceptualSignature::from_bits(bits))
    }

    fn name(&self) -> &'static str {
        "aHash"
    }
}

/// Mean luminance per cell, row-major
fn luminance_grid(gray: &GrayImage) -> Vec<u64> {
    let (width, height) = gray.dimensions();
    let mut cells = Vec::with_capacity((GRID_SIZE * GRID_SIZE) as usize);

    for cy in 0..GRID_SIZE {
        let (y0, y1) = cell_span(cy, height);
        for cx in 0..GRID_SIZE {
            let (x0, x1) = cell_span(cx, width);

            let mut sum: u64 = 0;
            for y in y0..y1 {
                for x in x0..x1 {
                    sum += u64::from(gray.get_pixel(x, y)[0]);
                }
            }
            let area = u64::from((x1 - x0) * (y1 - y0));
            cells.push(sum / area);
        }
    }

    cells
}

/// Pixel range covered by one cell. Never empty, so images narrower than
/// the grid reuse the nearest row or column.
fn cell_span(cell: u32, extent: u32) -> (u32, u32) {
    let extent = u64::from(extent.max(1));
    let start = u64::from(cell) * extent / u64::from(GRID_SIZE);
    let end = (u64::from(cell + 1) * extent / u64::from(GRID_SIZE)).max(start + 1);
    (start as u32, end as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    /// 64x64 image built from 8x8 uniform blocks; `bright` cells are white
    fn block_image(bright: impl Fn(u32, u32) -> bool) -> DynamicImage {
        let img = ImageBuffer::from_fn(64, 64, |x, y| {
            if bright(x / 8, y / 8) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn identical_images_produce_identical_signature() {
        let hasher = AverageHasher::new();
        let image = block_image(|x, y| (x + y) % 2 == 0);

        let a = hasher.hash_image(&image).unwrap();
        let b = hasher.hash_image(&image).unwrap();

        assert_eq!(a.distance(&b), 0);
    }

    #[test]
    fn solid_image_sets_every_bit() {
        let hasher = AverageHasher::new();
        let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([128u8, 128, 128]));

        let sig = hasher.hash_image(&DynamicImage::ImageRgb8(img)).unwrap();

        assert_eq!(sig.bits(), u64::MAX);
    }

    #[test]
    fn bright_cells_map_to_row_major_bits() {
        let hasher = AverageHasher::new();
        // Only the top-left and bottom-right cells are bright
        let image = block_image(|x, y| (x, y) == (0, 0) || (x, y) == (7, 7));

        let sig = hasher.hash_image(&image).unwrap();

        assert_eq!(sig.bits(), (1u64 << 63) | 1);
    }

    #[test]
    fn flipped_cells_change_exactly_that_many_bits() {
        let hasher = AverageHasher::new();
        let base = block_image(|x, _| x < 4);
        let edited = block_image(|x, y| x < 4 || (y == 0 && x >= 5));

        let a = hasher.hash_image(&base).unwrap();
        let b = hasher.hash_image(&edited).unwrap();

        assert_eq!(a.distance(&b), 3);
    }

    #[test]
    fn uniform_brightness_shift_keeps_signature() {
        let hasher = AverageHasher::new();
        let dark = ImageBuffer::from_fn(64, 64, |x, _| Luma([if x < 32 { 10u8 } else { 100 }]));
        let light = ImageBuffer::from_fn(64, 64, |x, _| Luma([if x < 32 { 60u8 } else { 200 }]));

        let a = hasher.hash_image(&DynamicImage::ImageLuma8(dark)).unwrap();
        let b = hasher.hash_image(&DynamicImage::ImageLuma8(light)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn tiny_images_are_hashed() {
        let hasher = AverageHasher::new();
        let img = ImageBuffer::from_fn(1, 1, |_, _| Luma([42u8]));

        let sig = hasher.hash_image(&DynamicImage::ImageLuma8(img)).unwrap();

        assert_eq!(sig.bits(), u64::MAX);
    }

    #[test]
    fn cell_span_never_empty() {
        for extent in [1, 3, 7, 8, 9, 1000] {
            for cell in 0..GRID_SIZE {
                let (start, end) = cell_span(cell, extent);
                assert!(start < end);
                assert!(end <= extent);
            }
        }
    }
}
