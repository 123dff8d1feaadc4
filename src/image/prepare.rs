//! Input normalization: square center-crop and PNG re-encode.

use crate::error::Result;
use ::image::GenericImageView;
use std::io::Cursor;

/// A square crop region in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Side length.
    pub size: u32,
}

impl CropBox {
    /// Returns true if the box covers an image of the given dimensions entirely.
    pub fn is_identity(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.size == width && self.size == height
    }
}

/// Computes the centered square crop for an image of `width` x `height`.
///
/// The longer dimension is trimmed symmetrically; an odd remainder leaves the
/// extra pixel on the far side.
pub fn square_crop_box(width: u32, height: u32) -> CropBox {
    let size = width.min(height);
    CropBox {
        x: (width - size) / 2,
        y: (height - size) / 2,
        size,
    }
}

/// An input image ready for submission.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// PNG-encoded bytes.
    pub png: Vec<u8>,
    /// Dimensions of the source image.
    pub original_size: (u32, u32),
    /// Side length after cropping.
    pub side: u32,
}

impl PreparedImage {
    /// Returns true if the source had to be cropped.
    pub fn was_cropped(&self) -> bool {
        self.original_size != (self.side, self.side)
    }
}

/// Decodes `bytes`, crops to a centered square and re-encodes as PNG.
pub fn prepare_input(bytes: &[u8]) -> Result<PreparedImage> {
    let img = ::image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    let crop = square_crop_box(width, height);

    let img = if crop.is_identity(width, height) {
        img
    } else {
        tracing::debug!(width, height, side = crop.size, "center-cropping to square");
        img.crop_imm(crop.x, crop.y, crop.size, crop.size)
    };

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ::image::ImageFormat::Png)?;

    Ok(PreparedImage {
        png,
        original_size: (width, height),
        side: crop.size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{DynamicImage, Rgb, RgbImage};

    fn encode(img: &DynamicImage, format: ::image::ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn test_crop_box_landscape() {
        assert_eq!(
            square_crop_box(800, 600),
            CropBox {
                x: 100,
                y: 0,
                size: 600
            }
        );
    }

    #[test]
    fn test_crop_box_portrait() {
        assert_eq!(
            square_crop_box(512, 768),
            CropBox {
                x: 0,
                y: 128,
                size: 512
            }
        );
    }

    #[test]
    fn test_crop_box_square_is_identity() {
        let crop = square_crop_box(600, 600);
        assert_eq!(crop, CropBox { x: 0, y: 0, size: 600 });
        assert!(crop.is_identity(600, 600));
    }

    #[test]
    fn test_crop_box_odd_remainder_biases_toward_start() {
        // 7 spare columns: 3 trimmed on the left, 4 on the right.
        assert_eq!(square_crop_box(17, 10).x, 3);
        assert_eq!(square_crop_box(10, 17).y, 3);
    }

    #[test]
    fn test_prepare_input_crops_center() {
        // Left and right thirds red, middle green.
        let img = RgbImage::from_fn(9, 3, |x, _| {
            if (3..6).contains(&x) {
                Rgb([0, 255, 0])
            } else {
                Rgb([255, 0, 0])
            }
        });
        let bytes = encode(&DynamicImage::ImageRgb8(img), ::image::ImageFormat::Png);

        let prepared = prepare_input(&bytes).unwrap();
        assert_eq!(prepared.original_size, (9, 3));
        assert_eq!(prepared.side, 3);
        assert!(prepared.was_cropped());

        let out = ::image::load_from_memory(&prepared.png).unwrap().to_rgb8();
        assert_eq!(out.dimensions(), (3, 3));
        assert!(out.pixels().all(|p| *p == Rgb([0, 255, 0])));
    }

    #[test]
    fn test_prepare_input_square_jpeg_becomes_png() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(16, 16));
        let bytes = encode(&img, ::image::ImageFormat::Jpeg);

        let prepared = prepare_input(&bytes).unwrap();
        assert!(!prepared.was_cropped());
        assert!(prepared.png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_prepare_input_rejects_garbage() {
        assert!(prepare_input(b"definitely not an image").is_err());
    }
}
