// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hand ROI preprocessing for the sign classifier

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use ndarray::Array4;

/// Classifier input edge length (square)
pub const DEFAULT_IMG_SIZE: u32 = 224;

/// Pad an image to a square with black borders, keeping it centered
///
/// Padding is `(long - short) / 2` on each side, so an odd difference loses
/// one pixel of the square. The subsequent resize absorbs that.
pub fn pad_to_square(image: &RgbImage) -> RgbImage {
    let (w, h) = image.dimensions();
    if w == h {
        return image.clone();
    }

    let (pad_w, pad_h) = if h > w {
        ((h - w) / 2, 0)
    } else {
        (0, (w - h) / 2)
    };

    let out_w = w + 2 * pad_w;
    let out_h = h + 2 * pad_h;
    let mut output = RgbImage::from_pixel(out_w, out_h, Rgb([0, 0, 0]));
    imageops::replace(&mut output, image, pad_w as i64, pad_h as i64);
    output
}

/// Letterbox and resize an ROI to `size` x `size`
pub fn letterbox(image: &RgbImage, size: u32) -> RgbImage {
    let square = pad_to_square(image);
    // Triangle filtering averages neighbouring pixels, which is close to
    // area interpolation when shrinking.
    imageops::resize(&square, size, size, FilterType::Triangle)
}

/// Build the classifier input tensor `[1, size, size, 3]` (NHWC)
///
/// Pixels are scaled MobileNetV2-style into `[-1, 1]`.
pub fn preprocess_roi(roi: &RgbImage, size: u32) -> Array4<f32> {
    let resized = letterbox(roi, size);
    let side = size as usize;
    let mut tensor = Array4::zeros((1, side, side, 3));

    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = scale_pixel(pixel[c]);
        }
    }

    tensor
}

#[inline]
pub fn scale_pixel(value: u8) -> f32 {
    value as f32 / 127.5 - 1.0
}
