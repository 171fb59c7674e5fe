// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ROI preprocessing tests

use image::{Rgb, RgbImage};
use sign_recognition_node::vision::preprocessing::{
    letterbox, pad_to_square, preprocess_roi, scale_pixel,
};

#[test]
fn test_scale_range() {
    assert_eq!(scale_pixel(0), -1.0);
    assert!((scale_pixel(255) - 1.0).abs() < 1e-6);
    assert!(scale_pixel(128).abs() < 0.01);
}

#[test]
fn test_wide_roi_is_letterboxed() {
    let roi = RgbImage::from_pixel(100, 50, Rgb([255, 255, 255]));

    let square = pad_to_square(&roi);
    assert_eq!(square.dimensions(), (100, 100));

    let resized = letterbox(&roi, 32);
    assert_eq!(resized.dimensions(), (32, 32));
    // Top band is padding, centre row is content
    assert_eq!(resized.get_pixel(16, 1).0, [0, 0, 0]);
    assert_eq!(resized.get_pixel(16, 16).0, [255, 255, 255]);
}

#[test]
fn test_tensor_layout_nhwc() {
    let roi = RgbImage::from_pixel(30, 30, Rgb([255, 0, 128]));
    let tensor = preprocess_roi(&roi, 224);

    assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    assert!((tensor[[0, 100, 100, 0]] - 1.0).abs() < 0.02);
    assert!((tensor[[0, 100, 100, 1]] + 1.0).abs() < 0.02);
    assert!(tensor[[0, 100, 100, 2]].abs() < 0.02);
}

#[test]
fn test_tensor_values_bounded() {
    let mut roi = RgbImage::new(17, 41);
    for (x, y, p) in roi.enumerate_pixels_mut() {
        *p = Rgb([(x * 15) as u8, (y * 6) as u8, 200]);
    }
    let tensor = preprocess_roi(&roi, 64);
    assert!(tensor.iter().all(|v| (-1.0..=1.0).contains(v)));
}
