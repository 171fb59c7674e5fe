// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Hand bounding box and ROI crop tests

use image::{Rgb, RgbImage};
use sign_recognition_node::vision::{
    crop_roi, hand_bounding_box, BoundingBox, HandLandmarks, Landmark,
};

fn hand(points: &[(f32, f32)]) -> HandLandmarks {
    HandLandmarks {
        points: points.iter().map(|&(x, y)| Landmark { x, y }).collect(),
        score: 0.9,
    }
}

#[test]
fn test_box_adds_margin() {
    let bbox = hand_bounding_box(&hand(&[(0.25, 0.25), (0.75, 0.5)]), 200, 100, 30).unwrap();
    assert_eq!(
        bbox,
        BoundingBox {
            x_min: 20,
            y_min: 0,
            x_max: 180,
            y_max: 80,
        }
    );
}

#[test]
fn test_box_clamped_to_frame() {
    let bbox = hand_bounding_box(&hand(&[(0.0, 0.0), (1.0, 1.0)]), 640, 480, 30).unwrap();
    assert_eq!(bbox.x_min, 0);
    assert_eq!(bbox.y_min, 0);
    assert_eq!(bbox.x_max, 640);
    assert_eq!(bbox.y_max, 480);
}

#[test]
fn test_no_points_no_box() {
    assert!(hand_bounding_box(&hand(&[]), 100, 100, 30).is_none());
}

#[test]
fn test_off_frame_hand_gives_empty_box() {
    let bbox = hand_bounding_box(&hand(&[(2.0, 2.0)]), 50, 50, 30).unwrap();
    assert!(bbox.is_empty());

    let frame = RgbImage::new(50, 50);
    assert!(crop_roi(&frame, &bbox).is_none());
}

#[test]
fn test_crop_keeps_region_pixels() {
    let mut frame = RgbImage::from_pixel(40, 40, Rgb([0, 0, 0]));
    frame.put_pixel(12, 15, Rgb([255, 0, 0]));

    let bbox = BoundingBox {
        x_min: 10,
        y_min: 10,
        x_max: 30,
        y_max: 20,
    };
    let roi = crop_roi(&frame, &bbox).unwrap();

    assert_eq!(roi.dimensions(), (20, 10));
    assert_eq!(roi.get_pixel(2, 5).0, [255, 0, 0]);
}
