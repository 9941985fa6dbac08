// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rotation/scale warp of a whole frame.

use crate::util::geometry::Affine;
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{warp, Interpolation, Projection};

/// Rotate `frame` by `rotation_deg` about its centre and scale it uniformly.
///
/// The output has the input's size; areas with no source pixel are black.
pub fn rotate_scale(frame: &RgbImage, rotation_deg: f64, scale: f64) -> RgbImage {
    let (width, height) = frame.dimensions();
    let center = (f64::from(width) / 2.0, f64::from(height) / 2.0);
    let forward = Affine::rotation(center, rotation_deg, scale);

    // A singular matrix (zero scale) maps nothing back onto the frame.
    let Some(projection) = Projection::from_matrix(forward.to_projective()) else {
        return RgbImage::new(width, height);
    };
    warp(frame, &projection, Interpolation::Bilinear, Rgb([0, 0, 0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| Rgb([(x * 20) as u8, (y * 20) as u8, 7]))
    }

    fn assert_near(actual: &Rgb<u8>, expected: &Rgb<u8>) {
        for c in 0..3 {
            let diff = (i16::from(actual.0[c]) - i16::from(expected.0[c])).abs();
            assert!(diff <= 1, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_half_turn_mirrors_about_center() {
        let frame = gradient(8, 8);
        let out = rotate_scale(&frame, 180.0, 1.0);

        // Centre is (4, 4): destination (x, y) samples source (8 - x, 8 - y).
        assert_near(out.get_pixel(3, 3), frame.get_pixel(5, 5));
        assert_near(out.get_pixel(5, 4), frame.get_pixel(3, 4));
        // Source (8, 8) is outside the frame.
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_zoom_keeps_center_pixel() {
        let frame = gradient(8, 8);
        let out = rotate_scale(&frame, 0.0, 2.0);
        assert_near(out.get_pixel(4, 4), frame.get_pixel(4, 4));
        // (0, 0) samples (2, 2) at 2x zoom about (4, 4).
        assert_near(out.get_pixel(0, 0), frame.get_pixel(2, 2));
    }

    #[test]
    fn test_shrink_leaves_black_border() {
        let frame = RgbImage::from_pixel(8, 8, Rgb([200, 200, 200]));
        let out = rotate_scale(&frame, 0.0, 0.5);
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_near(out.get_pixel(4, 4), &Rgb([200, 200, 200]));
    }

    #[test]
    fn test_zero_scale_is_black() {
        let frame = gradient(3, 3);
        let out = rotate_scale(&frame, 45.0, 0.0);
        assert_eq!(out.dimensions(), (3, 3));
        assert!(out.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
