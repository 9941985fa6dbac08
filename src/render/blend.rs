// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Alpha blending of the chart onto a frame region.

use image::imageops;
use image::{Rgb, RgbImage};
use imageproc::map::map_colors2;

/// Blend `overlay` into `frame` with its top-left corner at `origin`.
///
/// Each channel becomes `overlay·alpha + frame·(1 − alpha)`, rounded and
/// saturated. Parts of the overlay outside the frame are ignored.
pub fn blend_into(frame: &mut RgbImage, overlay: &RgbImage, origin: (u32, u32), alpha: f64) {
    let alpha = alpha.clamp(0.0, 1.0);
    let beta = 1.0 - alpha;
    let (ox, oy) = origin;
    if ox >= frame.width() || oy >= frame.height() {
        return;
    }

    let region = imageops::crop_imm(&*frame, ox, oy, overlay.width(), overlay.height()).to_image();
    let (w, h) = region.dimensions();
    let chart = imageops::crop_imm(overlay, 0, 0, w, h).to_image();

    let mixed = map_colors2(&chart, &region, |src: Rgb<u8>, dst: Rgb<u8>| {
        let mut out = dst;
        for c in 0..3 {
            let value = f64::from(src.0[c]) * alpha + f64::from(dst.0[c]) * beta;
            out.0[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        out
    });
    imageops::replace(frame, &mixed, i64::from(ox), i64::from(oy));
}
