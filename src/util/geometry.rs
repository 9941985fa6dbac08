// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Affine matrices for the frame warp and the fit-to-view computation used
//! by the canvas.

/// A 2x3 affine matrix mapping `(x, y)` to `(a·x + b·y + c, d·x + e·y + f)`,
/// laid out like OpenCV's `getRotationMatrix2D`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub m: [[f64; 3]; 2],
}

impl Affine {
    /// Rotation by `angle_deg` (counter-clockwise on screen) about `center`,
    /// combined with uniform `scale`.
    pub fn rotation(center: (f64, f64), angle_deg: f64, scale: f64) -> Self {
        let angle = angle_deg.to_radians();
        let alpha = scale * angle.cos();
        let beta = scale * angle.sin();
        let (cx, cy) = center;
        Self {
            m: [
                [alpha, beta, (1.0 - alpha) * cx - beta * cy],
                [-beta, alpha, beta * cx + (1.0 - alpha) * cy],
            ],
        }
    }

    /// Row-major 3x3 homogeneous form, as taken by projective warps.
    pub fn to_projective(&self) -> [f32; 9] {
        let [[a, b, c], [d, e, f]] = self.m;
        [
            a as f32, b as f32, c as f32,
            d as f32, e as f32, f as f32,
            0.0, 0.0, 1.0,
        ]
    }
}

/// Largest `(width, height)` with the image's aspect ratio that fits the
/// available area.
pub fn fit_size(image: (f32, f32), available: (f32, f32)) -> (f32, f32) {
    let (img_w, img_h) = image;
    let (avail_w, avail_h) = available;
    if img_w <= 0.0 || img_h <= 0.0 || avail_h <= 0.0 {
        return (0.0, 0.0);
    }
    let img_aspect = img_w / img_h;
    let available_aspect = avail_w / avail_h;

    if img_aspect > available_aspect {
        // Image is wider - fit to width
        (avail_w, avail_w / img_aspect)
    } else {
        // Image is taller - fit to height
        (avail_h * img_aspect, avail_h)
    }
}
