// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay settings.
//!
//! Everything the per-frame compositor reads: where the chart goes, how it
//! looks, how the data window scrolls with the video, and the optional
//! frame transform. The whole struct is serializable so it doubles as a
//! preset file.

use serde::{Deserialize, Serialize};

/// Chart placement in frame pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GraphRect {
    /// Lower half of the frame, full width.
    pub fn default_for(frame_w: u32, frame_h: u32) -> Self {
        Self {
            x: 0,
            y: frame_h / 2,
            w: frame_w,
            h: frame_h / 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Move the left edge; the width shrinks if the rectangle would overflow.
    pub fn set_x(&mut self, x: u32, frame_w: u32) {
        self.x = x.min(frame_w);
        if self.x.saturating_add(self.w) > frame_w {
            self.w = frame_w - self.x;
        }
    }

    /// Move the top edge; the height shrinks if the rectangle would overflow.
    pub fn set_y(&mut self, y: u32, frame_h: u32) {
        self.y = y.min(frame_h);
        if self.y.saturating_add(self.h) > frame_h {
            self.h = frame_h - self.y;
        }
    }

    /// Resize horizontally; the left edge moves if the rectangle would overflow.
    pub fn set_w(&mut self, w: u32, frame_w: u32) {
        self.w = w.min(frame_w);
        if self.x.saturating_add(self.w) > frame_w {
            self.x = frame_w - self.w;
        }
    }

    /// Resize vertically; the top edge moves if the rectangle would overflow.
    pub fn set_h(&mut self, h: u32, frame_h: u32) {
        self.h = h.min(frame_h);
        if self.y.saturating_add(self.h) > frame_h {
            self.y = frame_h - self.h;
        }
    }

    /// Pull an arbitrary rectangle (e.g. from a preset) inside the frame.
    /// The size is kept where possible and the origin moves instead.
    pub fn clamped(self, frame_w: u32, frame_h: u32) -> Self {
        let w = self.w.min(frame_w);
        let h = self.h.min(frame_h);
        Self {
            x: self.x.min(frame_w - w),
            y: self.y.min(frame_h - h),
            w,
            h,
        }
    }
}

/// Scaling of one chart axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    /// Derive limits from the visible data.
    pub auto: bool,
    /// With auto scaling, hug the data instead of padding it.
    pub tight: bool,
    pub min: f64,
    pub max: f64,
}

impl Default for AxisScale {
    fn default() -> Self {
        Self {
            auto: true,
            tight: false,
            min: 0.0,
            max: 1.0,
        }
    }
}

/// Fraction of the data span added on each side when not tight.
const AUTO_PADDING: f64 = 0.05;

impl AxisScale {
    /// Resolve the `(min, max)` limits for the given data.
    pub fn limits(&self, data: &[f64]) -> (f64, f64) {
        if !self.auto {
            let (lo, hi) = if self.min <= self.max {
                (self.min, self.max)
            } else {
                (self.max, self.min)
            };
            return if is_degenerate(lo, hi) {
                (lo - 0.5, hi + 0.5)
            } else {
                (lo, hi)
            };
        }

        let mut finite = data.iter().copied().filter(|v| v.is_finite());
        let Some(first) = finite.next() else {
            return (0.0, 1.0);
        };
        let (lo, hi) = finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

        if is_degenerate(lo, hi) {
            return (lo - 0.5, hi + 0.5);
        }
        if self.tight {
            (lo, hi)
        } else {
            let pad = (hi - lo) * AUTO_PADDING;
            (lo - pad, hi + pad)
        }
    }
}

fn is_degenerate(lo: f64, hi: f64) -> bool {
    hi - lo <= f64::EPSILON * hi.abs().max(1.0)
}

/// Chart margins in pixels around the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 60,
            right: 20,
            top: 20,
            bottom: 40,
        }
    }
}

/// Complete overlay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub rect: GraphRect,
    /// Chart opacity, 0.0 (invisible) to 1.0 (opaque).
    pub alpha: f64,
    pub line_weight: u32,
    pub margins: Margins,
    pub x_label: String,
    pub y_label: String,
    pub x_axis: AxisScale,
    pub y_axis: AxisScale,
    /// Data samples per second of video.
    pub data_rate: u32,
    /// Sample index shown at frame zero.
    pub x_offset: i64,
    /// Number of samples visible at once.
    pub x_window: usize,
    /// Frame rotation in degrees, counter-clockwise.
    pub rotation: f64,
    pub scale: f64,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            rect: GraphRect::default(),
            alpha: 0.6,
            line_weight: 2,
            margins: Margins::default(),
            x_label: String::new(),
            y_label: String::new(),
            x_axis: AxisScale::default(),
            y_axis: AxisScale::default(),
            data_rate: 30,
            x_offset: 0,
            x_window: 100,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

impl OverlaySettings {
    /// First sample index for a frame, given the playback rate.
    ///
    /// The data window advances by `data_rate / fps` samples per frame.
    pub fn window_offset(&self, frame_index: u64, fps: f64) -> i64 {
        if fps <= 0.0 {
            return self.x_offset;
        }
        let coeff = f64::from(self.data_rate) / fps;
        self.x_offset + (frame_index as f64 * coeff) as i64
    }

    /// Whether the frame needs the rotation/scale warp.
    pub fn has_transform(&self) -> bool {
        self.rotation.abs() > 1e-9 || (self.scale - 1.0).abs() > 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rect_is_lower_half() {
        let rect = GraphRect::default_for(1920, 1080);
        assert_eq!(rect, GraphRect { x: 0, y: 540, w: 1920, h: 540 });

        let odd = GraphRect::default_for(641, 481);
        assert!(odd.y + odd.h <= 481);
    }

    #[test]
    fn test_moving_x_shrinks_width() {
        let mut rect = GraphRect::default_for(640, 480);
        rect.set_x(100, 640);
        assert_eq!(rect.x, 100);
        assert_eq!(rect.w, 540);
    }

    #[test]
    fn test_growing_width_moves_x() {
        let mut rect = GraphRect { x: 500, y: 0, w: 100, h: 100 };
        rect.set_w(300, 640);
        assert_eq!(rect.w, 300);
        assert_eq!(rect.x, 340);
    }

    #[test]
    fn test_values_clamped_to_frame() {
        let mut rect = GraphRect::default_for(640, 480);
        rect.set_w(10_000, 640);
        assert_eq!(rect.w, 640);
        assert_eq!(rect.x, 0);

        rect.set_y(900, 480);
        assert_eq!(rect.y, 480);
        assert_eq!(rect.h, 0);
        assert!(rect.is_empty());

        rect.set_h(100, 480);
        assert_eq!(rect.y, 380);
        assert_eq!(rect.h, 100);
    }

    #[test]
    fn test_clamped_preset_rect() {
        let rect = GraphRect { x: 600, y: 400, w: 200, h: 900 }.clamped(640, 480);
        assert_eq!(rect, GraphRect { x: 440, y: 0, w: 200, h: 480 });
    }

    #[test]
    fn test_auto_limits_padded_and_tight() {
        let data = [0.0, 5.0, 10.0];
        let padded = AxisScale::default().limits(&data);
        assert!((padded.0 + 0.5).abs() < 1e-9);
        assert!((padded.1 - 10.5).abs() < 1e-9);

        let tight = AxisScale { tight: true, ..AxisScale::default() }.limits(&data);
        assert_eq!(tight, (0.0, 10.0));
    }

    #[test]
    fn test_auto_limits_degenerate_and_empty() {
        let scale = AxisScale::default();
        assert_eq!(scale.limits(&[]), (0.0, 1.0));
        assert_eq!(scale.limits(&[3.0, 3.0]), (2.5, 3.5));
        assert_eq!(scale.limits(&[f64::NAN, 2.0]), (1.5, 2.5));
    }

    #[test]
    fn test_manual_limits_ordered() {
        let scale = AxisScale { auto: false, tight: false, min: 5.0, max: -5.0 };
        assert_eq!(scale.limits(&[100.0]), (-5.0, 5.0));
    }

    #[test]
    fn test_manual_limits_degenerate() {
        let scale = AxisScale { auto: false, tight: false, min: 1.0, max: 1.0 };
        assert_eq!(scale.limits(&[1.0, 2.0]), (0.5, 1.5));
    }

    #[test]
    fn test_window_offset_follows_rate() {
        let settings = OverlaySettings {
            data_rate: 100,
            x_offset: 10,
            ..OverlaySettings::default()
        };
        assert_eq!(settings.window_offset(0, 25.0), 10);
        assert_eq!(settings.window_offset(3, 25.0), 22);
        // Truncates fractional sample positions.
        assert_eq!(settings.window_offset(1, 30.0), 13);
        assert_eq!(settings.window_offset(7, 0.0), 10);
    }

    #[test]
    fn test_has_transform() {
        let mut settings = OverlaySettings::default();
        assert!(!settings.has_transform());
        settings.scale = 0.5;
        assert!(settings.has_transform());
        settings.scale = 1.0;
        settings.rotation = 90.0;
        assert!(settings.has_transform());
    }
}
