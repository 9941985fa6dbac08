// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-frame composition: warp, slice data, draw chart, blend.

use super::blend::blend_into;
use super::chart::{ChartRenderer, ChartSpec};
use super::transform::rotate_scale;
use crate::error::Result;
use crate::models::overlay::OverlaySettings;
use crate::models::series::{Series, SeriesWindow};
use image::RgbImage;

/// Samples of `series` visible at `frame_index` when playing at `fps`.
pub fn data_window<'a>(
    series: &'a Series,
    settings: &OverlaySettings,
    frame_index: u64,
    fps: f64,
) -> SeriesWindow<'a> {
    series.window(settings.window_offset(frame_index, fps), settings.x_window)
}

/// Produces composite frames.
#[derive(Default)]
pub struct Compositor {
    renderer: ChartRenderer,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the composite for one decoded frame.
    pub fn compose(
        &self,
        frame: &RgbImage,
        frame_index: u64,
        fps: f64,
        series: &Series,
        settings: &OverlaySettings,
    ) -> Result<RgbImage> {
        let mut composite = if settings.has_transform() {
            rotate_scale(frame, settings.rotation, settings.scale)
        } else {
            frame.clone()
        };

        let (frame_w, frame_h) = composite.dimensions();
        let rect = settings.rect.clamped(frame_w, frame_h);
        if rect.is_empty() {
            return Ok(composite);
        }

        let window = data_window(series, settings, frame_index, fps);
        let spec = ChartSpec::new(window, settings);
        let chart = self.renderer.render(&spec, rect.w, rect.h)?;
        blend_into(&mut composite, &chart, (rect.x, rect.y), settings.alpha);

        Ok(composite)
    }
}
