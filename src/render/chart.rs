// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Line chart rendering.
//!
//! The chart is described as an SVG scene (background, plot frame,
//! horizontal grid, tick labels, axis labels and the series polyline) and
//! rasterized with resvg at exactly the size of the overlay rectangle.

use crate::error::{OverlayError, Result};
use crate::models::overlay::{Margins, OverlaySettings};
use crate::models::series::SeriesWindow;
use image::{Rgb, RgbImage};
use std::fmt::Write as _;

const FONT_SIZE: f64 = 12.0;
const GRID_COLOR: &str = "#d0d0d0";
const SERIES_COLOR: &str = "#0000ff";

/// Everything needed to draw one chart.
#[derive(Debug, Clone)]
pub struct ChartSpec<'a> {
    pub window: SeriesWindow<'a>,
    pub x_limits: (f64, f64),
    pub y_limits: (f64, f64),
    pub margins: Margins,
    pub line_weight: u32,
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> ChartSpec<'a> {
    /// Resolve axis limits for `window` from the overlay settings.
    pub fn new(window: SeriesWindow<'a>, settings: &'a OverlaySettings) -> Self {
        Self {
            window,
            x_limits: settings.x_axis.limits(window.keys),
            y_limits: settings.y_axis.limits(window.values),
            margins: settings.margins,
            line_weight: settings.line_weight,
            x_label: &settings.x_label,
            y_label: &settings.y_label,
        }
    }

    /// Build the SVG document for a `width` x `height` chart.
    pub fn to_svg(&self, width: u32, height: u32) -> String {
        let w = f64::from(width);
        let h = f64::from(height);
        let left = f64::from(self.margins.left);
        let top = f64::from(self.margins.top);
        let plot_w = w - left - f64::from(self.margins.right);
        let plot_h = h - top - f64::from(self.margins.bottom);

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="{FONT_SIZE}">"#
        );
        let _ = write!(svg, r#"<rect width="{w}" height="{h}" fill="white"/>"#);

        if plot_w <= 0.0 || plot_h <= 0.0 {
            svg.push_str("</svg>");
            return svg;
        }

        let bottom = top + plot_h;
        let right = left + plot_w;
        let (x_min, x_max) = self.x_limits;
        let (y_min, y_max) = self.y_limits;
        let map_x = |x: f64| left + (x - x_min) / (x_max - x_min) * plot_w;
        let map_y = |y: f64| top + (1.0 - (y - y_min) / (y_max - y_min)) * plot_h;

        let _ = write!(
            svg,
            r#"<defs><clipPath id="plot"><rect x="{left}" y="{top}" width="{plot_w}" height="{plot_h}"/></clipPath></defs>"#
        );

        // Horizontal grid with Y tick labels
        let y_ticks = nice_ticks(y_min, y_max, ((plot_h / 40.0) as usize).max(2));
        let y_step = tick_step(&y_ticks);
        for tick in &y_ticks {
            let py = map_y(*tick);
            let _ = write!(
                svg,
                r#"<line x1="{left}" y1="{py}" x2="{right}" y2="{py}" stroke="{GRID_COLOR}" stroke-width="1"/>"#
            );
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="end">{}</text>"#,
                left - 6.0,
                py + FONT_SIZE / 3.0,
                format_tick(*tick, y_step)
            );
        }

        // X tick marks and labels
        let x_ticks = nice_ticks(x_min, x_max, ((plot_w / 80.0) as usize).max(2));
        let x_step = tick_step(&x_ticks);
        for tick in &x_ticks {
            let px = map_x(*tick);
            let _ = write!(
                svg,
                r#"<line x1="{px}" y1="{bottom}" x2="{px}" y2="{}" stroke="black" stroke-width="1"/>"#,
                bottom + 4.0
            );
            let _ = write!(
                svg,
                r#"<text x="{px}" y="{}" text-anchor="middle">{}</text>"#,
                bottom + 4.0 + FONT_SIZE,
                format_tick(*tick, x_step)
            );
        }

        let _ = write!(
            svg,
            r#"<rect x="{left}" y="{top}" width="{plot_w}" height="{plot_h}" fill="none" stroke="black" stroke-width="1"/>"#
        );

        let points: Vec<(f64, f64)> = self
            .window
            .points()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| (map_x(x), map_y(y)))
            .collect();
        let stroke = self.line_weight.max(1);
        match points.as_slice() {
            [] => {}
            [(px, py)] => {
                let _ = write!(
                    svg,
                    r#"<circle clip-path="url(#plot)" cx="{px}" cy="{py}" r="{}" fill="{SERIES_COLOR}"/>"#,
                    f64::from(stroke).max(2.0)
                );
            }
            _ => {
                let mut coords = String::with_capacity(points.len() * 16);
                for (px, py) in &points {
                    let _ = write!(coords, "{:.2},{:.2} ", px, py);
                }
                let _ = write!(
                    svg,
                    r#"<polyline clip-path="url(#plot)" fill="none" stroke="{SERIES_COLOR}" stroke-width="{stroke}" stroke-linejoin="round" stroke-linecap="round" points="{}"/>"#,
                    coords.trim_end()
                );
            }
        }

        if !self.x_label.is_empty() {
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="middle">{}</text>"#,
                left + plot_w / 2.0,
                h - 4.0,
                escape_xml(self.x_label)
            );
        }
        if !self.y_label.is_empty() {
            let _ = write!(
                svg,
                r#"<text transform="translate({},{}) rotate(-90)" text-anchor="middle">{}</text>"#,
                FONT_SIZE + 2.0,
                top + plot_h / 2.0,
                escape_xml(self.y_label)
            );
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Rasterizes chart scenes. Holds the font database so it is loaded once.
pub struct ChartRenderer {
    options: usvg::Options<'static>,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer {
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        log::debug!("Chart renderer loaded {} font faces", options.fontdb.len());
        Self { options }
    }

    /// Render `spec` into an RGB image of the given size.
    pub fn render(&self, spec: &ChartSpec<'_>, width: u32, height: u32) -> Result<RgbImage> {
        let svg = spec.to_svg(width, height);
        let tree = usvg::Tree::from_str(&svg, &self.options)
            .map_err(|e| OverlayError::Render(e.to_string()))?;
        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            OverlayError::Render(format!("invalid chart size {}x{}", width, height))
        })?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        let mut image = RgbImage::new(width, height);
        for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgb([c.red(), c.green(), c.blue()]);
        }
        Ok(image)
    }
}

/// Round tick positions covering `[min, max]`, roughly `target` of them.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let span = max - min;
    if !span.is_finite() || span <= 0.0 || target == 0 {
        return Vec::new();
    }
    let raw = span / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let step = magnitude
        * if normalized < 1.5 {
            1.0
        } else if normalized < 3.0 {
            2.0
        } else if normalized < 7.0 {
            5.0
        } else {
            10.0
        };

    let first = (min / step).ceil();
    let mut ticks = Vec::new();
    let mut i = 0.0;
    loop {
        let value = (first + i) * step;
        if value > max + step * 1e-9 || ticks.len() > 100 {
            break;
        }
        ticks.push(value);
        i += 1.0;
    }
    ticks
}

fn tick_step(ticks: &[f64]) -> f64 {
    match ticks {
        [a, b, ..] => b - a,
        _ => 1.0,
    }
}

/// Format a tick with just enough decimals for its step.
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 {
        (-step.log10().floor()).max(0.0) as usize
    } else {
        0
    };
    let text = format!("{:.*}", decimals, value);
    // "-0" and "-0.00" read badly
    if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        text.trim_start_matches('-').to_string()
    } else {
        text
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
