// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Composite frame display.
//!
//! Shows the latest composite on a black background, fitted to the panel
//! and multiplied by the view zoom. Zoomed views scroll.

use crate::util::geometry::fit_size;

/// Display the canvas.
pub fn show(
    ui: &mut egui::Ui,
    texture: &Option<egui::TextureHandle>,
    image_size: Option<(u32, u32)>,
    zoom: f32,
) {
    let available = ui.available_rect_before_wrap();
    ui.painter().rect_filled(available, 0.0, egui::Color32::BLACK);

    let (Some(texture), Some((img_w, img_h))) = (texture, image_size) else {
        ui.centered_and_justified(|ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.heading(
                    egui::RichText::new("vidplot")
                        .size(32.0)
                        .color(egui::Color32::from_gray(200)),
                );
                ui.label(
                    egui::RichText::new("Load a video, then load a CSV to overlay its chart")
                        .color(egui::Color32::from_gray(160)),
                );
            });
        });
        return;
    };

    let (fit_w, fit_h) = fit_size(
        (img_w as f32, img_h as f32),
        (available.width(), available.height()),
    );
    let display = egui::vec2(fit_w * zoom, fit_h * zoom);

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            // Center when smaller than the viewport
            let viewport = ui.available_size();
            let pad = egui::vec2(
                ((viewport.x - display.x) / 2.0).max(0.0),
                ((viewport.y - display.y) / 2.0).max(0.0),
            );
            let (outer, _) = ui.allocate_exact_size(display + pad * 2.0, egui::Sense::hover());
            let image_rect = egui::Rect::from_min_size(outer.min + pad, display);
            ui.painter().image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        });
}
