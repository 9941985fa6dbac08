// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay properties panel.
//!
//! This module provides the side panel for loading graph data and editing
//! the chart placement, look, axis scaling, data window and frame warp.

use crate::models::overlay::{AxisScale, OverlaySettings};

/// Result of properties panel interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertiesAction {
    None,
    LoadGraph,
    SetHasHeaders(bool),
    GraphX(u32),
    GraphY(u32),
    GraphW(u32),
    GraphH(u32),
    ImportPreset,
    ExportPreset,
}

/// What the panel did this frame.
pub struct PropertiesResponse {
    pub action: PropertiesAction,
    /// A setting was edited in place and the frame should be re-rendered.
    pub changed: bool,
}

/// Display the overlay properties panel.
pub fn show(
    ui: &mut egui::Ui,
    settings: &mut OverlaySettings,
    has_headers: bool,
    series_len: usize,
    frame_size: Option<(u32, u32)>,
) -> PropertiesResponse {
    let mut action = PropertiesAction::None;
    let mut changed = false;

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.heading("Graph Data");
        ui.horizontal(|ui| {
            if ui.button("📈 Load Graph...").clicked() {
                action = PropertiesAction::LoadGraph;
            }
            ui.label(format!("{} points", series_len));
        });
        let mut headers = has_headers;
        if ui.checkbox(&mut headers, "Has headers").clicked() {
            action = PropertiesAction::SetHasHeaders(headers);
        }

        ui.separator();
        ui.heading("Placement");
        let (frame_w, frame_h) = frame_size.unwrap_or((u32::MAX, u32::MAX));
        let rect = settings.rect;
        egui::Grid::new("graph_rect").num_columns(4).show(ui, |ui| {
            let mut x = rect.x;
            ui.label("X");
            if ui.add(egui::DragValue::new(&mut x).range(0..=frame_w)).changed() {
                action = PropertiesAction::GraphX(x);
            }
            let mut y = rect.y;
            ui.label("Y");
            if ui.add(egui::DragValue::new(&mut y).range(0..=frame_h)).changed() {
                action = PropertiesAction::GraphY(y);
            }
            ui.end_row();

            let mut w = rect.w;
            ui.label("W");
            if ui.add(egui::DragValue::new(&mut w).range(0..=frame_w)).changed() {
                action = PropertiesAction::GraphW(w);
            }
            let mut h = rect.h;
            ui.label("H");
            if ui.add(egui::DragValue::new(&mut h).range(0..=frame_h)).changed() {
                action = PropertiesAction::GraphH(h);
            }
            ui.end_row();
        });

        ui.separator();
        ui.heading("Look");
        changed |= ui
            .add(egui::Slider::new(&mut settings.alpha, 0.0..=1.0).text("Alpha"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut settings.line_weight, 1..=20).text("Line weight"))
            .changed();

        ui.label("Margins (left, right, top, bottom)");
        ui.horizontal(|ui| {
            let m = &mut settings.margins;
            for value in [&mut m.left, &mut m.right, &mut m.top, &mut m.bottom] {
                changed |= ui
                    .add(egui::DragValue::new(value).range(0..=2000))
                    .changed();
            }
        });

        egui::Grid::new("axis_labels").num_columns(2).show(ui, |ui| {
            ui.label("X label");
            changed |= ui.text_edit_singleline(&mut settings.x_label).changed();
            ui.end_row();
            ui.label("Y label");
            changed |= ui.text_edit_singleline(&mut settings.y_label).changed();
            ui.end_row();
        });

        ui.separator();
        ui.heading("Axes");
        changed |= axis_controls(ui, "X", &mut settings.x_axis);
        changed |= axis_controls(ui, "Y", &mut settings.y_axis);

        ui.separator();
        ui.heading("Data Window");
        egui::Grid::new("data_window").num_columns(2).show(ui, |ui| {
            ui.label("Data rate (samples/s)");
            changed |= ui
                .add(egui::DragValue::new(&mut settings.data_rate).range(0..=1_000_000))
                .changed();
            ui.end_row();
            ui.label("X offset");
            changed |= ui.add(egui::DragValue::new(&mut settings.x_offset)).changed();
            ui.end_row();
            ui.label("X window");
            changed |= ui
                .add(egui::DragValue::new(&mut settings.x_window).range(0..=10_000_000))
                .changed();
            ui.end_row();
        });

        ui.separator();
        ui.heading("Frame Transform");
        egui::Grid::new("transform").num_columns(2).show(ui, |ui| {
            ui.label("Rotate (°)");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut settings.rotation)
                        .range(-360.0..=360.0)
                        .speed(0.5),
                )
                .changed();
            ui.end_row();
            ui.label("Scale");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut settings.scale)
                        .range(0.01..=10.0)
                        .speed(0.01),
                )
                .changed();
            ui.end_row();
        });

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Import Preset...").clicked() {
                action = PropertiesAction::ImportPreset;
            }
            if ui.button("Export Preset...").clicked() {
                action = PropertiesAction::ExportPreset;
            }
        });
    });

    PropertiesResponse { action, changed }
}

/// Auto-scale/tight toggles; manual limits are disabled while auto-scaling.
fn axis_controls(ui: &mut egui::Ui, name: &str, axis: &mut AxisScale) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(name);
        changed |= ui.checkbox(&mut axis.auto, "Auto scale").changed();
        changed |= ui.checkbox(&mut axis.tight, "Tight").changed();
    });
    ui.add_enabled_ui(!axis.auto, |ui| {
        ui.horizontal(|ui| {
            ui.label("min");
            changed |= ui.add(egui::DragValue::new(&mut axis.min).speed(0.1)).changed();
            ui.label("max");
            changed |= ui.add(egui::DragValue::new(&mut axis.max).speed(0.1)).changed();
        });
    });
    changed
}
