// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Output writer controls.

use crate::io::media::OutputFormat;

/// Writer settings edited in the panel.
pub struct WriterForm {
    pub output_path: String,
    pub format: OutputFormat,
    pub fps: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterAction {
    None,
    Browse,
    Open,
    Close,
}

pub fn show(ui: &mut egui::Ui, form: &mut WriterForm, can_open: bool, recording: bool) -> WriterAction {
    let mut action = WriterAction::None;

    ui.heading("Output");
    ui.horizontal(|ui| {
        ui.add(egui::TextEdit::singleline(&mut form.output_path).desired_width(160.0));
        if ui.button("...").clicked() {
            action = WriterAction::Browse;
        }
    });

    egui::ComboBox::from_label("Format")
        .selected_text(form.format.label())
        .show_ui(ui, |ui| {
            for format in OutputFormat::ALL {
                ui.selectable_value(&mut form.format, format, format.label());
            }
        });

    ui.horizontal(|ui| {
        ui.label("Writer FPS:");
        ui.add(
            egui::DragValue::new(&mut form.fps)
                .range(0.01..=f64::MAX)
                .speed(0.1)
                .fixed_decimals(2),
        );
    });

    ui.horizontal(|ui| {
        let open_enabled = can_open && !recording && !form.output_path.trim().is_empty();
        if ui.add_enabled(open_enabled, egui::Button::new("⏺ Open Writer")).clicked() {
            action = WriterAction::Open;
        }
        if ui.add_enabled(recording, egui::Button::new("⏹ Close Writer")).clicked() {
            action = WriterAction::Close;
        }
    });

    if recording {
        ui.label(egui::RichText::new("Recording").color(egui::Color32::LIGHT_RED));
    }

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_panel_keeps_writer_fps() {
        let ctx = egui::Context::default();
        let mut form = WriterForm {
            output_path: "out.mp4".to_string(),
            format: OutputFormat::Mp4,
            fps: 1000.0,
        };
        for _ in 0..3 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    assert_eq!(show(ui, &mut form, true, false), WriterAction::None);
                });
            });
        }
        assert_eq!(form.fps, 1000.0);
    }
}
