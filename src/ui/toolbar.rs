// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Transport toolbar.
//!
//! Video loading, play/pause, frame stepping, the frame and FPS spinners,
//! looping and view zoom.

/// Snapshot of the player state the toolbar reflects.
pub struct TransportState {
    pub is_open: bool,
    pub playing: bool,
    pub position: u64,
    pub frame_suffix: String,
    pub last_frame: u64,
    pub fps: f64,
    pub fps_suffix: String,
}

/// Requested transport change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    None,
    LoadVideo,
    Play,
    Pause,
    StepBack,
    StepForward,
    Seek(u64),
    SetFps(f64),
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

/// Display the transport toolbar.
pub fn show(ui: &mut egui::Ui, state: &TransportState, looping: &mut bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("📂 Load Video...").clicked() {
            action = ToolbarAction::LoadVideo;
        }

        ui.separator();

        let can_play = state.is_open && !state.playing;
        if ui.add_enabled(can_play, egui::Button::new("▶ Play")).clicked() {
            action = ToolbarAction::Play;
        }
        if ui
            .add_enabled(state.is_open && state.playing, egui::Button::new("⏸ Pause"))
            .clicked()
        {
            action = ToolbarAction::Pause;
        }
        if ui.add_enabled(state.is_open, egui::Button::new("⏮")).on_hover_text("Previous frame").clicked() {
            action = ToolbarAction::StepBack;
        }
        if ui.add_enabled(state.is_open, egui::Button::new("⏭")).on_hover_text("Next frame").clicked() {
            action = ToolbarAction::StepForward;
        }

        ui.separator();

        ui.label("Frame:");
        let mut frame = state.position;
        let response = ui.add_enabled(
            state.is_open,
            egui::DragValue::new(&mut frame)
                .range(0..=state.last_frame)
                .suffix(state.frame_suffix.as_str()),
        );
        if response.changed() && frame != state.position {
            action = ToolbarAction::Seek(frame);
        }

        ui.label("FPS:");
        let mut fps = state.fps;
        let response = ui.add_enabled(
            state.is_open,
            egui::DragValue::new(&mut fps)
                .range(0.01..=f64::MAX)
                .speed(0.1)
                .fixed_decimals(2)
                .suffix(state.fps_suffix.as_str()),
        );
        if response.changed() && (fps - state.fps).abs() > f64::EPSILON {
            action = ToolbarAction::SetFps(fps);
        }

        ui.checkbox(looping, "Loop");

        ui.separator();

        if ui.button("🔍+").on_hover_text("Zoom in").clicked() {
            action = ToolbarAction::ZoomIn;
        }
        if ui.button("🔍-").on_hover_text("Zoom out").clicked() {
            action = ToolbarAction::ZoomOut;
        }
        if ui.button("Fit").clicked() {
            action = ToolbarAction::ZoomReset;
        }
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(fps: f64) -> TransportState {
        TransportState {
            is_open: true,
            playing: false,
            position: 0,
            frame_suffix: "/100".to_string(),
            last_frame: 99,
            fps,
            fps_suffix: format!(" ({} native)", fps),
        }
    }

    fn run_frames(state: &TransportState, frames: usize) -> Vec<ToolbarAction> {
        let ctx = egui::Context::default();
        let mut looping = false;
        let mut actions = Vec::new();
        for _ in 0..frames {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    actions.push(show(ui, state, &mut looping));
                });
            });
        }
        actions
    }

    #[test]
    fn test_idle_toolbar_keeps_high_native_fps() {
        let actions = run_frames(&state(1000.0), 3);
        assert_eq!(actions, vec![ToolbarAction::None; 3]);
    }

    #[test]
    fn test_idle_toolbar_keeps_fractional_fps() {
        let actions = run_frames(&state(29.97), 2);
        assert!(actions.iter().all(|a| *a == ToolbarAction::None));
    }
}
