// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video timeline scrubber control.
//!
//! This module provides the timeline scrubber for navigating through
//! video frames.

/// Display the scrubber. Returns the frame to seek to when dragged.
pub fn show(ui: &mut egui::Ui, position: u64, last_frame: u64, enabled: bool) -> Option<u64> {
    let mut frame = position;
    let width = ui.available_width();
    ui.spacing_mut().slider_width = (width - 80.0).max(50.0);

    let response = ui.add_enabled(
        enabled && last_frame > 0,
        egui::Slider::new(&mut frame, 0..=last_frame.max(1)).show_value(true),
    );

    (response.changed() && frame != position).then_some(frame)
}
