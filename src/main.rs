// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! vidplot - video chart overlay
//!
//! A cross-platform desktop application that overlays a scrolling line
//! chart, loaded from CSV, onto the frames of a video and can re-encode
//! the composited result.

mod app;
mod error;
mod io;
mod models;
mod player;
mod render;
mod ui;
mod util;

use anyhow::Result;
use app::OverlayApp;
use io::config::Preferences;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 860.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("vidplot - Video Chart Overlay"),
        ..Default::default()
    };

    // Optional positional arguments: video file, then CSV file
    let mut args = std::env::args_os().skip(1).map(std::path::PathBuf::from);
    let video = args.next();
    let graph = args.next();

    eframe::run_native(
        "vidplot",
        options,
        Box::new(move |_cc| {
            let mut app = OverlayApp::new(Preferences::default_path());
            if let Some(path) = video {
                app.open_video(path);
            }
            if let Some(path) = graph {
                app.spawn_graph_load(path);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
