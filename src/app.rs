// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. Widget events are translated into calls on the
//! [`Player`], and the player's composite is uploaded as a texture.

use crate::io::config::Preferences;
use crate::io::media::{self, OutputFormat};
use crate::io::serialization;
use crate::player::{Player, TickOutcome};
use crate::ui::{canvas, properties, timeline, toolbar, writer_panel};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::time::Instant;

/// View zoom step for the zoom buttons.
const ZOOM_STEP: f32 = 1.5;

/// Result of background CSV loading.
struct LoadedGraph {
    path: PathBuf,
    text: String,
}

/// Read a CSV file, replacing bytes that are not valid UTF-8.
fn read_graph_file(path: PathBuf) -> anyhow::Result<LoadedGraph> {
    let bytes = std::fs::read(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok(LoadedGraph { path, text })
}

/// Main application state.
pub struct OverlayApp {
    player: Player,

    prefs: Preferences,
    prefs_path: PathBuf,

    /// Composite texture for display
    texture: Option<egui::TextureHandle>,
    /// Player generation the texture was built from
    texture_generation: u64,

    /// View zoom relative to fit-to-panel
    zoom: f32,

    writer_form: writer_panel::WriterForm,

    /// Receiver for background CSV loading
    graph_loader: Option<Receiver<anyhow::Result<LoadedGraph>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Last error or notice shown in the status bar
    status: Option<String>,
}

impl OverlayApp {
    /// Create the application, restoring persisted preferences.
    pub fn new(prefs_path: PathBuf) -> Self {
        let prefs = Preferences::load_from(&prefs_path);
        let mut player = Player::new(prefs.overlay.clone());
        player.looping = prefs.loop_playback;
        player.set_has_headers(prefs.has_headers);

        let writer_form = writer_panel::WriterForm {
            output_path: prefs
                .last_output_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            format: prefs.output_format,
            fps: 25.0,
        };

        Self {
            player,
            prefs,
            prefs_path,
            texture: None,
            texture_generation: 0,
            zoom: 1.0,
            writer_form,
            graph_loader: None,
            loading_message: None,
            status: None,
        }
    }

    fn report_error(&mut self, context: &str, error: impl std::fmt::Display) {
        log::error!("{}: {}", context, error);
        self.status = Some(format!("{}: {}", context, error));
    }

    fn save_prefs(&mut self) {
        self.prefs.overlay = self.player.settings.clone();
        self.prefs.has_headers = self.player.has_headers();
        self.prefs.loop_playback = self.player.looping;
        self.prefs.output_format = self.writer_form.format;
        if let Err(e) = self.prefs.save_to(&self.prefs_path) {
            log::warn!("Failed to save preferences: {}", e);
        }
    }

    /// Ask for a video and open it.
    fn load_video(&mut self) {
        let mut dialog = rfd::FileDialog::new()
            .add_filter("Videos", media::VIDEO_EXTENSIONS)
            .add_filter("Images", media::IMAGE_EXTENSIONS);
        if let Some(dir) = Preferences::dialog_dir(&self.prefs.last_video_path) {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.pick_file() else {
            return;
        };

        self.prefs.last_video_path = Some(path.clone());
        self.save_prefs();
        self.open_video(path);
    }

    pub fn open_video(&mut self, path: PathBuf) {
        let result = media::open_source(&path).and_then(|source| self.player.open(source));
        match result {
            Ok(()) => {
                if let Some(info) = self.player.info() {
                    self.writer_form.fps = info.fps;
                }
                self.zoom = 1.0;
                self.status = None;
            }
            Err(e) => self.report_error(&format!("Failed to open {}", path.display()), e),
        }
    }

    /// Ask for a CSV file and read it on a worker thread.
    fn load_graph(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("CSV", &["csv"]);
        if let Some(dir) = Preferences::dialog_dir(&self.prefs.last_graph_path) {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.pick_file() else {
            return;
        };
        self.spawn_graph_load(path);
    }

    pub fn spawn_graph_load(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.graph_loader = Some(receiver);
        self.loading_message = Some("Loading graph data...".to_string());

        std::thread::spawn(move || {
            let _ = sender.send(read_graph_file(path));
        });
    }

    fn poll_graph_loader(&mut self) {
        let Some(receiver) = self.graph_loader.as_ref() else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.graph_loader = None;
        self.loading_message = None;

        match result {
            Ok(loaded) => {
                self.player.load_series_text(&loaded.text);
                self.prefs.last_graph_path = Some(loaded.path);
                self.save_prefs();
                self.recompose();
            }
            Err(e) => self.report_error("Graph load failed", e),
        }
    }

    fn recompose(&mut self) {
        if let Err(e) = self.player.recompose() {
            self.report_error("Render failed", e);
        }
    }

    fn import_preset(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Presets", &["yaml", "yml", "json"])
            .pick_file()
        else {
            return;
        };
        match serialization::import_preset(&path) {
            Ok(settings) => {
                self.player.apply_settings(settings);
                log::info!("Imported overlay preset from {}", path.display());
                self.recompose();
            }
            Err(e) => self.report_error("Failed to import preset", e),
        }
    }

    fn export_preset(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("YAML", &["yaml", "yml"])
            .add_filter("JSON", &["json"])
            .set_file_name("overlay.yaml")
            .save_file()
        else {
            return;
        };
        match serialization::export_preset(&self.player.settings, &path) {
            Ok(()) => log::info!("Exported overlay preset to {}", path.display()),
            Err(e) => self.report_error("Failed to export preset", e),
        }
    }

    fn browse_output(&mut self) {
        let mut dialog = rfd::FileDialog::new();
        if let Some(dir) = Preferences::dialog_dir(&self.prefs.last_output_path) {
            dialog = dialog.set_directory(dir);
        }
        let picked = match self.writer_form.format.extension() {
            Some(ext) => dialog
                .add_filter(ext.to_uppercase(), &[ext])
                .set_file_name(format!("overlay.{}", ext))
                .save_file(),
            None => dialog.pick_folder(),
        };
        if let Some(path) = picked {
            self.writer_form.output_path = path.display().to_string();
        }
    }

    fn open_writer(&mut self) {
        let path = PathBuf::from(self.writer_form.output_path.trim());
        let format: OutputFormat = self.writer_form.format;
        match self.player.open_writer(&path, format, self.writer_form.fps) {
            Ok(()) => {
                self.prefs.last_output_path = Some(path);
                self.save_prefs();
                self.status = None;
            }
            Err(e) => self.report_error("Unable to record video", e),
        }
    }

    fn close_writer(&mut self) {
        if let Err(e) = self.player.close_writer() {
            self.report_error("Failed to close writer", e);
        }
    }

    fn handle_toolbar(&mut self, action: toolbar::ToolbarAction) {
        use toolbar::ToolbarAction;

        let result = match action {
            ToolbarAction::None => Ok(()),
            ToolbarAction::LoadVideo => {
                self.load_video();
                Ok(())
            }
            ToolbarAction::Play => {
                self.player.play(Instant::now());
                Ok(())
            }
            ToolbarAction::Pause => {
                self.player.pause();
                Ok(())
            }
            ToolbarAction::StepBack => self.player.step_back().map(|_| ()),
            ToolbarAction::StepForward => self.player.step_forward().map(|_| ()),
            ToolbarAction::Seek(frame) => self.player.seek(frame).map(|_| ()),
            ToolbarAction::SetFps(fps) => {
                self.player.set_fps(fps);
                Ok(())
            }
            ToolbarAction::ZoomIn => {
                self.zoom *= ZOOM_STEP;
                Ok(())
            }
            ToolbarAction::ZoomOut => {
                self.zoom /= ZOOM_STEP;
                Ok(())
            }
            ToolbarAction::ZoomReset => {
                self.zoom = 1.0;
                Ok(())
            }
        };
        if let Err(e) = result {
            self.report_error("Frame read failed", e);
        }
    }

    fn handle_properties(&mut self, response: properties::PropertiesResponse) {
        use properties::PropertiesAction;

        let mut changed = response.changed;
        match response.action {
            PropertiesAction::None => {}
            PropertiesAction::LoadGraph => self.load_graph(),
            PropertiesAction::SetHasHeaders(flag) => {
                self.player.set_has_headers(flag);
                changed = true;
            }
            PropertiesAction::GraphX(x) => {
                self.player.set_graph_x(x);
                changed = true;
            }
            PropertiesAction::GraphY(y) => {
                self.player.set_graph_y(y);
                changed = true;
            }
            PropertiesAction::GraphW(w) => {
                self.player.set_graph_w(w);
                changed = true;
            }
            PropertiesAction::GraphH(h) => {
                self.player.set_graph_h(h);
                changed = true;
            }
            PropertiesAction::ImportPreset => self.import_preset(),
            PropertiesAction::ExportPreset => self.export_preset(),
        }
        if changed {
            self.recompose();
        }
    }

    /// Keyboard shortcuts, ignored while a text field has focus.
    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            let action = if self.player.is_playing() {
                toolbar::ToolbarAction::Pause
            } else {
                toolbar::ToolbarAction::Play
            };
            self.handle_toolbar(action);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            self.handle_toolbar(toolbar::ToolbarAction::StepBack);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.handle_toolbar(toolbar::ToolbarAction::StepForward);
        }
    }

    /// Upload the composite when it changed since the last upload.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let generation = self.player.generation();
        if generation == self.texture_generation && self.texture.is_some() {
            return;
        }
        let Some(composite) = self.player.composite() else {
            return;
        };
        let size = [composite.width() as usize, composite.height() as usize];
        let color_image = egui::ColorImage::from_rgb(size, composite.as_raw());
        match self.texture.as_mut() {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("composite", color_image, egui::TextureOptions::LINEAR));
            }
        }
        self.texture_generation = generation;
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_graph_loader();
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        // Timer-driven frame advance
        let now = Instant::now();
        match self.player.tick(now) {
            Ok(TickOutcome::Ended) => log::debug!("Playback stopped at end of stream"),
            Ok(_) => {}
            Err(e) => {
                self.player.pause();
                self.report_error("Playback stopped", e);
            }
        }
        if let Some(wait) = self.player.until_next_tick(now) {
            ctx.request_repaint_after(wait);
        }

        self.handle_keys(ctx);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Video...").clicked() {
                        self.load_video();
                        ui.close_menu();
                    }
                    if ui.button("Load Graph...").clicked() {
                        self.load_graph();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Import Preset...").clicked() {
                        self.import_preset();
                        ui.close_menu();
                    }
                    if ui.button("Export Preset...").clicked() {
                        self.export_preset();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Transport toolbar
        let transport = match self.player.info() {
            Some(info) => toolbar::TransportState {
                is_open: true,
                playing: self.player.is_playing(),
                position: self.player.position(),
                frame_suffix: info.frame_suffix(),
                last_frame: info.last_frame(),
                fps: self.player.fps(),
                fps_suffix: info.fps_suffix(),
            },
            None => toolbar::TransportState {
                is_open: false,
                playing: false,
                position: 0,
                frame_suffix: String::new(),
                last_frame: 0,
                fps: self.player.fps(),
                fps_suffix: String::new(),
            },
        };
        let mut looping = self.player.looping;
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &transport, &mut looping))
            .inner;
        self.player.looping = looping;
        self.handle_toolbar(toolbar_action);

        // Status bar
        let format_label = self
            .player
            .info()
            .map(|info| {
                let name = info
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("{}  {}", name, info.format_label().replace('\n', ", "))
            })
            .unwrap_or_else(|| "No video loaded".to_string());
        let fps_label = self.player.fps_label();
        let recording_label = self.player.writer().map(|w| {
            format!("Recording {} ({} frames)", w.path().display(), w.frames_written())
        });
        let status = self.status.clone();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format_label);
                ui.separator();
                ui.label(fps_label);
                if let Some(recording) = recording_label {
                    ui.separator();
                    ui.label(recording);
                }
                if let Some(status) = status {
                    ui.separator();
                    ui.label(egui::RichText::new(status).color(egui::Color32::LIGHT_RED));
                }
            });
        });

        // Scrubber
        let seek = egui::TopBottomPanel::bottom("timeline")
            .show(ctx, |ui| {
                timeline::show(
                    ui,
                    transport.position,
                    transport.last_frame,
                    transport.is_open,
                )
            })
            .inner;
        if let Some(frame) = seek {
            self.handle_toolbar(toolbar::ToolbarAction::Seek(frame));
        }

        // Properties panel (right side)
        let frame_size = self.player.info().map(|i| (i.width, i.height));
        let has_headers = self.player.has_headers();
        let series_len = self.player.series().len();
        let can_open_writer = self.player.composite().is_some();
        let recording = self.player.is_recording();
        let (properties_response, writer_action) = egui::SidePanel::right("properties")
            .default_width(280.0)
            .show(ctx, |ui| {
                let writer_action =
                    writer_panel::show(ui, &mut self.writer_form, can_open_writer, recording);
                ui.separator();
                let response = properties::show(
                    ui,
                    &mut self.player.settings,
                    has_headers,
                    series_len,
                    frame_size,
                );
                (response, writer_action)
            })
            .inner;
        self.handle_properties(properties_response);
        match writer_action {
            writer_panel::WriterAction::None => {}
            writer_panel::WriterAction::Browse => self.browse_output(),
            writer_panel::WriterAction::Open => self.open_writer(),
            writer_panel::WriterAction::Close => self.close_writer(),
        }

        self.sync_texture(ctx);

        // Main canvas (center)
        let image_size = self.player.composite().map(|c| c.dimensions());
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(message);
                    });
                }
                canvas::show(ui, &self.texture, image_size, self.zoom);
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.close_writer();
        self.save_prefs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::series::RawCsv;

    #[test]
    fn test_graph_file_with_latin1_header_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speed.csv");
        // "t,vitesse m/s\xb2" in Latin-1 followed by two rows.
        let mut bytes = b"t,vitesse m/s".to_vec();
        bytes.push(0xB2);
        bytes.extend_from_slice(b"\n0,1.5\n1,2.5\n");
        std::fs::write(&path, bytes).unwrap();

        let loaded = read_graph_file(path.clone()).unwrap();
        assert_eq!(loaded.path, path);

        let (series, labels) = RawCsv::new(&loaded.text).parse(true);
        assert_eq!(series.values(), &[1.5, 2.5]);
        let labels = labels.unwrap();
        assert_eq!(labels.x, "t");
        assert!(labels.y.starts_with("vitesse m/s"));
    }

    #[test]
    fn test_missing_graph_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_graph_file(dir.path().join("absent.csv")).is_err());
    }
}
