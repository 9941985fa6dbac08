// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback controller.
//!
//! Owns the open frame source, the loaded series, the overlay settings and
//! the optional output writer. Every control in the UI maps onto one method
//! here, which keeps the egui layer free of video and rendering logic.

use crate::error::Result;
use crate::io::media::{open_sink, FrameSink, FrameSource, OutputFormat};
use crate::models::overlay::{GraphRect, OverlaySettings};
use crate::models::playback::{FpsMeter, PlaybackClock};
use crate::models::series::{RawCsv, Series};
use crate::models::video::VideoInfo;
use crate::render::compose::Compositor;
use image::RgbImage;
use std::path::Path;
use std::time::{Duration, Instant};

/// Frame rate assumed when a container reports none.
const FALLBACK_FPS: f64 = 25.0;

/// What a playback tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer not due (or not running).
    Idle,
    /// The next frame was shown.
    Advanced,
    /// End of stream reached; rewound to the first frame.
    Looped,
    /// End of stream reached; playback paused.
    Ended,
}

pub struct Player {
    source: Option<Box<dyn FrameSource>>,
    /// Last decoded frame, before composition.
    frame: Option<RgbImage>,
    composite: Option<RgbImage>,
    /// Index of `frame` in the stream.
    position: u64,
    /// Bumped whenever `composite` changes.
    generation: u64,
    raw_csv: RawCsv,
    series: Series,
    has_headers: bool,
    pub settings: OverlaySettings,
    pub looping: bool,
    compositor: Compositor,
    writer: Option<Box<dyn FrameSink>>,
    clock: PlaybackClock,
    fps_meter: FpsMeter,
    fps: f64,
}

impl Player {
    pub fn new(settings: OverlaySettings) -> Self {
        Self {
            source: None,
            frame: None,
            composite: None,
            position: 0,
            generation: 0,
            raw_csv: RawCsv::default(),
            series: Series::default(),
            has_headers: true,
            settings,
            looping: false,
            compositor: Compositor::new(),
            writer: None,
            clock: PlaybackClock::default(),
            fps_meter: FpsMeter::default(),
            fps: FALLBACK_FPS,
        }
    }

    // ---- Video ----

    /// Take ownership of a freshly opened source and show its first frame.
    pub fn open(&mut self, mut source: Box<dyn FrameSource>) -> Result<()> {
        self.clock.stop();
        source.seek(0)?;

        let info = source.info().clone();
        self.fps = if info.fps.is_finite() && info.fps > 0.0 {
            info.fps
        } else {
            FALLBACK_FPS
        };
        self.clock.set_fps(self.fps);
        self.settings.rect = GraphRect::default_for(info.width, info.height);

        self.source = Some(source);
        self.frame = None;
        self.composite = None;
        self.position = 0;
        self.fps_meter = FpsMeter::default();

        if let Some(frame) = self.read_next()? {
            self.show(frame, 0)?;
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    pub fn info(&self) -> Option<&VideoInfo> {
        self.source.as_ref().map(|s| s.info())
    }

    /// Index of the frame on screen.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn composite(&self) -> Option<&RgbImage> {
        self.composite.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ---- Playback ----

    pub fn play(&mut self, now: Instant) -> bool {
        if !self.is_open() {
            return false;
        }
        self.clock.start(now);
        log::debug!("Playback started at {:.3} FPS", self.fps);
        true
    }

    pub fn pause(&mut self) {
        if self.clock.is_running() {
            log::debug!("Playback paused at frame {}", self.position);
        }
        self.clock.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_running()
    }

    /// Time until the next frame is due, if playing.
    pub fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.clock.until_next(now)
    }

    /// Advance one frame if the playback timer is due.
    pub fn tick(&mut self, now: Instant) -> Result<TickOutcome> {
        if !self.clock.poll(now) {
            return Ok(TickOutcome::Idle);
        }
        self.advance()
    }

    /// Show the next frame, handling end of stream.
    pub fn advance(&mut self) -> Result<TickOutcome> {
        if !self.is_open() {
            return Ok(TickOutcome::Idle);
        }
        if let Some(frame) = self.read_next()? {
            let index = if self.frame.is_some() {
                self.position + 1
            } else {
                self.position
            };
            self.show(frame, index)?;
            return Ok(TickOutcome::Advanced);
        }

        if self.looping {
            if let Some(source) = self.source.as_mut() {
                source.seek(0)?;
            }
            if let Some(frame) = self.read_next()? {
                log::debug!("End of stream, looping");
                self.show(frame, 0)?;
                return Ok(TickOutcome::Looped);
            }
        }

        log::info!("End of stream at frame {}", self.position);
        self.pause();
        Ok(TickOutcome::Ended)
    }

    pub fn step_forward(&mut self) -> Result<bool> {
        self.seek(self.position + 1)
    }

    pub fn step_back(&mut self) -> Result<bool> {
        self.seek(self.position.saturating_sub(1))
    }

    /// Jump to `frame` (clamped to the stream). Returns whether a frame was
    /// decoded there.
    pub fn seek(&mut self, frame: u64) -> Result<bool> {
        let Some(source) = self.source.as_mut() else {
            return Ok(false);
        };
        let target = frame.min(source.info().last_frame());
        source.seek(target)?;
        log::debug!("Seek to frame {}", target);

        match self.read_next()? {
            Some(decoded) => {
                self.show(decoded, target)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Playback rate used by the timer and the data window.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Change the playback rate. Non-positive rates are ignored.
    pub fn set_fps(&mut self, fps: f64) -> bool {
        if !self.is_open() || !self.clock.set_fps(fps) {
            return false;
        }
        self.fps = fps;
        log::debug!("Set capture fps: {}", fps);
        true
    }

    /// Achieved frame rate, e.g. `FPS: 24.98`.
    pub fn fps_label(&self) -> String {
        self.fps_meter.label()
    }

    // ---- Series ----

    /// Replace the loaded CSV and parse it with the current header option.
    pub fn load_series_text(&mut self, text: &str) {
        self.raw_csv = RawCsv::new(text);
        self.reparse_series();
        if self.series.is_empty() {
            log::warn!("Graph data has no values");
        } else {
            log::info!("Loaded {} graph values", self.series.len());
        }
    }

    pub fn has_headers(&self) -> bool {
        self.has_headers
    }

    /// Re-parse the loaded CSV with or without a header row.
    pub fn set_has_headers(&mut self, has_headers: bool) {
        self.has_headers = has_headers;
        self.reparse_series();
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    fn reparse_series(&mut self) {
        let (series, labels) = self.raw_csv.parse(self.has_headers);
        if let Some(labels) = labels {
            self.settings.x_label = labels.x;
            self.settings.y_label = labels.y;
        }
        self.series = series;
    }

    // ---- Graph rectangle ----

    fn frame_size(&self) -> (u32, u32) {
        self.info()
            .map(|info| (info.width, info.height))
            .unwrap_or((u32::MAX, u32::MAX))
    }

    pub fn set_graph_x(&mut self, x: u32) {
        let (w, _) = self.frame_size();
        self.settings.rect.set_x(x, w);
    }

    pub fn set_graph_y(&mut self, y: u32) {
        let (_, h) = self.frame_size();
        self.settings.rect.set_y(y, h);
    }

    pub fn set_graph_w(&mut self, width: u32) {
        let (w, _) = self.frame_size();
        self.settings.rect.set_w(width, w);
    }

    pub fn set_graph_h(&mut self, height: u32) {
        let (_, h) = self.frame_size();
        self.settings.rect.set_h(height, h);
    }

    /// Replace all settings (e.g. from a preset), keeping the rectangle
    /// inside the current frame.
    pub fn apply_settings(&mut self, settings: OverlaySettings) {
        let (w, h) = self.frame_size();
        self.settings = settings;
        self.settings.rect = self.settings.rect.clamped(w, h);
    }

    // ---- Output ----

    /// Open an encoder sized to the current frame, replacing any open one.
    pub fn open_writer(&mut self, path: &Path, format: OutputFormat, fps: f64) -> Result<()> {
        let size = self
            .composite
            .as_ref()
            .map(|c| c.dimensions())
            .or_else(|| self.info().map(|i| (i.width, i.height)))
            .unwrap_or((0, 0));
        let sink = open_sink(path, format, size, fps)?;
        self.attach_writer(sink)
    }

    /// Start writing composites to an already opened sink.
    pub fn attach_writer(&mut self, sink: Box<dyn FrameSink>) -> Result<()> {
        self.close_writer()?;
        self.writer = Some(sink);
        Ok(())
    }

    pub fn close_writer(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.finish()?;
        }
        Ok(())
    }

    pub fn writer(&self) -> Option<&dyn FrameSink> {
        self.writer.as_deref()
    }

    pub fn is_recording(&self) -> bool {
        self.writer.is_some()
    }

    // ---- Composition ----

    /// Re-render the frame on screen after a settings change. Nothing is
    /// written to the output.
    pub fn recompose(&mut self) -> Result<()> {
        let Some(frame) = self.frame.as_ref() else {
            return Ok(());
        };
        let composite = self.compositor.compose(
            frame,
            self.position,
            self.fps,
            &self.series,
            &self.settings,
        )?;
        self.composite = Some(composite);
        self.generation += 1;
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<RgbImage>> {
        match self.source.as_mut() {
            Some(source) => source.read(),
            None => Ok(None),
        }
    }

    /// Compose a newly decoded frame, display it and record it.
    fn show(&mut self, frame: RgbImage, index: u64) -> Result<()> {
        let composite =
            self.compositor
                .compose(&frame, index, self.fps, &self.series, &self.settings)?;

        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.write(&composite) {
                log::error!("Failed to write frame {}: {}", index, e);
            }
        }

        self.frame = Some(frame);
        self.composite = Some(composite);
        self.position = index;
        self.generation += 1;
        self.fps_meter.mark(Instant::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::path::PathBuf;

    /// Frames whose red channel encodes their index.
    struct MemorySource {
        info: VideoInfo,
        frames: Vec<RgbImage>,
        next: u64,
    }

    impl MemorySource {
        fn boxed(count: u64) -> Box<dyn FrameSource> {
            let frames = (0..count)
                .map(|i| RgbImage::from_pixel(64, 48, Rgb([i as u8, 0, 0])))
                .collect();
            Box::new(Self {
                info: VideoInfo {
                    path: PathBuf::from("memory"),
                    frame_count: count,
                    width: 64,
                    height: 48,
                    fps: 25.0,
                },
                frames,
                next: 0,
            })
        }
    }

    impl FrameSource for MemorySource {
        fn info(&self) -> &VideoInfo {
            &self.info
        }

        fn seek(&mut self, frame: u64) -> Result<()> {
            self.next = frame;
            Ok(())
        }

        fn read(&mut self) -> Result<Option<RgbImage>> {
            let frame = self.frames.get(self.next as usize).cloned();
            if frame.is_some() {
                self.next += 1;
            }
            Ok(frame)
        }
    }

    #[derive(Default)]
    struct MemorySink {
        written: u64,
        finished: bool,
    }

    impl FrameSink for MemorySink {
        fn write(&mut self, _frame: &RgbImage) -> Result<()> {
            self.written += 1;
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            Ok(())
        }

        fn path(&self) -> &Path {
            Path::new("memory")
        }

        fn frames_written(&self) -> u64 {
            self.written
        }
    }

    /// Chart kept out of the frame so pixel checks see the source.
    fn player() -> Player {
        Player::new(OverlaySettings::default())
    }

    fn opened(count: u64) -> Player {
        let mut player = player();
        player.open(MemorySource::boxed(count)).unwrap();
        player.settings.rect = GraphRect::default();
        player
    }

    fn shown_index(player: &Player) -> u8 {
        player.frame.as_ref().expect("frame").get_pixel(0, 0).0[0]
    }

    #[test]
    fn test_open_shows_first_frame_and_defaults() {
        let mut player = player();
        player.open(MemorySource::boxed(5)).unwrap();

        let info = player.info().unwrap();
        assert_eq!(info.frame_suffix(), "/5");
        assert_eq!(player.fps(), 25.0);
        assert_eq!(player.position(), 0);
        assert_eq!(player.settings.rect, GraphRect { x: 0, y: 24, w: 64, h: 24 });
        assert!(player.composite().is_some());
        assert_eq!(shown_index(&player), 0);
    }

    #[test]
    fn test_play_requires_open_source() {
        let mut player = player();
        assert!(!player.play(Instant::now()));
        assert!(!player.is_playing());

        let mut player = opened(3);
        assert!(player.play(Instant::now()));
        assert!(player.is_playing());
        player.pause();
        assert!(!player.is_playing());
    }

    #[test]
    fn test_tick_advances_when_due() {
        let mut player = opened(3);
        let t0 = Instant::now();
        player.play(t0);

        assert_eq!(player.tick(t0).unwrap(), TickOutcome::Idle);
        assert_eq!(
            player.tick(t0 + Duration::from_millis(40)).unwrap(),
            TickOutcome::Advanced
        );
        assert_eq!(player.position(), 1);
        assert_eq!(shown_index(&player), 1);
    }

    #[test]
    fn test_end_of_stream_pauses() {
        let mut player = opened(2);
        player.play(Instant::now());

        assert_eq!(player.advance().unwrap(), TickOutcome::Advanced);
        assert_eq!(player.advance().unwrap(), TickOutcome::Ended);
        assert!(!player.is_playing());
        assert_eq!(player.position(), 1);
    }

    #[test]
    fn test_end_of_stream_loops() {
        let mut player = opened(2);
        player.looping = true;
        player.play(Instant::now());

        player.advance().unwrap();
        assert_eq!(player.advance().unwrap(), TickOutcome::Looped);
        assert!(player.is_playing());
        assert_eq!(player.position(), 0);
        assert_eq!(shown_index(&player), 0);
    }

    #[test]
    fn test_steps_and_seek() {
        let mut player = opened(10);

        assert!(player.step_forward().unwrap());
        assert!(player.step_forward().unwrap());
        assert_eq!(player.position(), 2);
        assert_eq!(shown_index(&player), 2);

        assert!(player.step_back().unwrap());
        assert_eq!(player.position(), 1);

        assert!(player.seek(7).unwrap());
        assert_eq!(shown_index(&player), 7);

        // Clamped to the last frame.
        assert!(player.seek(500).unwrap());
        assert_eq!(player.position(), 9);

        player.seek(0).unwrap();
        assert!(player.step_back().unwrap());
        assert_eq!(player.position(), 0);
    }

    #[test]
    fn test_playback_continues_after_seek() {
        let mut player = opened(10);
        player.seek(4).unwrap();
        player.advance().unwrap();
        assert_eq!(player.position(), 5);
        assert_eq!(shown_index(&player), 5);
    }

    #[test]
    fn test_set_fps() {
        let mut player = player();
        assert!(!player.set_fps(30.0));

        let mut player = opened(3);
        assert!(player.set_fps(50.0));
        assert_eq!(player.fps(), 50.0);
        assert!(!player.set_fps(0.0));
        assert_eq!(player.fps(), 50.0);
    }

    #[test]
    fn test_header_toggle_reparses() {
        let mut player = player();
        player.load_series_text("t,value\n0,1\n1,2\n");
        assert_eq!(player.series().len(), 2);
        assert_eq!(player.settings.x_label, "t");
        assert_eq!(player.settings.y_label, "value");

        player.set_has_headers(false);
        assert_eq!(player.series().len(), 3);
        assert_eq!(player.series().keys()[0], 0.0);
    }

    #[test]
    fn test_empty_graph_text_gives_empty_series() {
        let mut player = player();
        player.load_series_text("");
        assert!(player.series().is_empty());
    }

    #[test]
    fn test_rect_edits_stay_inside_frame() {
        let mut player = opened(1);
        player.settings.rect = GraphRect::default_for(64, 48);

        player.set_graph_x(40);
        assert_eq!(player.settings.rect.w, 24);
        player.set_graph_w(64);
        assert_eq!(player.settings.rect.x, 0);
        player.set_graph_h(1000);
        assert_eq!(player.settings.rect.h, 48);
        assert_eq!(player.settings.rect.y, 0);
    }

    #[test]
    fn test_writer_gets_frame_events_only() {
        let mut player = opened(5);
        player.attach_writer(Box::new(MemorySink::default())).unwrap();
        assert!(player.is_recording());

        player.advance().unwrap();
        player.step_forward().unwrap();
        player.seek(0).unwrap();
        player.recompose().unwrap();
        player.settings.alpha = 0.1;
        player.recompose().unwrap();

        assert_eq!(player.writer().unwrap().frames_written(), 3);

        player.close_writer().unwrap();
        assert!(!player.is_recording());
    }

    #[test]
    fn test_recompose_bumps_generation() {
        let mut player = opened(2);
        let before = player.generation();
        player.recompose().unwrap();
        assert!(player.generation() > before);

        let mut empty = self::player();
        empty.recompose().unwrap();
        assert_eq!(empty.generation(), 0);
    }

    #[test]
    fn test_apply_settings_clamps_rect() {
        let mut player = opened(1);
        player.apply_settings(OverlaySettings {
            rect: GraphRect { x: 50, y: 40, w: 30, h: 30 },
            ..OverlaySettings::default()
        });
        let rect = player.settings.rect;
        assert!(rect.x + rect.w <= 64);
        assert!(rect.y + rect.h <= 48);
    }
}
