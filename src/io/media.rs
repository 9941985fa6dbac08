// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading (images and videos) and composite output.
//!
//! Decoders and encoders sit behind the [`FrameSource`] and [`FrameSink`]
//! traits. Still images and PNG sequences are always available; video
//! containers go through OpenCV when the `video-opencv` feature is enabled.

use crate::error::{OverlayError, Result};
use crate::models::video::VideoInfo;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extensions opened as one-frame sources.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Extensions offered in the open-video dialog.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "m4v", "webm", "wmv"];

/// Frame rate reported for still images.
const STILL_FPS: f64 = 25.0;

/// A seekable stream of decoded RGB frames.
pub trait FrameSource {
    fn info(&self) -> &VideoInfo;

    /// Position the stream so the next [`read`](Self::read) returns `frame`.
    fn seek(&mut self, frame: u64) -> Result<()>;

    /// Decode the next frame, `None` at end of stream.
    fn read(&mut self) -> Result<Option<RgbImage>>;
}

/// An encoder accepting composite frames.
pub trait FrameSink {
    fn write(&mut self, frame: &RgbImage) -> Result<()>;

    /// Flush and close the output.
    fn finish(&mut self) -> Result<()>;

    fn path(&self) -> &Path;

    fn frames_written(&self) -> u64;
}

/// Output container/codec choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// MPEG-4 part 2 in an MP4 container
    Mp4,
    /// Motion JPEG in an AVI container
    Avi,
    /// H.264
    H264,
    /// Numbered PNG files in a directory
    PngSequence,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Mp4,
        OutputFormat::Avi,
        OutputFormat::H264,
        OutputFormat::PngSequence,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "MP4 (mp4v)",
            OutputFormat::Avi => "AVI (MJPG)",
            OutputFormat::H264 => "H.264 (h264)",
            OutputFormat::PngSequence => "PNG sequence",
        }
    }

    /// Four-character codec code for the video writer.
    pub fn fourcc(&self) -> Option<[char; 4]> {
        match self {
            OutputFormat::Mp4 => Some(['m', 'p', '4', 'v']),
            OutputFormat::Avi => Some(['M', 'J', 'P', 'G']),
            OutputFormat::H264 => Some(['h', '2', '6', '4']),
            OutputFormat::PngSequence => None,
        }
    }

    /// File extension for the save dialog, `None` for directory outputs.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Mp4 | OutputFormat::H264 => Some("mp4"),
            OutputFormat::Avi => Some("avi"),
            OutputFormat::PngSequence => None,
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Open `path` as a frame source, picking the decoder by extension.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    let extension = extension_of(path);
    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Ok(Box::new(StillImageSource::open(path)?));
    }
    open_video(path)
}

#[cfg(feature = "video-opencv")]
fn open_video(path: &Path) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(super::opencv_video::OpencvSource::open(path)?))
}

#[cfg(not(feature = "video-opencv"))]
fn open_video(path: &Path) -> Result<Box<dyn FrameSource>> {
    Err(OverlayError::BackendUnavailable {
        path: path.to_path_buf(),
    })
}

/// Open an encoder for `width` x `height` frames at `fps`.
pub fn open_sink(
    path: &Path,
    format: OutputFormat,
    size: (u32, u32),
    fps: f64,
) -> Result<Box<dyn FrameSink>> {
    match format.fourcc() {
        None => Ok(Box::new(PngSequenceSink::create(path, size)?)),
        Some(fourcc) => open_video_sink(path, fourcc, size, fps),
    }
}

#[cfg(feature = "video-opencv")]
fn open_video_sink(
    path: &Path,
    fourcc: [char; 4],
    size: (u32, u32),
    fps: f64,
) -> Result<Box<dyn FrameSink>> {
    Ok(Box::new(super::opencv_video::OpencvSink::create(
        path, fourcc, size, fps,
    )?))
}

#[cfg(not(feature = "video-opencv"))]
fn open_video_sink(
    path: &Path,
    _fourcc: [char; 4],
    _size: (u32, u32),
    _fps: f64,
) -> Result<Box<dyn FrameSink>> {
    Err(OverlayError::BackendUnavailable {
        path: path.to_path_buf(),
    })
}

/// A single image presented as a one-frame video.
pub struct StillImageSource {
    info: VideoInfo,
    image: RgbImage,
    next: u64,
}

impl StillImageSource {
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path)?.to_rgb8();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OverlayError::Decode(format!("empty image: {}", path.display())));
        }
        log::info!("Loaded image: {} ({}x{})", path.display(), width, height);
        Ok(Self {
            info: VideoInfo {
                path: path.to_path_buf(),
                frame_count: 1,
                width,
                height,
                fps: STILL_FPS,
            },
            image,
            next: 0,
        })
    }
}

impl FrameSource for StillImageSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn seek(&mut self, frame: u64) -> Result<()> {
        self.next = frame;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<RgbImage>> {
        if self.next == 0 {
            self.next = 1;
            Ok(Some(self.image.clone()))
        } else {
            Ok(None)
        }
    }
}

/// Writes each frame as `frame_NNNNNN.png` into a directory.
pub struct PngSequenceSink {
    dir: PathBuf,
    size: (u32, u32),
    written: u64,
}

impl PngSequenceSink {
    pub fn create(dir: &Path, size: (u32, u32)) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| OverlayError::file_open(dir, e))?;
        log::info!(
            "Recording PNG sequence ({} x {}) to: {}",
            size.0,
            size.1,
            dir.display()
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            size,
            written: 0,
        })
    }

    fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", index))
    }
}

impl FrameSink for PngSequenceSink {
    fn write(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != self.size {
            return Err(OverlayError::Encode(format!(
                "frame is {}x{}, output expects {}x{}",
                frame.width(),
                frame.height(),
                self.size.0,
                self.size.1
            )));
        }
        frame.save(self.frame_path(self.written))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        log::info!(
            "PNG sequence closed after {} frames: {}",
            self.written,
            self.dir.display()
        );
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.dir
    }

    fn frames_written(&self) -> u64 {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_fourcc_choices() {
        assert_eq!(OutputFormat::Mp4.fourcc(), Some(['m', 'p', '4', 'v']));
        assert_eq!(OutputFormat::Avi.fourcc(), Some(['M', 'J', 'P', 'G']));
        assert_eq!(OutputFormat::H264.fourcc(), Some(['h', '2', '6', '4']));
        assert_eq!(OutputFormat::PngSequence.fourcc(), None);
    }

    #[test]
    fn test_still_image_is_one_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        RgbImage::from_pixel(8, 6, Rgb([1, 2, 3])).save(&path).unwrap();

        let mut source = open_source(&path).unwrap();
        assert_eq!(source.info().frame_count, 1);
        assert_eq!((source.info().width, source.info().height), (8, 6));

        let frame = source.read().unwrap().expect("first frame");
        assert_eq!(*frame.get_pixel(0, 0), Rgb([1, 2, 3]));
        assert!(source.read().unwrap().is_none());

        source.seek(0).unwrap();
        assert!(source.read().unwrap().is_some());
    }

    #[test]
    fn test_missing_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_source(&dir.path().join("nope.png")).is_err());
    }

    #[cfg(not(feature = "video-opencv"))]
    #[test]
    fn test_video_requires_backend() {
        let result = open_source(Path::new("clip.mp4"));
        assert!(matches!(result, Err(OverlayError::BackendUnavailable { .. })));

        let sink = open_sink(Path::new("out.mp4"), OutputFormat::Mp4, (4, 4), 25.0);
        assert!(matches!(sink, Err(OverlayError::BackendUnavailable { .. })));
    }

    #[test]
    fn test_png_sequence_numbers_frames() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frames");
        let mut sink = open_sink(&out, OutputFormat::PngSequence, (4, 3), 25.0).unwrap();

        let frame = RgbImage::from_pixel(4, 3, Rgb([200, 0, 0]));
        sink.write(&frame).unwrap();
        sink.write(&frame).unwrap();
        sink.finish().unwrap();

        assert_eq!(sink.frames_written(), 2);
        assert!(out.join("frame_000000.png").exists());
        assert!(out.join("frame_000001.png").exists());

        let wrong = RgbImage::new(2, 2);
        assert!(sink.write(&wrong).is_err());
    }
}
