// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! OpenCV-backed video capture and writer.
//!
//! OpenCV hands out BGR(A) or grayscale matrices; frames are converted to
//! RGB on read and back to BGR on write.

use super::media::{FrameSink, FrameSource};
use crate::error::{OverlayError, Result};
use crate::models::video::VideoInfo;
use image::RgbImage;
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
    videoio,
};
use std::path::{Path, PathBuf};

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| OverlayError::Decode(format!("non UTF-8 path: {}", path.display())))
}

/// Convert a decoded matrix to an RGB image.
fn mat_to_rgb(mat: &Mat) -> Result<RgbImage> {
    let code = match mat.typ() {
        core::CV_8UC3 => imgproc::COLOR_BGR2RGB,
        core::CV_8UC4 => imgproc::COLOR_BGRA2RGB,
        core::CV_8UC1 => imgproc::COLOR_GRAY2RGB,
        other => {
            log::warn!("Unhandled matrix type {}", other);
            return Err(OverlayError::Decode(format!("unsupported pixel layout {}", other)));
        }
    };
    let mut rgb = Mat::default();
    imgproc::cvt_color(mat, &mut rgb, code, 0)?;

    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    let bytes = rgb.data_bytes()?.to_vec();
    RgbImage::from_raw(width, height, bytes)
        .ok_or_else(|| OverlayError::Decode("frame buffer size mismatch".to_string()))
}

/// Convert an RGB image to a BGR matrix for the writer.
fn rgb_to_mat(frame: &RgbImage) -> Result<Mat> {
    let mut rgb = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        core::CV_8UC3,
        core::Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(frame.as_raw());
    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

pub struct OpencvSource {
    capture: videoio::VideoCapture,
    info: VideoInfo,
}

impl OpencvSource {
    pub fn open(path: &Path) -> Result<Self> {
        let mut capture = videoio::VideoCapture::from_file(path_str(path)?, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(OverlayError::Decode(format!(
                "unable to open video: {}",
                path.display()
            )));
        }
        capture.set(videoio::CAP_PROP_POS_FRAMES, 0.0)?;

        let info = VideoInfo {
            path: path.to_path_buf(),
            frame_count: capture.get(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0) as u64,
            width: capture.get(videoio::CAP_PROP_FRAME_WIDTH)?.max(0.0) as u32,
            height: capture.get(videoio::CAP_PROP_FRAME_HEIGHT)?.max(0.0) as u32,
            fps: capture.get(videoio::CAP_PROP_FPS)?,
        };
        log::info!(
            "Opened video {} ({}x{}, {} frames, {} FPS)",
            path.display(),
            info.width,
            info.height,
            info.frame_count,
            info.fps
        );
        Ok(Self { capture, info })
    }
}

impl FrameSource for OpencvSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn seek(&mut self, frame: u64) -> Result<()> {
        self.capture.set(videoio::CAP_PROP_POS_FRAMES, frame as f64)?;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<RgbImage>> {
        let mut mat = Mat::default();
        if !self.capture.read(&mut mat)? || mat.rows() == 0 || mat.cols() == 0 {
            return Ok(None);
        }
        mat_to_rgb(&mat).map(Some)
    }
}

pub struct OpencvSink {
    writer: videoio::VideoWriter,
    path: PathBuf,
    size: (u32, u32),
    written: u64,
}

impl OpencvSink {
    pub fn create(path: &Path, fourcc: [char; 4], size: (u32, u32), fps: f64) -> Result<Self> {
        let encode = |e: opencv::Error| OverlayError::Encode(e.to_string());
        let code = videoio::VideoWriter::fourcc(fourcc[0], fourcc[1], fourcc[2], fourcc[3])
            .map_err(encode)?;
        let writer = videoio::VideoWriter::new(
            path_str(path)?,
            code,
            fps,
            core::Size::new(size.0 as i32, size.1 as i32),
            true,
        )
        .map_err(encode)?;
        if !writer.is_opened().map_err(encode)? {
            return Err(OverlayError::Encode(format!(
                "Unable to record video to: {}",
                path.display()
            )));
        }
        log::info!(
            "Recording video ({} x {}, {} FPS) to: {}",
            size.0,
            size.1,
            fps,
            path.display()
        );
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            size,
            written: 0,
        })
    }
}

impl FrameSink for OpencvSink {
    fn write(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.width() == 0 || frame.height() == 0 {
            log::warn!("Skipping empty frame");
            return Ok(());
        }
        if frame.dimensions() != self.size {
            return Err(OverlayError::Encode(format!(
                "frame is {}x{}, writer expects {}x{}",
                frame.width(),
                frame.height(),
                self.size.0,
                self.size.1
            )));
        }
        let mat = rgb_to_mat(frame)?;
        self.writer
            .write(&mat)
            .map_err(|e| OverlayError::Encode(e.to_string()))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer
            .release()
            .map_err(|e| OverlayError::Encode(e.to_string()))?;
        log::info!("Video recording stopped after {} frames", self.written);
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn frames_written(&self) -> u64 {
        self.written
    }
}
