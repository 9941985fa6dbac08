// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Properties of an opened video.

use std::path::PathBuf;

/// Stream properties reported by a frame source.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub frame_count: u64,
    pub width: u32,
    pub height: u32,
    /// Native frame rate of the container.
    pub fps: f64,
}

impl VideoInfo {
    /// Suffix for the frame spinner, e.g. `/1200`.
    pub fn frame_suffix(&self) -> String {
        format!("/{}", self.frame_count)
    }

    /// Suffix for the FPS spinner, e.g. ` (29.97 native)`.
    pub fn fps_suffix(&self) -> String {
        format!(" ({} native)", self.fps)
    }

    /// Two-line format summary shown next to the transport controls.
    pub fn format_label(&self) -> String {
        format!(
            "Video format: {}x{} px\n{} FPS",
            self.width, self.height, self.fps
        )
    }

    /// Highest seekable frame index.
    pub fn last_frame(&self) -> u64 {
        self.frame_count.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> VideoInfo {
        VideoInfo {
            path: PathBuf::from("clip.mp4"),
            frame_count: 1200,
            width: 1920,
            height: 1080,
            fps: 29.97,
        }
    }

    #[test]
    fn test_suffixes() {
        let info = info();
        assert_eq!(info.frame_suffix(), "/1200");
        assert_eq!(info.fps_suffix(), " (29.97 native)");
        assert_eq!(info.format_label(), "Video format: 1920x1080 px\n29.97 FPS");
    }

    #[test]
    fn test_last_frame() {
        let mut info = info();
        assert_eq!(info.last_frame(), 1199);
        info.frame_count = 0;
        assert_eq!(info.last_frame(), 0);
    }
}
