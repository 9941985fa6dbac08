// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types shared by the media, rendering and persistence layers.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vidplot operations.
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Errors that can occur while loading, compositing or writing frames.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Failed to open a file.
    #[error("Failed to open file: {path}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File extension not handled by any loader.
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Video containers need the OpenCV backend.
    #[error("Video backend unavailable for {path} (build with the `video-opencv` feature)")]
    BackendUnavailable { path: PathBuf },

    /// The decoder refused the file or a frame.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The encoder could not be opened or refused a frame.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Chart scene could not be built or rasterized.
    #[error("Chart render error: {0}")]
    Render(String),

    /// Image load/save failure.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Preset (de)serialization failure.
    #[error("Preset error: {0}")]
    Preset(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OverlayError {
    /// Create a FileOpen error.
    pub fn file_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOpen {
            path: path.into(),
            source,
        }
    }

    /// Create an UnsupportedFormat error.
    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Preset(err.to_string())
    }
}

impl From<serde_yaml::Error> for OverlayError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Preset(err.to_string())
    }
}

#[cfg(feature = "video-opencv")]
impl From<opencv::Error> for OverlayError {
    fn from(err: opencv::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
