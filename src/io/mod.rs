// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for media, presets and preferences.

pub mod config;
pub mod media;
#[cfg(feature = "video-opencv")]
pub mod opencv_video;
pub mod serialization;
