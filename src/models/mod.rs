// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: series, overlay settings, playback timing, video properties.

pub mod overlay;
pub mod playback;
pub mod series;
pub mod video;
