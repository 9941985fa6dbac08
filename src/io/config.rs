// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted preferences: recent paths and the last overlay settings.

use crate::io::media::OutputFormat;
use crate::models::overlay::OverlaySettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub last_video_path: Option<PathBuf>,
    pub last_graph_path: Option<PathBuf>,
    pub last_output_path: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub has_headers: bool,
    pub loop_playback: bool,
    pub overlay: OverlaySettings,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            last_video_path: None,
            last_graph_path: None,
            last_output_path: None,
            output_format: OutputFormat::Mp4,
            has_headers: true,
            loop_playback: false,
            overlay: OverlaySettings::default(),
        }
    }
}

impl Preferences {
    /// Default location under the user's config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidplot")
            .join("config.json")
    }

    /// Load preferences, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                log::debug!("No preferences at {}, using defaults", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(prefs) => {
                log::info!("Loaded preferences from {}", path.display());
                prefs
            }
            Err(e) => {
                log::warn!("Ignoring corrupt preferences {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory to start a file dialog in, from a remembered file path.
    pub fn dialog_dir(path: &Option<PathBuf>) -> Option<PathBuf> {
        path.as_ref()
            .and_then(|p| p.parent())
            .filter(|p| p.is_dir())
            .map(Path::to_path_buf)
    }
}
