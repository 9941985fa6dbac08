// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay preset serialization and deserialization.
//!
//! This module handles exporting and importing overlay settings in YAML
//! and JSON formats.

use crate::error::{OverlayError, Result};
use crate::models::overlay::OverlaySettings;
use std::path::Path;

/// Export overlay settings to YAML format.
pub fn export_yaml(settings: &OverlaySettings, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(settings)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export overlay settings to JSON format.
pub fn export_json(settings: &OverlaySettings, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import overlay settings from YAML format.
pub fn import_yaml(path: &Path) -> Result<OverlaySettings> {
    let yaml = std::fs::read_to_string(path).map_err(|e| OverlayError::file_open(path, e))?;
    Ok(serde_yaml::from_str(&yaml)?)
}

/// Import overlay settings from JSON format.
pub fn import_json(path: &Path) -> Result<OverlaySettings> {
    let json = std::fs::read_to_string(path).map_err(|e| OverlayError::file_open(path, e))?;
    Ok(serde_json::from_str(&json)?)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Export in the format implied by the file extension.
pub fn export_preset(settings: &OverlaySettings, path: &Path) -> Result<()> {
    match extension(path).as_str() {
        "yaml" | "yml" => export_yaml(settings, path),
        "json" => export_json(settings, path),
        other => Err(OverlayError::unsupported_format(other)),
    }
}

/// Import in the format implied by the file extension.
pub fn import_preset(path: &Path) -> Result<OverlaySettings> {
    match extension(path).as_str() {
        "yaml" | "yml" => import_yaml(path),
        "json" => import_json(path),
        other => Err(OverlayError::unsupported_format(other)),
    }
}
