// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export configuration, optionally loaded from environment variables.

/// three.js object format version written to the scene metadata.
pub const FORMAT_VERSION: &str = "4.3";

/// Export session configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Convert Z-up CAD axes to Y-up rendering axes (`x, y, z -> -x, z, y`).
    pub switch_coordinates: bool,
    /// Uniform scale written on the scene root matrix.
    pub scene_scale: f64,
    /// Output units per millimetre for flattened vertex coordinates.
    pub vertex_scale: f64,
    /// Name of the scene root object.
    pub scene_name: String,
    /// Generator string written to the scene metadata.
    pub generator: String,
}

impl ExportConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            switch_coordinates: std::env::var("SCENE_SWITCH_COORDINATES")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.switch_coordinates),
            scene_scale: std::env::var("SCENE_SCALE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.scene_scale),
            vertex_scale: std::env::var("SCENE_VERTEX_SCALE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.vertex_scale),
            scene_name: std::env::var("SCENE_NAME").unwrap_or(defaults.scene_name),
            generator: std::env::var("SCENE_GENERATOR").unwrap_or(defaults.generator),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            switch_coordinates: true,
            scene_scale: 1.0,
            vertex_scale: 1.0,
            scene_name: "BIM Scene".into(),
            generator: "scene-lite exporter".into(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
