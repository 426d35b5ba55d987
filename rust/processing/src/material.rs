// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session-wide material registry.
//!
//! Materials come from two sources with different transparency conventions:
//! host material elements report a 0-100 percentage, bare material nodes a
//! 0.0-1.0 fraction. Both normalize to an opacity in `[0, 1]`.

use scene_lite_geometry::Registry;

use crate::host::{HostMaterial, Rgb};
use crate::scene::SceneMaterial;

/// three.js material type written for every material.
pub const MATERIAL_TYPE: &str = "MeshPhongMaterial";

/// `THREE.FlatShading`
pub const FLAT_SHADING: u32 = 1;

/// Materials keyed by their stable identity, in first-seen order.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: Registry<SceneMaterial>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a host material element, creating the output material on first use.
    pub fn resolve_host(&mut self, host: &HostMaterial) -> &SceneMaterial {
        self.materials.get_or_insert_with(&host.uid, || {
            let transparency = host.transparency.min(100);
            let color = host.color.to_packed();
            SceneMaterial {
                uuid: host.uid.clone(),
                name: Some(host.name.clone()),
                kind: MATERIAL_TYPE.into(),
                color,
                ambient: color,
                emissive: 0,
                opacity: 1.0 - f64::from(transparency) / 100.0,
                transparent: transparency > 0,
                wireframe: false,
                shading: FLAT_SHADING,
            }
        })
    }

    /// Resolve a color-only material node.
    ///
    /// Nodes with equal color and transparency always map to one material.
    pub fn resolve_color(&mut self, color: Rgb, transparency: f64) -> &SceneMaterial {
        let transparency = clamp_fraction(transparency);
        let key = color_material_key(color, transparency);
        self.materials.get_or_insert_with(&key, || {
            let packed = color.to_packed();
            SceneMaterial {
                uuid: key.clone(),
                name: None,
                kind: MATERIAL_TYPE.into(),
                color: packed,
                ambient: packed,
                emissive: 0,
                opacity: 1.0 - transparency,
                transparent: transparency > 0.0,
                wireframe: false,
                shading: FLAT_SHADING,
            }
        })
    }

    pub fn get(&self, uuid: &str) -> Option<&SceneMaterial> {
        self.materials.get(uuid)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn into_materials(self) -> Vec<SceneMaterial> {
        self.materials.into_values()
    }
}

/// Identity of a color-only material: `MaterialNode_<packed color>_<100 * transparency>`.
pub fn color_material_key(color: Rgb, transparency: f64) -> String {
    format!(
        "MaterialNode_{}_{}",
        color.to_packed(),
        real_string(100.0 * clamp_fraction(transparency))
    )
}

fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// At most two decimals, trailing zeros trimmed.
fn real_string(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".into()
    } else {
        s.into()
    }
}
