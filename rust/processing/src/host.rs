// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contracts for the host model: element lookup, materials, properties, cameras.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Host element id, unique within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub i64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host material element id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub i64);

/// Identifies a host document (the main model or a linked one).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack as `0xRRGGBB`.
    #[inline]
    pub fn to_packed(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

/// A persistent material definition in the host model.
#[derive(Debug, Clone, PartialEq)]
pub struct HostMaterial {
    /// Stable unique id; becomes the exported material uuid.
    pub uid: String,
    pub name: String,
    pub color: Rgb,
    /// Transparency percentage, 0 (opaque) to 100.
    pub transparency: u8,
}

/// Element category. Elements without one are not exported.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    /// Material applied when no explicit material node follows.
    pub material: Option<HostMaterial>,
}

/// What the exporter needs to know about a host element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementInfo {
    pub id: ElementId,
    /// Stable unique id across sessions.
    pub uid: String,
    pub name: String,
    pub category: Option<Category>,
    pub family: Option<String>,
    pub type_name: Option<String>,
}

/// Material node attached to the geometry that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialNode {
    /// Backing material element, if any.
    pub material_id: Option<MaterialId>,
    pub color: Rgb,
    /// Transparency fraction, 0.0 (opaque) to 1.0.
    pub transparency: f64,
}

impl MaterialNode {
    /// A node with no backing material element
    pub fn color_only(color: Rgb, transparency: f64) -> Self {
        Self {
            material_id: None,
            color,
            transparency,
        }
    }

    pub fn with_material(material_id: MaterialId, color: Rgb, transparency: f64) -> Self {
        Self {
            material_id: Some(material_id),
            color,
            transparency,
        }
    }
}

/// A scalar metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Double(f64),
    String(String),
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Double(v)
    }
}

/// Ordered key-value metadata.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Read access to the host model, scoped by document.
pub trait ModelSource {
    /// Look up an element in `document`.
    fn element(&self, document: &DocumentId, id: ElementId) -> Option<ElementInfo>;

    /// Look up a material element in `document`.
    fn material(&self, document: &DocumentId, id: MaterialId) -> Option<HostMaterial>;
}

/// Supplies descriptive attributes for an element.
pub trait PropertyProvider {
    fn properties(&self, element: &ElementInfo) -> Properties;
}

/// Provider that contributes no properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProperties;

impl PropertyProvider for NoProperties {
    fn properties(&self, _element: &ElementInfo) -> Properties {
        Properties::new()
    }
}

/// A saved camera view.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraView {
    pub name: String,
    pub position: String,
    pub target: String,
}

impl CameraView {
    pub fn new(
        name: impl Into<String>,
        position: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            position: position.into(),
            target: target.into(),
        }
    }
}
