// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! three.js JSON object format (version 4) output types.
//!
//! Field names follow the three.js `ObjectLoader` layout. `None` fields and
//! empty child lists are left out of the encoded text.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::host::Properties;

/// Row-major 4x4 identity.
pub const IDENTITY_MATRIX: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Uniform scale matrix used on the scene root.
pub fn scale_matrix(scale: f64) -> [f64; 16] {
    let mut m = IDENTITY_MATRIX;
    m[0] = scale;
    m[5] = scale;
    m[10] = scale;
    m
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub generator: String,
}

/// An exported material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMaterial {
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    /// Packed `0xRRGGBB`
    pub color: u32,
    pub ambient: u32,
    pub emissive: u32,
    pub opacity: f64,
    pub transparent: bool,
    pub wireframe: bool,
    pub shading: u32,
}

/// Buffer payload of an exported geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryData {
    pub vertices: Vec<f64>,
    pub normals: Vec<f64>,
    pub uvs: Vec<f64>,
    /// Four entries per triangle: type marker `0` then three vertex indices
    pub faces: Vec<u32>,
    pub scale: f64,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub double_sided: bool,
}

impl GeometryData {
    pub fn new(vertices: Vec<f64>, faces: Vec<u32>) -> Self {
        Self {
            vertices,
            normals: Vec::new(),
            uvs: Vec::new(),
            faces,
            scale: 1.0,
            visible: true,
            cast_shadow: true,
            receive_shadow: false,
            double_sided: true,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len() / 4
    }
}

/// An exported geometry, identified as `<element uid>-<material uuid>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryRecord {
    pub uuid: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: GeometryData,
}

impl GeometryRecord {
    pub fn new(uuid: impl Into<String>, data: GeometryData) -> Self {
        Self {
            uuid: uuid.into(),
            kind: "Geometry".into(),
            data,
        }
    }
}

/// Distinguishes the three levels of the output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Scene,
    #[serde(rename = "RevitElement")]
    Element,
    Mesh,
}

/// A node of the output object tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectNode {
    pub uuid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub matrix: [f64; 16],
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<ObjectNode>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub geometry: Option<String>,
    #[serde(rename = "userData", skip_serializing_if = "Option::is_none", default)]
    pub user_data: Option<Properties>,
}

impl ObjectNode {
    /// Element node with identity placement
    pub fn element(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(ObjectKind::Element, uuid.into(), name.into())
    }

    /// Mesh node referencing a material and a geometry
    pub fn mesh(
        uuid: impl Into<String>,
        name: impl Into<String>,
        material: impl Into<String>,
        geometry: impl Into<String>,
    ) -> Self {
        let mut node = Self::with_kind(ObjectKind::Mesh, uuid.into(), name.into());
        node.material = Some(material.into());
        node.geometry = Some(geometry.into());
        node
    }

    /// Scene root carrying the global scale
    pub fn scene(uuid: impl Into<String>, name: impl Into<String>, scale: f64) -> Self {
        let mut node = Self::with_kind(ObjectKind::Scene, uuid.into(), name.into());
        node.matrix = scale_matrix(scale);
        node
    }

    fn with_kind(kind: ObjectKind, uuid: String, name: String) -> Self {
        Self {
            uuid,
            name,
            kind,
            matrix: IDENTITY_MATRIX,
            children: Vec::new(),
            material: None,
            geometry: None,
            user_data: None,
        }
    }
}

/// The complete exported scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRoot {
    pub metadata: Metadata,
    pub materials: Vec<SceneMaterial>,
    pub geometries: Vec<GeometryRecord>,
    pub object: ObjectNode,
}

impl SceneRoot {
    /// Encode as compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn geometry(&self, uuid: &str) -> Option<&GeometryRecord> {
        self.geometries.iter().find(|g| g.uuid == uuid)
    }

    pub fn material(&self, uuid: &str) -> Option<&SceneMaterial> {
        self.materials.iter().find(|m| m.uuid == uuid)
    }

    /// Element node by uid
    pub fn element(&self, uid: &str) -> Option<&ObjectNode> {
        self.object.children.iter().find(|n| n.uuid == uid)
    }
}
