// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session-wide registries of finalized output and final scene assembly.

use scene_lite_geometry::Registry;

use crate::config::{ExportConfig, FORMAT_VERSION};
use crate::element::FinalizedElement;
use crate::host::{CameraView, Properties, PropertyValue};
use crate::scene::{GeometryRecord, Metadata, ObjectNode, SceneMaterial, SceneRoot};

/// Root metadata key listing every exported category.
pub const LAYERS_KEY: &str = "layers";

/// Root metadata key holding the interleaved camera views.
pub const VIEWS_KEY: &str = "views";

/// Collects finalized elements and geometries for the whole session.
#[derive(Debug, Default)]
pub struct SceneAssembler {
    geometries: Registry<GeometryRecord>,
    objects: Registry<ObjectNode>,
    layers: Vec<String>,
}

impl SceneAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an element with this uid has already been finalized.
    pub fn is_finalized(&self, uid: &str) -> bool {
        self.objects.contains(uid)
    }

    /// Register a finalized element, its geometries and its layer.
    ///
    /// Geometries with an existing uuid are overwritten; so is an element
    /// node with an existing uid.
    pub fn register(&mut self, element: FinalizedElement) {
        for geometry in element.geometries {
            let uuid = geometry.uuid.clone();
            self.geometries.insert(uuid, geometry);
        }
        let uid = element.node.uuid.clone();
        self.objects.insert(uid, element.node);

        if !self.layers.contains(&element.layer) {
            self.layers.push(element.layer);
        }
    }

    pub fn element_count(&self) -> usize {
        self.objects.len()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Layer names in first-seen order
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Build the scene root around everything registered so far.
    pub fn assemble(
        self,
        root_uuid: String,
        materials: Vec<SceneMaterial>,
        config: &ExportConfig,
        views: &[CameraView],
    ) -> SceneRoot {
        let mut root = ObjectNode::scene(root_uuid, config.scene_name.clone(), config.scene_scale);
        root.children = self.objects.into_values();

        let mut user_data = Properties::new();
        user_data.insert(LAYERS_KEY.into(), PropertyValue::String(self.layers.join(",")));
        if !views.is_empty() {
            user_data.insert(VIEWS_KEY.into(), PropertyValue::String(encode_views(views)));
        }
        root.user_data = Some(user_data);

        SceneRoot {
            metadata: Metadata {
                kind: "Object".into(),
                version: FORMAT_VERSION.into(),
                generator: config.generator.clone(),
            },
            materials,
            geometries: self.geometries.into_values(),
            object: root,
        }
    }
}

/// Interleave camera views as `name,position,target` triples joined by commas.
pub fn encode_views(views: &[CameraView]) -> String {
    views
        .iter()
        .flat_map(|v| [v.name.as_str(), v.position.as_str(), v.target.as_str()])
        .collect::<Vec<_>>()
        .join(",")
}
