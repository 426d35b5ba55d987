// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-element accumulation and finalization.

use nalgebra::Matrix4;
use scene_lite_geometry::{GeometryBucket, PolymeshTopology, Registry};

use crate::error::{Error, Result};
use crate::host::{ElementId, ElementInfo, Properties, PropertyValue};
use crate::material::MaterialRegistry;
use crate::scene::{GeometryData, GeometryRecord, ObjectNode};

/// Metadata key holding the element's category name.
pub const LAYER_KEY: &str = "layer";

/// Metadata key holding the element's stable unique id.
pub const ELEMENT_ID_KEY: &str = "revit_id";

/// State for the element currently being visited: one bucket per material touched.
#[derive(Debug)]
pub struct ElementContext {
    info: ElementInfo,
    layer: String,
    buckets: Registry<GeometryBucket>,
    current_material: Option<String>,
}

/// Output of a finished element, ready for registration.
#[derive(Debug, Clone)]
pub struct FinalizedElement {
    pub node: ObjectNode,
    pub geometries: Vec<GeometryRecord>,
    pub layer: String,
    pub vertex_count: usize,
}

impl ElementContext {
    /// `layer` is the category name; only categorized elements get a context.
    pub fn new(info: ElementInfo, layer: impl Into<String>) -> Self {
        Self {
            info,
            layer: layer.into(),
            buckets: Registry::new(),
            current_material: None,
        }
    }

    pub fn id(&self) -> ElementId {
        self.info.id
    }

    pub fn uid(&self) -> &str {
        &self.info.uid
    }

    pub fn info(&self) -> &ElementInfo {
        &self.info
    }

    pub fn current_material(&self) -> Option<&str> {
        self.current_material.as_deref()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Make `material_key` the target of subsequent meshes, creating its bucket if absent.
    pub fn select_material(&mut self, material_key: &str) {
        self.buckets
            .get_or_insert_with(material_key, || GeometryBucket::new(material_key));
        self.current_material = Some(material_key.to_string());
    }

    /// Emit the facets of `mesh` into the current material's bucket.
    pub fn add_mesh(
        &mut self,
        mesh: &PolymeshTopology,
        transform: &Matrix4<f64>,
        switch_coordinates: bool,
    ) -> Result<usize> {
        let element = self.info.id;
        let bucket = self
            .current_material
            .as_deref()
            .and_then(|key| self.buckets.get_mut(key))
            .ok_or(Error::UnresolvedMaterial { element })?;
        Ok(bucket.add_mesh(mesh, transform, switch_coordinates)?)
    }

    /// Turn every bucket into a geometry plus mesh node and build the element node.
    ///
    /// `properties` come from the property provider; the layer and element id
    /// entries are written over them.
    pub fn finalize(
        self,
        materials: &MaterialRegistry,
        properties: Properties,
        vertex_scale: f64,
    ) -> FinalizedElement {
        let uid = self.info.uid.clone();
        let name = self.info.name.clone();

        let mut node = ObjectNode::element(&uid, describe(&self.info));
        let mut geometries = Vec::with_capacity(self.buckets.len());
        let mut vertex_count = 0;

        for bucket in self.buckets.into_values() {
            let material_key = bucket.material_key().to_string();
            let geometry_uuid = format!("{}-{}", uid, material_key);
            let mesh_name = match materials.get(&material_key).and_then(|m| m.name.as_deref()) {
                Some(material_name) => format!("{} {}", name, material_name),
                None => name.clone(),
            };

            vertex_count += bucket.vertex_count();
            let (vertices, faces) = bucket.into_buffers(vertex_scale);
            geometries.push(GeometryRecord::new(
                geometry_uuid.clone(),
                GeometryData::new(vertices, faces),
            ));
            node.children.push(ObjectNode::mesh(
                geometry_uuid.clone(),
                mesh_name,
                material_key,
                geometry_uuid,
            ));
        }

        let mut user_data = properties;
        user_data.insert(LAYER_KEY.into(), PropertyValue::String(self.layer.clone()));
        user_data.insert(ELEMENT_ID_KEY.into(), PropertyValue::String(self.info.uid.clone()));
        node.user_data = Some(user_data);

        FinalizedElement {
            node,
            geometries,
            layer: self.layer,
            vertex_count,
        }
    }
}

/// Readable element description: category, family, type, id and name.
pub fn describe(info: &ElementInfo) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(5);
    if let Some(category) = &info.category {
        parts.push(category.name.clone());
    }
    if let Some(family) = &info.family {
        parts.push(family.clone());
    }
    if let Some(type_name) = &info.type_name {
        if info.family.as_deref() != Some(type_name.as_str()) {
            parts.push(type_name.clone());
        }
    }
    parts.push(format!("<{} {}>", info.id, info.name));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Category, Rgb};
    use nalgebra::Point3;
    use scene_lite_geometry::FEET_TO_MM;

    fn wall() -> ElementInfo {
        ElementInfo {
            id: ElementId(42),
            uid: "wall-uid".into(),
            name: "Wall 1".into(),
            category: Some(Category {
                name: "Walls".into(),
                material: None,
            }),
            family: Some("Basic Wall".into()),
            type_name: Some("Generic 200mm".into()),
        }
    }

    fn triangle() -> PolymeshTopology {
        let ft = |v: f64| v / FEET_TO_MM;
        PolymeshTopology::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(ft(1000.0), 0.0, 0.0),
                Point3::new(0.0, ft(1000.0), 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn mesh_before_material_is_an_error() {
        let mut context = ElementContext::new(wall(), "Walls");
        let err = context
            .add_mesh(&triangle(), &Matrix4::identity(), false)
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedMaterial { element } if element == ElementId(42)));
    }

    #[test]
    fn select_material_is_idempotent() {
        let mut context = ElementContext::new(wall(), "Walls");
        context.select_material("a");
        context.select_material("b");
        context.select_material("a");
        assert_eq!(context.bucket_count(), 2);
        assert_eq!(context.current_material(), Some("a"));
    }

    #[test]
    fn finalize_builds_mesh_children_per_material() {
        let mut materials = MaterialRegistry::new();
        let red = materials.resolve_color(Rgb::new(255, 0, 0), 0.0).uuid.clone();
        let blue = materials.resolve_color(Rgb::new(0, 0, 255), 0.0).uuid.clone();

        let mut context = ElementContext::new(wall(), "Walls");
        context.select_material(&red);
        context.add_mesh(&triangle(), &Matrix4::identity(), false).unwrap();
        context.select_material(&blue);
        context.add_mesh(&triangle(), &Matrix4::identity(), false).unwrap();

        let mut props = Properties::new();
        props.insert("Mark".into(), "W-1".into());
        props.insert(LAYER_KEY.into(), "overwritten".into());

        let finalized = context.finalize(&materials, props, 1.0);
        let node = &finalized.node;

        assert_eq!(node.uuid, "wall-uid");
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0].uuid, format!("wall-uid-{}", red));
        assert_eq!(node.children[0].material.as_deref(), Some(red.as_str()));
        assert_eq!(node.children[1].geometry, Some(format!("wall-uid-{}", blue)));
        assert_eq!(finalized.geometries.len(), 2);
        assert_eq!(finalized.geometries[0].data.vertices.len(), 9);
        assert_eq!(finalized.geometries[0].data.faces, vec![0, 0, 1, 2]);
        assert_eq!(finalized.vertex_count, 6);

        let data = node.user_data.as_ref().unwrap();
        assert_eq!(data.get("Mark"), Some(&PropertyValue::from("W-1")));
        assert_eq!(data.get(LAYER_KEY), Some(&PropertyValue::from("Walls")));
        assert_eq!(data.get(ELEMENT_ID_KEY), Some(&PropertyValue::from("wall-uid")));
        assert_eq!(finalized.layer, "Walls");
    }

    #[test]
    fn describes_element() {
        assert_eq!(
            describe(&wall()),
            "Walls Basic Wall Generic 200mm <42 Wall 1>"
        );

        let mut bare = wall();
        bare.category = None;
        bare.family = None;
        bare.type_name = None;
        assert_eq!(describe(&bare), "<42 Wall 1>");
    }
}
