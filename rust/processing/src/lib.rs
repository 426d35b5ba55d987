// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Scene-Lite Processing
//!
//! Turns a host-driven BIM scene walk into a flattened, deduplicated,
//! material-partitioned scene graph in the three.js JSON object format.
//!
//! The host reports views, linked documents, instances, elements, materials
//! and triangulated meshes as [`ExportEvent`]s. An [`ExportSession`] composes
//! placements, buckets geometry per element and material, deduplicates
//! vertices on an integer millimetre lattice and finally assembles a
//! [`SceneRoot`]:
//!
//! ```text
//! Scene
//! └── element node (one per exported element, userData = properties)
//!     └── mesh node (one per material the element touched)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scene_lite_processing::{ExportConfig, ExportEvent, ExportSession, NoProperties};
//!
//! let mut session = ExportSession::new(&model, &NoProperties, document, ExportConfig::default());
//! for event in host_walk() {
//!     session.handle(event)?;
//! }
//! let json = session.finish(&views).to_json()?;
//! ```

pub mod assembler;
pub mod config;
pub mod element;
pub mod error;
pub mod host;
pub mod material;
pub mod scene;
pub mod session;

pub use assembler::{encode_views, SceneAssembler};
pub use config::ExportConfig;
pub use element::{ElementContext, FinalizedElement};
pub use error::{Error, Result};
pub use host::{
    CameraView, Category, DocumentId, ElementId, ElementInfo, HostMaterial, MaterialId,
    MaterialNode, ModelSource, NoProperties, Properties, PropertyProvider, PropertyValue, Rgb,
};
pub use material::{color_material_key, MaterialRegistry};
pub use scene::{
    GeometryData, GeometryRecord, Metadata, ObjectKind, ObjectNode, SceneMaterial, SceneRoot,
};
pub use session::{export_events, ExportEvent, ExportSession, ExportStats, Reply};

pub use scene_lite_geometry::{Matrix4, Point3, PolymeshTopology, Vector3};
