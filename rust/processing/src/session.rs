// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Traversal controller.
//!
//! The host walks its model and reports every begin/end pair as an
//! [`ExportEvent`]. [`ExportSession::handle`] drives the state machine:
//!
//! ```text
//! Idle -> View -> (Link)* -> Element -> (Instance)* -> material / mesh
//! ```
//!
//! Link and instance scopes push a transform on begin and pop it on end,
//! whether or not the host ends up skipping their contents. Element scopes
//! push only when the element is accepted, and an element end is honored
//! only when it matches the element on top of the stack.

use nalgebra::Matrix4;
use scene_lite_geometry::{PolymeshTopology, TransformStack};

use crate::assembler::SceneAssembler;
use crate::config::ExportConfig;
use crate::element::ElementContext;
use crate::error::{Error, Result};
use crate::host::{
    CameraView, DocumentId, ElementId, MaterialNode, ModelSource, PropertyProvider,
};
use crate::material::MaterialRegistry;
use crate::scene::SceneRoot;

/// A host traversal callback.
#[derive(Debug, Clone)]
pub enum ExportEvent {
    ViewBegin { uid: String, name: String },
    ViewEnd,
    LinkBegin {
        document: DocumentId,
        transform: Matrix4<f64>,
    },
    LinkEnd,
    InstanceBegin { transform: Matrix4<f64> },
    InstanceEnd,
    ElementBegin(ElementId),
    ElementEnd(ElementId),
    Material(MaterialNode),
    Mesh(PolymeshTopology),
    IsCanceled,
}

/// Answer returned to the host for each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Continue into the node.
    Proceed,
    /// Do not descend into the node.
    Skip,
    /// Answer to [`ExportEvent::IsCanceled`].
    Canceled(bool),
}

/// Running counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub elements_exported: usize,
    pub elements_skipped: usize,
    pub facets: usize,
    pub vertices: usize,
}

/// One export run over one host document.
pub struct ExportSession<'a, S: ModelSource, P: PropertyProvider> {
    source: &'a S,
    properties: &'a P,
    config: ExportConfig,
    transforms: TransformStack,
    /// Active document on top; the bottom entry is the exported document.
    documents: Vec<DocumentId>,
    /// Accepted elements, innermost last.
    elements: Vec<ElementContext>,
    /// Skipped elements whose id equals the open element's; their ends must not close it.
    shadowed_ends: Vec<ElementId>,
    materials: MaterialRegistry,
    assembler: SceneAssembler,
    root_uid: Option<String>,
    stats: ExportStats,
}

impl<'a, S: ModelSource, P: PropertyProvider> ExportSession<'a, S, P> {
    /// Start a session over `document`.
    pub fn new(
        source: &'a S,
        properties: &'a P,
        document: DocumentId,
        config: ExportConfig,
    ) -> Self {
        tracing::info!(document = %document, switch_coordinates = config.switch_coordinates, "Starting scene export");
        Self {
            source,
            properties,
            config,
            transforms: TransformStack::new(),
            documents: vec![document],
            elements: Vec::new(),
            shadowed_ends: Vec::new(),
            materials: MaterialRegistry::new(),
            assembler: SceneAssembler::new(),
            root_uid: None,
            stats: ExportStats::default(),
        }
    }

    /// Dispatch one host event.
    ///
    /// Only invariant violations return `Err`; skipped and unbalanced nodes
    /// are logged and answered normally.
    pub fn handle(&mut self, event: ExportEvent) -> Result<Reply> {
        match event {
            ExportEvent::ViewBegin { uid, name } => {
                tracing::debug!(uid = %uid, name = %name, "View begin");
                if self.root_uid.is_none() {
                    self.root_uid = Some(uid);
                }
            }
            ExportEvent::ViewEnd => {}
            ExportEvent::LinkBegin {
                document,
                transform,
            } => {
                tracing::debug!(document = %document, "Link begin");
                self.documents.push(document);
                self.transforms.push(&transform);
            }
            ExportEvent::LinkEnd => {
                if self.documents.len() > 1 {
                    self.documents.pop();
                }
                self.pop_transform("link");
            }
            ExportEvent::InstanceBegin { transform } => self.transforms.push(&transform),
            ExportEvent::InstanceEnd => self.pop_transform("instance"),
            ExportEvent::ElementBegin(id) => return Ok(self.element_begin(id)),
            ExportEvent::ElementEnd(id) => self.element_end(id),
            ExportEvent::Material(node) => self.material(&node),
            ExportEvent::Mesh(mesh) => self.mesh(&mesh)?,
            ExportEvent::IsCanceled => return Ok(Reply::Canceled(self.is_canceled())),
        }
        Ok(Reply::Proceed)
    }

    /// Cancellation is never requested from inside the session.
    #[inline]
    pub fn is_canceled(&self) -> bool {
        false
    }

    /// The document element lookups currently resolve against.
    pub fn active_document(&self) -> &DocumentId {
        // Seeded with the exported document and never emptied
        &self.documents[self.documents.len() - 1]
    }

    pub fn transform_depth(&self) -> usize {
        self.transforms.depth()
    }

    pub fn element_depth(&self) -> usize {
        self.elements.len()
    }

    pub fn stats(&self) -> ExportStats {
        self.stats
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    /// End the session and assemble the scene.
    pub fn finish(self, views: &[CameraView]) -> SceneRoot {
        if !self.elements.is_empty() || self.transforms.depth() != 1 {
            tracing::warn!(
                open_elements = self.elements.len(),
                transform_depth = self.transforms.depth(),
                "Export finished with open scopes"
            );
        }
        tracing::info!(
            elements = self.stats.elements_exported,
            skipped = self.stats.elements_skipped,
            materials = self.materials.len(),
            geometries = self.assembler.geometry_count(),
            facets = self.stats.facets,
            vertices = self.stats.vertices,
            "Scene export complete"
        );

        let root_uuid = self
            .root_uid
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        self.assembler.assemble(
            root_uuid,
            self.materials.into_materials(),
            &self.config,
            views,
        )
    }

    fn pop_transform(&mut self, scope: &str) {
        if self.transforms.pop().is_none() {
            tracing::debug!(scope, "Unbalanced end ignored");
        }
    }

    fn element_begin(&mut self, id: ElementId) -> Reply {
        let Some(info) = self.source.element(self.active_document(), id) else {
            tracing::debug!(element = %id, document = %self.active_document(), "Element not found, skipping");
            return self.skip_element(id);
        };

        if self.assembler.is_finalized(&info.uid) {
            tracing::debug!(element = %id, uid = %info.uid, "Element already exported, skipping");
            return self.skip_element(id);
        }

        if self.elements.iter().any(|open| open.uid() == info.uid) {
            tracing::debug!(element = %id, uid = %info.uid, "Element already open, skipping");
            return self.skip_element(id);
        }

        let Some(category) = info.category.clone() else {
            tracing::debug!(element = %id, uid = %info.uid, "Element has no category, skipping");
            return self.skip_element(id);
        };

        let mut context = ElementContext::new(info, category.name);
        if let Some(default) = &category.material {
            let key = self.materials.resolve_host(default).uuid.clone();
            context.select_material(&key);
        }
        self.elements.push(context);
        Reply::Proceed
    }

    fn skip_element(&mut self, id: ElementId) -> Reply {
        if self.elements.last().map(ElementContext::id) == Some(id) {
            self.shadowed_ends.push(id);
        }
        self.stats.elements_skipped += 1;
        Reply::Skip
    }

    fn element_end(&mut self, id: ElementId) {
        if self.shadowed_ends.last() == Some(&id) {
            self.shadowed_ends.pop();
            tracing::debug!(element = %id, "End of skipped element, ignoring");
            return;
        }
        if self.elements.last().map(ElementContext::id) != Some(id) {
            tracing::debug!(element = %id, "Element end without matching begin, ignoring");
            return;
        }
        let Some(context) = self.elements.pop() else {
            return;
        };

        if self.assembler.is_finalized(context.uid()) {
            tracing::debug!(element = %id, uid = %context.uid(), "Element already exported, dropping");
            return;
        }

        let properties = self.properties.properties(context.info());
        let finalized = context.finalize(&self.materials, properties, self.config.vertex_scale);
        tracing::debug!(
            element = %id,
            uid = %finalized.node.uuid,
            meshes = finalized.node.children.len(),
            "Element exported"
        );
        self.stats.vertices += finalized.vertex_count;
        self.stats.elements_exported += 1;
        self.assembler.register(finalized);
    }

    fn material(&mut self, node: &MaterialNode) {
        let host = node
            .material_id
            .and_then(|id| self.source.material(self.active_document(), id));

        let key = match host {
            Some(host) => self.materials.resolve_host(&host).uuid.clone(),
            None => {
                if node.material_id.is_some() {
                    tracing::warn!(
                        document = %self.active_document(),
                        "Material element not found, falling back to node color"
                    );
                }
                self.materials
                    .resolve_color(node.color, node.transparency)
                    .uuid
                    .clone()
            }
        };

        if let Some(element) = self.elements.last_mut() {
            element.select_material(&key);
        }
    }

    fn mesh(&mut self, mesh: &PolymeshTopology) -> Result<()> {
        let element = self.elements.last_mut().ok_or(Error::NoActiveElement)?;
        let added = element.add_mesh(
            mesh,
            self.transforms.current(),
            self.config.switch_coordinates,
        )?;
        self.stats.facets += added;
        Ok(())
    }
}

/// Replay a recorded event sequence and assemble the result.
///
/// Stops early when the session reports cancellation.
pub fn export_events<S, P, I>(
    source: &S,
    properties: &P,
    document: DocumentId,
    config: ExportConfig,
    events: I,
    views: &[CameraView],
) -> Result<SceneRoot>
where
    S: ModelSource,
    P: PropertyProvider,
    I: IntoIterator<Item = ExportEvent>,
{
    let mut session = ExportSession::new(source, properties, document, config);
    for event in events {
        if session.is_canceled() {
            break;
        }
        session.handle(event)?;
    }
    Ok(session.finish(views))
}
