// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for an export session.
//!
//! Recoverable conditions (duplicate elements, missing categories, unbalanced
//! element ends) are logged and skipped; they never surface here. These
//! variants abort the session.

use crate::host::ElementId;

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Mesh data arrived outside any element scope.
    #[error("mesh received outside of an element")]
    NoActiveElement,

    /// Mesh data arrived before any material was resolved for the element.
    #[error("element {element} received a mesh before any material was resolved")]
    UnresolvedMaterial { element: ElementId },

    /// Invalid host mesh data.
    #[error("geometry error: {0}")]
    Geometry(#[from] scene_lite_geometry::Error),

    /// Encoding the scene failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
