// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Scene-Lite Geometry
//!
//! Geometry accumulation primitives for exporting BIM models as flattened,
//! material-partitioned scene graphs.
//!
//! - [`QuantizedPoint`]: integer-millimetre lattice point, hashable and totally ordered
//! - [`VertexTable`]: first-seen-order vertex deduplication
//! - [`TransformStack`]: cumulative placement transforms for nested instances and links
//! - [`GeometryBucket`]: per (element, material) vertex and face accumulator
//! - [`Registry`]: insertion-ordered keyed store with `get_or_insert` semantics

pub mod error;
pub mod mesh;
pub mod quantize;
pub mod registry;
pub mod transform;
pub mod vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use error::{Error, Result};
pub use mesh::{GeometryBucket, PolymeshTopology, FACE_TRIANGLE};
pub use quantize::{to_millimetres, QuantizedPoint, EPSILON, FEET_TO_MM};
pub use registry::Registry;
pub use transform::TransformStack;
pub use vertex::{VertexTable, MAX_VERTICES};
