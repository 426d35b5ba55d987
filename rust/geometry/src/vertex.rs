// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex deduplication keyed by quantized position.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::quantize::QuantizedPoint;

/// Most distinct points a table can hold; indices are `u32`.
pub const MAX_VERTICES: usize = u32::MAX as usize;

/// Maps quantized points to dense indices in first-seen order.
///
/// One table backs exactly one geometry bucket; tables are never shared.
#[derive(Debug, Clone)]
pub struct VertexTable {
    index: FxHashMap<QuantizedPoint, u32>,
    points: Vec<QuantizedPoint>,
    limit: usize,
}

impl Default for VertexTable {
    fn default() -> Self {
        Self::with_limit(MAX_VERTICES)
    }
}

impl VertexTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table holding at most `limit` distinct points (capped at [`MAX_VERTICES`]).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            index: FxHashMap::default(),
            points: Vec::new(),
            limit: limit.min(MAX_VERTICES),
        }
    }

    /// Return the index of `p`, inserting it at the end if unseen.
    ///
    /// Fails with [`Error::TooManyVertices`] when a new point would exceed the limit.
    #[inline]
    pub fn add_vertex(&mut self, p: QuantizedPoint) -> Result<u32> {
        if let Some(&i) = self.index.get(&p) {
            return Ok(i);
        }
        if self.points.len() >= self.limit {
            return Err(Error::TooManyVertices { limit: self.limit });
        }
        // len < limit <= u32::MAX
        let i = self.points.len() as u32;
        self.index.insert(p, i);
        self.points.push(p);
        Ok(i)
    }

    /// Index of an already inserted point
    pub fn get(&self, p: &QuantizedPoint) -> Option<u32> {
        self.index.get(p).copied()
    }

    /// Number of distinct points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in index order
    pub fn iter(&self) -> impl Iterator<Item = &QuantizedPoint> {
        self.points.iter()
    }

    /// Flatten to `x, y, z` triples in index order, scaled to output units.
    pub fn flatten(&self, scale: f64) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.points.len() * 3);
        for p in &self.points {
            out.extend_from_slice(&p.to_output(scale));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_points_share_an_index() {
        let mut table = VertexTable::new();
        let a = table.add_vertex(QuantizedPoint::new(1, 2, 3)).unwrap();
        let b = table.add_vertex(QuantizedPoint::new(1, 2, 3)).unwrap();
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn indices_follow_first_appearance() {
        let mut table = VertexTable::new();
        let p0 = QuantizedPoint::new(5, 0, 0);
        let p1 = QuantizedPoint::new(0, 0, 0);
        let p2 = QuantizedPoint::new(0, 0, 1);

        assert_eq!(table.add_vertex(p0).unwrap(), 0);
        assert_eq!(table.add_vertex(p1).unwrap(), 1);
        assert_eq!(table.add_vertex(p0).unwrap(), 0);
        assert_eq!(table.add_vertex(p2).unwrap(), 2);

        let order: Vec<_> = table.iter().copied().collect();
        assert_eq!(order, vec![p0, p1, p2]);
        assert_eq!(table.get(&p2), Some(2));
        assert_eq!(table.get(&QuantizedPoint::new(9, 9, 9)), None);
    }

    #[test]
    fn points_one_millimetre_apart_stay_distinct() {
        let mut table = VertexTable::new();
        let a = table.add_vertex(QuantizedPoint::new(0, 0, 0)).unwrap();
        let b = table.add_vertex(QuantizedPoint::new(0, 0, 1)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn flatten_scales_in_index_order() {
        let mut table = VertexTable::new();
        table.add_vertex(QuantizedPoint::new(1000, 0, -2000)).unwrap();
        table.add_vertex(QuantizedPoint::new(0, 500, 0)).unwrap();

        assert_eq!(
            table.flatten(0.5),
            vec![500.0, 0.0, -1000.0, 0.0, 250.0, 0.0]
        );
        assert_eq!(table.flatten(1.0).len(), 6);
    }

    #[test]
    fn rejects_new_points_past_the_limit() {
        let mut table = VertexTable::with_limit(2);
        table.add_vertex(QuantizedPoint::new(0, 0, 0)).unwrap();
        table.add_vertex(QuantizedPoint::new(1, 0, 0)).unwrap();

        // Known points still resolve at capacity
        assert_eq!(table.add_vertex(QuantizedPoint::new(1, 0, 0)), Ok(1));
        assert_eq!(
            table.add_vertex(QuantizedPoint::new(2, 0, 0)),
            Err(Error::TooManyVertices { limit: 2 })
        );
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn limit_is_capped_at_u32_indices() {
        let table = VertexTable::with_limit(usize::MAX);
        assert_eq!(table.limit, MAX_VERTICES);
    }
}
