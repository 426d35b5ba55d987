// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use nalgebra::{Matrix4, Point3};

use crate::error::{Error, Result};
use crate::quantize::QuantizedPoint;
use crate::vertex::VertexTable;

/// Face type marker for a plain triangle in the flat face list.
pub const FACE_TRIANGLE: u32 = 0;

/// Triangulated mesh as delivered by the host, in local coordinates (feet)
#[derive(Debug, Clone, Default)]
pub struct PolymeshTopology {
    /// Vertex positions
    pub points: Vec<Point3<f64>>,
    /// Triangles as indices into `points`
    pub facets: Vec<[usize; 3]>,
}

impl PolymeshTopology {
    /// Create a new mesh
    pub fn new(points: Vec<Point3<f64>>, facets: Vec<[usize; 3]>) -> Self {
        Self { points, facets }
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    /// Check every facet index against the point list
    pub fn validate(&self) -> Result<()> {
        for (facet, indices) in self.facets.iter().enumerate() {
            for &index in indices {
                if index >= self.points.len() {
                    return Err(Error::InvalidFacet {
                        facet,
                        index,
                        points: self.points.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Vertices and faces accumulated for one (element, material) pair.
#[derive(Debug, Clone)]
pub struct GeometryBucket {
    material_key: String,
    vertices: VertexTable,
    /// Flat face records: `FACE_TRIANGLE, a, b, c` per triangle
    faces: Vec<u32>,
}

impl GeometryBucket {
    /// Create an empty bucket for a material
    pub fn new(material_key: impl Into<String>) -> Self {
        Self {
            material_key: material_key.into(),
            vertices: VertexTable::new(),
            faces: Vec::new(),
        }
    }

    pub fn material_key(&self) -> &str {
        &self.material_key
    }

    pub fn vertices(&self) -> &VertexTable {
        &self.vertices
    }

    pub fn faces(&self) -> &[u32] {
        &self.faces
    }

    /// Number of triangles emitted so far
    pub fn face_count(&self) -> usize {
        self.faces.len() / 4
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Add a single triangle of already quantized corners.
    ///
    /// No face is written if the vertex table overflows.
    pub fn add_triangle(&mut self, corners: [QuantizedPoint; 3]) -> Result<()> {
        let a = self.vertices.add_vertex(corners[0])?;
        let b = self.vertices.add_vertex(corners[1])?;
        let c = self.vertices.add_vertex(corners[2])?;
        self.faces.extend_from_slice(&[FACE_TRIANGLE, a, b, c]);
        Ok(())
    }

    /// Transform, quantize and deduplicate every facet of `mesh`.
    ///
    /// The mesh is validated before anything is written, so a bad facet
    /// leaves the bucket untouched. Returns the number of triangles added.
    /// A full vertex table stops the loop at the triangle that overflowed.
    pub fn add_mesh(
        &mut self,
        mesh: &PolymeshTopology,
        transform: &Matrix4<f64>,
        switch_coordinates: bool,
    ) -> Result<usize> {
        mesh.validate()?;

        let lattice = |i: usize| {
            let world = transform.transform_point(&mesh.points[i]);
            QuantizedPoint::from_feet(&world, switch_coordinates)
        };

        for &[a, b, c] in &mesh.facets {
            self.add_triangle([lattice(a), lattice(b), lattice(c)])?;
        }
        Ok(mesh.facets.len())
    }

    /// Consume the bucket into flat `(vertices, faces)` sequences.
    pub fn into_buffers(self, scale: f64) -> (Vec<f64>, Vec<u32>) {
        (self.vertices.flatten(scale), self.faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn mm(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x / crate::FEET_TO_MM, y / crate::FEET_TO_MM, z / crate::FEET_TO_MM)
    }

    #[test]
    fn single_triangle() {
        let mesh = PolymeshTopology::new(
            vec![mm(0.0, 0.0, 0.0), mm(1000.0, 0.0, 0.0), mm(0.0, 1000.0, 0.0)],
            vec![[0, 1, 2]],
        );
        let mut bucket = GeometryBucket::new("m");
        let added = bucket
            .add_mesh(&mesh, &Matrix4::identity(), false)
            .unwrap();

        assert_eq!(added, 1);
        assert_eq!(bucket.faces(), &[0, 0, 1, 2]);
        let (vertices, faces) = bucket.into_buffers(1.0);
        assert_eq!(vertices, vec![0.0, 0.0, 0.0, 1000.0, 0.0, 0.0, 0.0, 1000.0, 0.0]);
        assert_eq!(faces.len(), 4);
    }

    #[test]
    fn shared_edge_reuses_vertices() {
        let mesh = PolymeshTopology::new(
            vec![
                mm(0.0, 0.0, 0.0),
                mm(1000.0, 0.0, 0.0),
                mm(1000.0, 1000.0, 0.0),
                mm(0.0, 1000.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let mut bucket = GeometryBucket::new("m");
        bucket.add_mesh(&mesh, &Matrix4::identity(), false).unwrap();

        assert_eq!(bucket.vertex_count(), 4);
        assert_eq!(bucket.faces(), &[0, 0, 1, 2, 0, 0, 2, 3]);
    }

    #[test]
    fn duplicate_points_in_input_collapse() {
        // Two separate point entries at the same location
        let mesh = PolymeshTopology::new(
            vec![
                mm(0.0, 0.0, 0.0),
                mm(1000.0, 0.0, 0.0),
                mm(0.0, 1000.0, 0.0),
                mm(1000.0, 0.0, 0.0),
                mm(1000.0, 1000.0, 0.0),
            ],
            vec![[0, 1, 2], [3, 4, 2]],
        );
        let mut bucket = GeometryBucket::new("m");
        bucket.add_mesh(&mesh, &Matrix4::identity(), false).unwrap();

        assert_eq!(bucket.vertex_count(), 4);
        assert_eq!(bucket.faces(), &[0, 0, 1, 2, 0, 1, 3, 2]);
    }

    #[test]
    fn applies_transform_before_quantizing() {
        let mesh = PolymeshTopology::new(
            vec![mm(0.0, 0.0, 0.0), mm(1000.0, 0.0, 0.0), mm(0.0, 1000.0, 0.0)],
            vec![[0, 1, 2]],
        );
        let shift = Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0));
        let mut bucket = GeometryBucket::new("m");
        bucket.add_mesh(&mesh, &shift, false).unwrap();

        let first = *bucket.vertices().iter().next().unwrap();
        assert_eq!(first, QuantizedPoint::new(3048, 0, 0));
    }

    #[test]
    fn invalid_facet_leaves_bucket_untouched() {
        let mesh = PolymeshTopology::new(
            vec![mm(0.0, 0.0, 0.0), mm(1.0, 0.0, 0.0), mm(0.0, 1.0, 0.0)],
            vec![[0, 1, 2], [0, 1, 7]],
        );
        let mut bucket = GeometryBucket::new("m");
        let err = bucket
            .add_mesh(&mesh, &Matrix4::identity(), false)
            .unwrap_err();

        assert_eq!(
            err,
            Error::InvalidFacet {
                facet: 1,
                index: 7,
                points: 3
            }
        );
        assert_eq!(bucket.face_count(), 0);
        assert!(bucket.vertices().is_empty());
    }

    #[test]
    fn face_indices_stay_within_vertex_count() {
        let mesh = PolymeshTopology::new(
            (0..6).map(|i| mm(i as f64 * 100.0, (i % 2) as f64 * 100.0, 0.0)).collect(),
            vec![[0, 1, 2], [1, 2, 3], [2, 3, 4], [3, 4, 5]],
        );
        let mut bucket = GeometryBucket::new("m");
        bucket.add_mesh(&mesh, &Matrix4::identity(), true).unwrap();

        let faces = bucket.faces();
        assert_eq!(faces.len() % 4, 0);
        for face in faces.chunks_exact(4) {
            assert_eq!(face[0], FACE_TRIANGLE);
            assert!(face[1..].iter().all(|&i| (i as usize) < bucket.vertex_count()));
        }
    }

    #[test]
    fn full_vertex_table_stops_without_dangling_faces() {
        let mesh = PolymeshTopology::new(
            vec![
                mm(0.0, 0.0, 0.0),
                mm(1000.0, 0.0, 0.0),
                mm(1000.0, 1000.0, 0.0),
                mm(0.0, 1000.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let mut bucket = GeometryBucket {
            material_key: "m".into(),
            vertices: VertexTable::with_limit(3),
            faces: Vec::new(),
        };
        let err = bucket
            .add_mesh(&mesh, &Matrix4::identity(), false)
            .unwrap_err();

        assert_eq!(err, Error::TooManyVertices { limit: 3 });
        assert_eq!(bucket.faces(), &[FACE_TRIANGLE, 0, 1, 2]);
        assert_eq!(bucket.vertex_count(), 3);
    }
}
