//! Static triangle mesh handed to the spatial index
//!
//! The mesh arrives already loaded (vertex positions plus index triples);
//! this module only validates it and exposes per-triangle access.

use thiserror::Error;

use crate::foundation::math::Vec3;
use crate::physics::collision::Triangle;
use crate::spatial::AABB;

/// Errors raised when mesh data is malformed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Flat index buffer length is not a multiple of three
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),

    /// A triangle references a vertex that does not exist
    #[error("triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending triangle
        triangle: usize,
        /// Offending vertex index
        index: u32,
        /// Number of vertices available
        vertex_count: usize,
    },
}

/// Immutable triangle mesh in world space
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Build a mesh from vertices and a flat index buffer (three per triangle)
    pub fn new(vertices: Vec<Vec3>, indices: &[u32]) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle(indices.len()));
        }
        let triangles = indices
            .chunks_exact(3)
            .map(|chunk| [chunk[0], chunk[1], chunk[2]])
            .collect();
        Self::from_triangles(vertices, triangles)
    }

    /// Build a mesh from vertices and index triples
    pub fn from_triangles(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        let vertex_count = vertices.len();
        for (triangle, corners) in triangles.iter().enumerate() {
            if let Some(&index) = corners.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange { triangle, index, vertex_count });
            }
        }
        Ok(Self { vertices, triangles })
    }

    /// Vertex positions
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Index triples
    pub fn triangle_indices(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True when the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Resolve triangle `index` to its three vertex positions
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn triangle(&self, index: u32) -> Triangle {
        let [a, b, c] = self.triangles[index as usize];
        Triangle::new(
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        )
    }

    /// Iterate over every triangle with its index
    pub fn triangles(&self) -> impl Iterator<Item = (u32, Triangle)> + '_ {
        (0..self.triangles.len()).map(move |i| {
            #[allow(clippy::cast_possible_truncation)]
            let index = i as u32;
            (index, self.triangle(index))
        })
    }

    /// Bounding box of the referenced vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(self.triangles().flat_map(|(_, t)| [t.v0, t.v1, t.v2]))
    }

    /// Regular heightfield grid in the XZ plane, faces wound to point up (+Y)
    ///
    /// `origin` is the (x, z) of the first corner; `height` maps (x, z) to y.
    pub fn grid<F>(origin: (f32, f32), cell_size: f32, cells_x: u32, cells_z: u32, height: F) -> Self
    where
        F: Fn(f32, f32) -> f32,
    {
        let stride = cells_x + 1;
        let mut vertices = Vec::with_capacity(((cells_x + 1) * (cells_z + 1)) as usize);
        for j in 0..=cells_z {
            for i in 0..=cells_x {
                #[allow(clippy::cast_precision_loss)]
                let (x, z) = (origin.0 + i as f32 * cell_size, origin.1 + j as f32 * cell_size);
                vertices.push(Vec3::new(x, height(x, z), z));
            }
        }

        let mut triangles = Vec::with_capacity((cells_x * cells_z * 2) as usize);
        for j in 0..cells_z {
            for i in 0..cells_x {
                let a = j * stride + i;
                let b = a + 1;
                let c = a + stride;
                let d = c + 1;
                triangles.push([a, c, b]);
                triangles.push([b, c, d]);
            }
        }

        Self { vertices, triangles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_vertices() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 2.0, 1.0),
        ]
    }

    #[test]
    fn test_flat_indices_grouped_into_triangles() {
        let mesh = TriangleMesh::new(quad_vertices(), &[0, 2, 1, 0, 3, 2]).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangle(1).v1, Vec3::new(0.0, 2.0, 1.0));
    }

    #[test]
    fn test_rejects_partial_triangle() {
        assert_eq!(
            TriangleMesh::new(quad_vertices(), &[0, 1]).unwrap_err(),
            MeshError::IncompleteTriangle(2)
        );
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let err = TriangleMesh::from_triangles(quad_vertices(), vec![[0, 1, 9]]).unwrap_err();
        assert_eq!(err, MeshError::IndexOutOfRange { triangle: 0, index: 9, vertex_count: 4 });
    }

    #[test]
    fn test_bounds_ignore_unreferenced_vertices() {
        let mesh = TriangleMesh::new(quad_vertices(), &[0, 2, 1]).unwrap();
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.max, Vec3::new(1.0, 0.0, 1.0));
        assert!(TriangleMesh::default().bounds().is_none());
    }

    #[test]
    fn test_grid_faces_point_up() {
        let mesh = TriangleMesh::grid((-2.0, -2.0), 1.0, 4, 3, |x, z| 0.1 * x - 0.05 * z);
        assert_eq!(mesh.vertices().len(), 5 * 4);
        assert_eq!(mesh.triangle_count(), 4 * 3 * 2);
        for (_, triangle) in mesh.triangles() {
            assert!(triangle.normal().unwrap().y > 0.9);
        }
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min.x, -2.0);
        assert_eq!(bounds.max.z, 1.0);
    }
}
