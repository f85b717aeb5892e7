//! Mesh geometry produced by asset loading.

use lumen_math::Aabb;

use glam::Vec3;

/// A triangle mesh: vertex positions, optional per-vertex normals, and
/// triangle indices.
///
/// Decoupled from the render-side triangle representation so it can be
/// populated from different file formats. Normals are optional; a mesh
/// without them renders flat-shaded.
#[derive(Clone, Debug)]
pub struct MeshData {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals, aligned with `positions` when present
    pub normals: Option<Vec<Vec3>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box of the positions
    pub bounds: Aabb,
}

impl MeshData {
    /// Create a new mesh from positions and indices, optionally with normals.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            normals,
            indices,
            bounds,
        }
    }

    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        for p in positions {
            bounds.expand_point(*p);
        }
        bounds
    }

    /// Check if the mesh has per-vertex normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Iterate over the index triples of valid triangles.
    ///
    /// Triples referencing out-of-range vertices are skipped with a warning
    /// rather than aborting the load.
    pub fn triangle_indices(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let vertex_count = self.positions.len();
        self.indices.chunks_exact(3).filter_map(move |chunk| {
            let tri = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];
            if tri.iter().any(|&i| i >= vertex_count) {
                log::warn!(
                    "Invalid triangle indices: [{}, {}, {}], vertex count: {}",
                    tri[0],
                    tri[1],
                    tri[2],
                    vertex_count
                );
                return None;
            }
            Some(tri)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_creation() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let indices = vec![0, 1, 2];

        let mesh = MeshData::new(positions, indices, None);

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.has_normals());
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = MeshData::new(positions, vec![0, 1, 2], None);

        assert_eq!(mesh.bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds.max, Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_triangle_indices_skips_out_of_range() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        // Second triple references a missing vertex.
        let mesh = MeshData::new(positions, vec![0, 1, 2, 0, 1, 9], None);

        let tris: Vec<_> = mesh.triangle_indices().collect();
        assert_eq!(tris, vec![[0, 1, 2]]);
    }
}
