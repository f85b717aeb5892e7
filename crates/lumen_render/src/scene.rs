//! Render groups and scene-level ray casting.

use std::sync::Arc;

use glam::Vec3;
use rand::{Rng, RngCore};

use lumen_core::MeshData;
use lumen_math::Ray;

use crate::{GroupHit, KdTree, Material, Triangle};

/// One mesh with its spatial index and shared material.
pub struct RenderGroup {
    /// Disabled groups are skipped by scene-level casts
    pub enabled: bool,
    /// Convexity hint carried from scene setup; the intersection code does
    /// not consult it
    pub convex: bool,
    pub material: Arc<dyn Material>,
    pub triangles: Vec<Triangle>,
    tree: KdTree,
}

impl RenderGroup {
    /// Build a group and its index from ready-made triangles.
    pub fn new(triangles: Vec<Triangle>, material: Arc<dyn Material>) -> Self {
        let tree = KdTree::build(&triangles);
        log::debug!(
            "Indexed render group: {} triangles, {} nodes",
            triangles.len(),
            tree.node_count()
        );
        Self {
            enabled: true,
            convex: true,
            material,
            triangles,
            tree,
        }
    }

    /// Build a group from loaded mesh data.
    ///
    /// Meshes without normals become flat-shaded triangles.
    pub fn from_mesh(mesh: &MeshData, material: Arc<dyn Material>) -> Self {
        let mut triangles = Vec::with_capacity(mesh.triangle_count());
        for (i, [a, b, c]) in mesh.triangle_indices().enumerate() {
            let vertices = [mesh.positions[a], mesh.positions[b], mesh.positions[c]];
            let triangle = match &mesh.normals {
                Some(normals) => {
                    Triangle::with_normals(vertices, [normals[a], normals[b], normals[c]], i as u32)
                }
                None => Triangle::new(vertices, i as u32),
            };
            triangles.push(triangle);
        }
        Self::new(triangles, material)
    }

    /// Nearest intersection within this group, via its spatial index.
    pub fn intersect(&self, ray: &Ray) -> Option<GroupHit> {
        self.tree.hit(&self.triangles, ray)
    }

    /// Uniform random point on a uniformly chosen triangle.
    pub fn random_surface_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        let index = rng.gen_range(0..self.triangles.len());
        self.triangles[index].random_point(rng)
    }
}

/// A ray hit across the whole scene.
#[derive(Debug, Clone, Copy)]
pub struct SceneHit {
    pub group: usize,
    pub triangle: usize,
    pub distance: f32,
}

/// All render groups plus the precomputed list of emissive ones.
#[derive(Default)]
pub struct Scene {
    groups: Vec<RenderGroup>,
    emissive: Vec<usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group, indexing it as a light source when emissive.
    /// Returns the group's index.
    pub fn add_group(&mut self, group: RenderGroup) -> usize {
        let index = self.groups.len();
        if group.material.is_emissive() {
            self.emissive.push(index);
        }
        self.groups.push(group);
        index
    }

    pub fn groups(&self) -> &[RenderGroup] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> &RenderGroup {
        &self.groups[index]
    }

    pub fn group_mut(&mut self, index: usize) -> &mut RenderGroup {
        &mut self.groups[index]
    }

    /// Indices of the emissive groups.
    pub fn emissive_groups(&self) -> &[usize] {
        &self.emissive
    }

    /// Globally nearest hit across all enabled groups.
    pub fn cast_ray(&self, ray: &Ray) -> Option<SceneHit> {
        let mut nearest: Option<SceneHit> = None;
        for (index, group) in self.groups.iter().enumerate() {
            if !group.enabled {
                continue;
            }
            if let Some(hit) = group.intersect(ray) {
                if nearest.map_or(true, |n| hit.distance < n.distance) {
                    nearest = Some(SceneHit {
                        group: index,
                        triangle: hit.triangle as usize,
                        distance: hit.distance,
                    });
                }
            }
        }
        nearest
    }

    /// Nearest hit restricted to one group, for the refraction exit query.
    pub fn cast_ray_within(&self, ray: &Ray, group: usize) -> Option<GroupHit> {
        self.groups[group].intersect(ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quad_group(z: f32, material: Arc<dyn Material>) -> RenderGroup {
        let triangles = vec![
            Triangle::new(
                [
                    Vec3::new(-1.0, -1.0, z),
                    Vec3::new(1.0, -1.0, z),
                    Vec3::new(1.0, 1.0, z),
                ],
                0,
            ),
            Triangle::new(
                [
                    Vec3::new(-1.0, -1.0, z),
                    Vec3::new(1.0, 1.0, z),
                    Vec3::new(-1.0, 1.0, z),
                ],
                1,
            ),
        ];
        RenderGroup::new(triangles, material)
    }

    #[test]
    fn test_cast_ray_picks_nearest_group() {
        let mat: Arc<dyn Material> = Arc::new(Lambertian::new(Vec3::splat(0.5)));
        let mut scene = Scene::new();
        scene.add_group(quad_group(-4.0, mat.clone()));
        scene.add_group(quad_group(-2.0, mat));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = scene.cast_ray(&ray).expect("must hit");
        assert_eq!(hit.group, 1);
        assert!((hit.distance - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_cast_ray_skips_disabled_groups() {
        let mat: Arc<dyn Material> = Arc::new(Lambertian::new(Vec3::splat(0.5)));
        let mut scene = Scene::new();
        scene.add_group(quad_group(-4.0, mat.clone()));
        let front = scene.add_group(quad_group(-2.0, mat));

        scene.group_mut(front).enabled = false;
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = scene.cast_ray(&ray).expect("must hit");
        assert_eq!(hit.group, 0);
        assert!((hit.distance - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_emissive_groups_registered() {
        let mut scene = Scene::new();
        scene.add_group(quad_group(-2.0, Arc::new(Lambertian::new(Vec3::ONE))));
        let light = scene.add_group(quad_group(-6.0, Arc::new(Lambertian::emissive(Vec3::ONE, 5.0))));
        assert_eq!(scene.emissive_groups(), &[light]);
    }

    #[test]
    fn test_cast_ray_within_ignores_other_groups() {
        let mat: Arc<dyn Material> = Arc::new(Lambertian::new(Vec3::splat(0.5)));
        let mut scene = Scene::new();
        let far = scene.add_group(quad_group(-4.0, mat.clone()));
        scene.add_group(quad_group(-2.0, mat));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = scene.cast_ray_within(&ray, far).expect("must hit");
        assert!((hit.distance - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_random_surface_point_on_group() {
        let mat: Arc<dyn Material> = Arc::new(Lambertian::new(Vec3::splat(0.5)));
        let group = quad_group(-2.0, mat);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..100 {
            let p = group.random_surface_point(&mut rng);
            assert!(p.x >= -1.0 && p.x <= 1.0);
            assert!(p.y >= -1.0 && p.y <= 1.0);
            assert_eq!(p.z, -2.0);
        }
    }
}
