//! Median-split spatial index over a render group's triangles.
//!
//! A binary tree of axis-aligned boxes: internal nodes split their
//! triangles at the mean centroid along the box's longest axis, leaves
//! hold a handful of triangles. Nodes live in an arena and reference their
//! children by index, so the strict-tree ownership needs no pointer
//! juggling.

use glam::Vec3;

use lumen_math::{Aabb, Ray};

use crate::Triangle;

/// Splitting stops beyond this depth.
const MAX_DEPTH: u32 = 25;

/// Maximum triangles per leaf before splitting.
const LEAF_MAX_SIZE: usize = 6;

/// A ray hit inside one render group.
#[derive(Debug, Clone, Copy)]
pub struct GroupHit {
    /// Distance along the ray
    pub distance: f32,
    /// Index of the hit triangle within the group
    pub triangle: u32,
}

struct Node {
    bounds: Aabb,
    kind: NodeKind,
}

enum NodeKind {
    /// Triangle indices into the owning group's list
    Leaf(Vec<u32>),
    /// Child indices into the arena
    Split { left: u32, right: u32 },
}

/// Spatial index over one group's triangles.
pub struct KdTree {
    nodes: Vec<Node>,
}

impl KdTree {
    /// Build an index over `triangles`.
    ///
    /// An empty slice yields a usable always-miss tree.
    pub fn build(triangles: &[Triangle]) -> Self {
        let mut nodes = Vec::new();
        let members = (0..triangles.len() as u32).collect();
        build_node(&mut nodes, triangles, members, 0);
        Self { nodes }
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nearest enabled-triangle hit along `ray`, if any.
    pub fn hit(&self, triangles: &[Triangle], ray: &Ray) -> Option<GroupHit> {
        let mut nearest = f32::INFINITY;
        let mut hit_triangle = None;
        self.hit_node(0, triangles, ray, &mut nearest, &mut hit_triangle);
        hit_triangle.map(|triangle| GroupHit {
            distance: nearest,
            triangle,
        })
    }

    /// Recursive traversal. `nearest` threads the best distance found so
    /// far through the whole walk, so subtrees visited later prune against
    /// hits found earlier.
    fn hit_node(
        &self,
        index: u32,
        triangles: &[Triangle],
        ray: &Ray,
        nearest: &mut f32,
        hit: &mut Option<u32>,
    ) -> bool {
        let node = &self.nodes[index as usize];

        let Some(entry) = node.bounds.intersect(ray) else {
            return false;
        };
        // With the origin inside the box the reported distance is the exit,
        // which bounds nothing about interior hits; prune only on a real
        // entry beyond the current best.
        if entry > *nearest && !node.bounds.contains(ray.origin) {
            return false;
        }

        match &node.kind {
            NodeKind::Split { left, right } => {
                let hit_left = self.hit_node(*left, triangles, ray, nearest, hit);
                let hit_right = self.hit_node(*right, triangles, ray, nearest, hit);
                hit_left || hit_right
            }
            NodeKind::Leaf(members) => {
                let mut hit_any = false;
                for &tri_index in members {
                    let triangle = &triangles[tri_index as usize];
                    if !triangle.enabled {
                        continue;
                    }
                    if let Some(t) = triangle.ray_intersection(ray) {
                        if t < *nearest {
                            *nearest = t;
                            *hit = Some(tri_index);
                            hit_any = true;
                        }
                    }
                }
                hit_any
            }
        }
    }
}

/// Recursive construction. Appends the subtree for `members` to the arena
/// and returns its root index.
fn build_node(nodes: &mut Vec<Node>, triangles: &[Triangle], members: Vec<u32>, depth: u32) -> u32 {
    let index = nodes.len() as u32;
    nodes.push(Node {
        bounds: Aabb::EMPTY,
        kind: NodeKind::Leaf(Vec::new()),
    });

    if members.is_empty() {
        // Always-miss leaf: the EMPTY box fails every intersection test.
        return index;
    }

    let mut bounds = Aabb::EMPTY;
    let mut mean = Vec3::ZERO;
    let weight = 1.0 / members.len() as f32;
    for &tri_index in &members {
        bounds.expand_box(&triangles[tri_index as usize].bounding_box());
        mean += triangles[tri_index as usize].centroid() * weight;
    }

    if depth > MAX_DEPTH || members.len() <= LEAF_MAX_SIZE {
        nodes[index as usize] = Node {
            bounds,
            kind: NodeKind::Leaf(members),
        };
        return index;
    }

    let axis = bounds.longest_axis();
    let (right, left): (Vec<u32>, Vec<u32>) = members
        .iter()
        .copied()
        .partition(|&tri_index| triangles[tri_index as usize].centroid()[axis] >= mean[axis]);

    if left.is_empty() || right.is_empty() {
        // The mean split failed to separate anything (identical centroids,
        // for one). Recursing would never terminate; force a leaf.
        nodes[index as usize] = Node {
            bounds,
            kind: NodeKind::Leaf(members),
        };
        return index;
    }

    let left = build_node(nodes, triangles, left, depth + 1);
    let right = build_node(nodes, triangles, right, depth + 1);
    nodes[index as usize] = Node {
        bounds,
        kind: NodeKind::Split { left, right },
    };
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_triangle(rng: &mut StdRng, extent: f32) -> Triangle {
        let base = Vec3::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        );
        let jitter = |rng: &mut StdRng| {
            Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
        };
        Triangle::new([base, base + jitter(rng), base + jitter(rng)], 0)
    }

    /// Reference implementation: test every triangle directly.
    fn brute_force(triangles: &[Triangle], ray: &Ray) -> Option<GroupHit> {
        let mut best: Option<GroupHit> = None;
        for (i, tri) in triangles.iter().enumerate() {
            if let Some(t) = tri.ray_intersection(ray) {
                if best.map_or(true, |b| t < b.distance) {
                    best = Some(GroupHit {
                        distance: t,
                        triangle: i as u32,
                    });
                }
            }
        }
        best
    }

    #[test]
    fn test_empty_build_always_misses() {
        let tree = KdTree::build(&[]);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(tree.hit(&[], &ray).is_none());
    }

    #[test]
    fn test_single_triangle() {
        let tris = vec![Triangle::new(
            [
                Vec3::new(-1.0, -1.0, -5.0),
                Vec3::new(1.0, -1.0, -5.0),
                Vec3::new(0.0, 1.0, -5.0),
            ],
            0,
        )];
        let tree = KdTree::build(&tris);

        let hit = tree
            .hit(&tris, &Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)))
            .expect("must hit");
        assert!((hit.distance - 5.0).abs() < 1e-4);
        assert_eq!(hit.triangle, 0);
    }

    #[test]
    fn test_matches_brute_force_on_random_soup() {
        let mut rng = StdRng::seed_from_u64(42);
        let triangles: Vec<Triangle> = (0..256).map(|_| random_triangle(&mut rng, 10.0)).collect();
        let tree = KdTree::build(&triangles);

        for _ in 0..500 {
            let origin = Vec3::new(
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
            );
            let direction = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if direction.length_squared() < 1e-6 {
                continue;
            }
            let ray = Ray::new(origin, direction.normalize());

            let indexed = tree.hit(&triangles, &ray);
            let reference = brute_force(&triangles, &ray);

            match (indexed, reference) {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    assert!(
                        (a.distance - b.distance).abs() < 1e-4,
                        "index {} vs brute {}",
                        a.distance,
                        b.distance
                    );
                }
                (a, b) => panic!("index {a:?} disagrees with brute force {b:?}"),
            }
        }
    }

    #[test]
    fn test_identical_centroids_terminate() {
        // Every triangle is the same: the mean split can never separate
        // them, so the degenerate-partition guard must produce a leaf.
        let tri = |i| {
            Triangle::new(
                [
                    Vec3::new(0.0, 0.0, 0.0),
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(0.0, 1.0, 0.0),
                ],
                i,
            )
        };
        let triangles: Vec<Triangle> = (0..64).map(tri).collect();
        let tree = KdTree::build(&triangles);

        // One root leaf; no runaway recursion.
        assert_eq!(tree.node_count(), 1);
        let hit = tree
            .hit(
                &triangles,
                &Ray::new(Vec3::new(0.25, 0.25, 3.0), Vec3::new(0.0, 0.0, -1.0)),
            )
            .expect("must hit");
        assert!((hit.distance - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_disabled_triangles_are_invisible() {
        let mut triangles = vec![
            Triangle::new(
                [
                    Vec3::new(-1.0, -1.0, -2.0),
                    Vec3::new(1.0, -1.0, -2.0),
                    Vec3::new(0.0, 1.0, -2.0),
                ],
                0,
            ),
            Triangle::new(
                [
                    Vec3::new(-1.0, -1.0, -4.0),
                    Vec3::new(1.0, -1.0, -4.0),
                    Vec3::new(0.0, 1.0, -4.0),
                ],
                1,
            ),
        ];
        let tree = KdTree::build(&triangles);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let front = tree.hit(&triangles, &ray).expect("front triangle");
        assert_eq!(front.triangle, 0);

        triangles[0].enabled = false;
        let behind = tree.hit(&triangles, &ray).expect("rear triangle");
        assert_eq!(behind.triangle, 1);
        assert!((behind.distance - 4.0).abs() < 1e-4);
    }
}
