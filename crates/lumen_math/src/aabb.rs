//! Axis-aligned bounding box for the spatial index.

use glam::Vec3;

use crate::Ray;

/// Axis-aligned bounding box, stored as min/max corner points.
///
/// Invariant: `min <= max` componentwise after any expansion. `EMPTY` is
/// the fold identity: expanding it with a box or point yields exactly that
/// box or point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An empty box (contains nothing). Expansion identity.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create a new AABB from its corner points.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Grow to cover another box. Idempotent, no-op when already contained.
    pub fn expand_box(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Grow to cover a point. Idempotent, no-op when already contained.
    pub fn expand_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Returns the axis (0=x, 1=y, 2=z) with the largest extent.
    ///
    /// Ties prefer the lower-indexed axis (x over y over z). The split-axis
    /// choice during index construction depends on this ordering, so it must
    /// stay deterministic.
    pub fn longest_axis(&self) -> usize {
        let d = self.max - self.min;

        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Whether a point lies inside the box (boundary inclusive).
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Slab-method ray intersection.
    ///
    /// Intersects the three per-axis parametric intervals in sequence using
    /// the ray's reciprocal direction. Returns `Some(t)` when the farthest
    /// exit is not before the nearest entry; `t` is the entry distance when
    /// positive, otherwise the exit distance (which tells the caller the ray
    /// origin is inside the box, or the box is behind the ray entirely).
    ///
    /// Zero direction components arrive here as signed infinities in
    /// `inv_direction` and flow through the min/max chain as unbounded
    /// slabs; they must not short-circuit the test.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let tx1 = (self.min.x - ray.origin.x) * ray.inv_direction.x;
        let tx2 = (self.max.x - ray.origin.x) * ray.inv_direction.x;
        let mut tmin = tx1.min(tx2);
        let mut tmax = tx1.max(tx2);

        let ty1 = (self.min.y - ray.origin.y) * ray.inv_direction.y;
        let ty2 = (self.max.y - ray.origin.y) * ray.inv_direction.y;
        tmin = tmin.max(ty1.min(ty2));
        tmax = tmax.min(ty1.max(ty2));

        let tz1 = (self.min.z - ray.origin.z) * ray.inv_direction.z;
        let tz2 = (self.max.z - ray.origin.z) * ray.inv_direction.z;
        tmin = tmin.max(tz1.min(tz2));
        tmax = tmax.min(tz1.max(tz2));

        if tmax >= tmin {
            Some(if tmin > 0.0 { tmin } else { tmax })
        } else {
            None
        }
    }
}
