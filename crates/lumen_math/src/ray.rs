//! Ray type for path tracing.

use glam::Vec3;

/// A ray with origin, direction, and precomputed reciprocal direction.
///
/// The reciprocal is computed once at construction so the slab test can
/// multiply instead of divide. Direction components of exactly zero yield
/// correctly-signed infinities (IEEE-754), which the box test relies on.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray
    pub origin: Vec3,
    /// Direction vector (not necessarily normalized)
    pub direction: Vec3,
    /// Componentwise 1/direction
    pub inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    /// Compute a point along the ray at parameter t.
    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }
}
