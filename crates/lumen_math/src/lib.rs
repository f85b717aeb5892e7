// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod ray;
pub use aabb::Aabb;
pub use ray::Ray;

/// Geometric face normal of the triangle `(v1, v2, v3)`.
///
/// Deterministic: depends only on vertex order, so every caller that needs
/// the face normal of the same triangle gets the same vector.
pub fn face_normal(v1: Vec3, v2: Vec3, v3: Vec3) -> Vec3 {
    (v3 - v2).cross(v1 - v2).normalize()
}

/// Bilinearly interpolate between four corner values.
///
/// `dy` and `dz` are the normalized coordinates inside the quad spanned by
/// the corners `x1..x4` (ordered counter-clockwise starting at the corner
/// where both coordinates are 1).
pub fn bilinear_interpolation(dy: f32, dz: f32, x1: f32, x2: f32, x3: f32, x4: f32) -> f32 {
    let idy = 1.0 - dy;
    let idz = 1.0 - dz;
    let a1 = idy * dz;
    let a2 = dy * dz;
    let a3 = dy * idz;
    let a4 = idy * idz;

    a3 * x1 + a4 * x2 + a1 * x3 + a2 * x4
}
