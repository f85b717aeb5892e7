//! Randomized sampling helpers and reflectance math.
//!
//! Every randomized function takes its random source explicitly; nothing
//! here touches ambient global state.

use std::f32::consts::PI;

use glam::Vec3;
use rand::{Rng, RngCore};

/// Cosine-weighted random direction on the hemisphere around `normal`.
pub fn cosine_weighted_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let r1: f32 = rng.gen();
    let r2: f32 = rng.gen();
    let theta = (1.0 - r1).sqrt().acos();
    let phi = 2.0 * PI * r2;
    let xs = theta.sin() * phi.cos();
    let ys = theta.cos();
    let zs = theta.sin() * phi.sin();

    // Tangent basis around the normal. Bumping the smallest component
    // guarantees the cross product cannot vanish.
    let y = normal;
    let mut h = y;
    if h.x.abs() <= h.y.abs() && h.x.abs() <= h.z.abs() {
        h.x = 1.0;
    } else if h.y.abs() <= h.x.abs() && h.y.abs() <= h.z.abs() {
        h.y = 1.0;
    } else {
        h.z = 1.0;
    }
    let x = h.cross(y).normalize();
    let z = x.cross(y).normalize();

    (xs * x + ys * y + zs * z).normalize()
}

/// Schlick's approximation of Fresnel reflectance.
///
/// `incoming` travels toward the surface; the transition is from medium
/// `n1` into `n2`.
pub fn schlick(incoming: Vec3, normal: Vec3, n1: f32, n2: f32) -> f32 {
    let r0 = ((n1 - n2) / (n1 + n2)).powi(2);
    // Clamping the cosine keeps the reflectance inside [r0, 1] even for
    // directions numerically past the grazing limit.
    let alpha = normal.dot(-incoming).clamp(0.0, 1.0);
    r0 + (1.0 - r0) * (1.0 - alpha).powi(5)
}

/// Reflect `v` about `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract `v` through a surface with normal `n` and index ratio `eta`.
///
/// Returns the zero vector on total internal reflection (a zero-direction
/// ray misses everything downstream, so the contribution vanishes).
#[inline]
pub fn refract(v: Vec3, n: Vec3, eta: f32) -> Vec3 {
    let cos_i = n.dot(v);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        Vec3::ZERO
    } else {
        eta * v - (eta * cos_i + k.sqrt()) * n
    }
}
