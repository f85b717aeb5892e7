//! Triangle primitive.
//!
//! Ray intersection solves the barycentric system with Cramer's rule
//! (Möller-Trumbore); the same precomputed edge basis also drives smooth
//! normal interpolation.

use glam::Vec3;
use rand::{Rng, RngCore};

use lumen_math::{face_normal, Aabb, Ray};

use crate::RAY_EPSILON;

/// Tolerance for treating supplied vertex normals as mutually parallel.
const PARALLEL_EPSILON: f32 = 1e-6;

/// A triangle with precomputed edge basis and shading normals.
///
/// Immutable after construction except for `enabled`, which toggles
/// visibility without rebuilding the owning group's index.
pub struct Triangle {
    vertices: [Vec3; 3],
    normals: [Vec3; 3],
    /// Edge basis from vertex 0: u = v1 - v0, v = v2 - v0
    u: Vec3,
    v: Vec3,
    uu: f32,
    vv: f32,
    uv: f32,
    /// Determinant of the barycentric system: uv^2 - uu*vv
    det: f32,
    face_normal: Vec3,
    /// Smooth triangles blend per-vertex normals; flat ones always return
    /// the face normal
    smooth: bool,
    /// Position of this triangle within its owning render group
    pub index: u32,
    /// Visibility toggle; disabled triangles never report hits
    pub enabled: bool,
}

impl Triangle {
    /// Create a flat-shaded triangle from three vertices.
    pub fn new(vertices: [Vec3; 3], index: u32) -> Self {
        let normal = face_normal(vertices[0], vertices[1], vertices[2]);
        Self::build(vertices, [normal; 3], normal, false, index)
    }

    /// Create a triangle with per-vertex shading normals.
    ///
    /// Degenerate normals (near zero length) or three mutually parallel
    /// normals fall back to flat shading with the geometric face normal.
    /// Otherwise each vertex normal is sign-corrected to agree with the
    /// face normal before storage.
    pub fn with_normals(vertices: [Vec3; 3], mut normals: [Vec3; 3], index: u32) -> Self {
        let normal = face_normal(vertices[0], vertices[1], vertices[2]);

        let degenerate = normals
            .iter()
            .any(|n| n.length_squared() < PARALLEL_EPSILON);
        let parallel = (normals[0].dot(normals[1]).abs() - 1.0).abs() < PARALLEL_EPSILON
            && (normals[1].dot(normals[2]).abs() - 1.0).abs() < PARALLEL_EPSILON;

        if degenerate || parallel {
            return Self::build(vertices, [normal; 3], normal, false, index);
        }

        for n in &mut normals {
            if normal.dot(*n) < 0.0 {
                *n = -*n;
            }
        }
        Self::build(vertices, normals, normal, true, index)
    }

    fn build(
        vertices: [Vec3; 3],
        normals: [Vec3; 3],
        face_normal: Vec3,
        smooth: bool,
        index: u32,
    ) -> Self {
        let u = vertices[1] - vertices[0];
        let v = vertices[2] - vertices[0];
        let uu = u.dot(u);
        let vv = v.dot(v);
        let uv = u.dot(v);

        Self {
            vertices,
            normals,
            u,
            v,
            uu,
            vv,
            uv,
            det: uv * uv - uu * vv,
            face_normal,
            smooth,
            index,
            enabled: true,
        }
    }

    /// Axis-aligned box exactly containing the three vertices.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::new(
            self.vertices[0].min(self.vertices[1]).min(self.vertices[2]),
            self.vertices[0].max(self.vertices[1]).max(self.vertices[2]),
        )
    }

    /// Arithmetic mean of the vertices. Split heuristic only, never used
    /// for intersection.
    pub fn centroid(&self) -> Vec3 {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }

    /// Shading normal at a point on the triangle.
    ///
    /// Flat triangles return the face normal. Smooth triangles blend the
    /// vertex normals by the point's barycentric weights; a degenerate
    /// blend (cancelled or non-finite) falls back to the face normal so no
    /// point accepted by `ray_intersection` yields NaN.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        if !self.smooth {
            return self.face_normal;
        }

        let w = point - self.vertices[0];
        let wu = w.dot(self.u);
        let wv = w.dot(self.v);
        let s = (self.uv * wv - self.vv * wu) / self.det;
        let t = (self.uv * wu - self.uu * wv) / self.det;

        let blended =
            self.normals[1] * s + self.normals[2] * t + self.normals[0] * (1.0 - s - t);
        if blended.is_finite() && blended.length_squared() > PARALLEL_EPSILON {
            blended.normalize()
        } else {
            self.face_normal
        }
    }

    /// Möller-Trumbore ray intersection.
    ///
    /// Returns the hit distance, rejecting barycentric coordinates outside
    /// the triangle, non-finite distances (degenerate geometry), and hits
    /// closer than `RAY_EPSILON` so a bounced ray cannot re-hit the surface
    /// it left from.
    pub fn ray_intersection(&self, ray: &Ray) -> Option<f32> {
        let p = ray.direction.cross(self.v);
        let inv_den = 1.0 / self.u.dot(p);
        let tvec = ray.origin - self.vertices[0];

        let bu = inv_den * tvec.dot(p);
        if !(0.0..=1.0).contains(&bu) {
            return None;
        }

        let q = tvec.cross(self.u);
        let bv = inv_den * ray.direction.dot(q);
        if bv < 0.0 || bu + bv > 1.0 {
            return None;
        }

        let t = inv_den * self.v.dot(q);
        (t.is_finite() && t > RAY_EPSILON).then_some(t)
    }

    /// Uniform random point on the triangle's surface.
    ///
    /// Samples the parallelogram spanned by the two edges from vertex 0 and
    /// folds outside samples back through the far-edge midpoint, which keeps
    /// the distribution uniform without rejection.
    pub fn random_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        let mut r1: f32 = rng.gen();
        let mut r2: f32 = rng.gen();
        if r1 + r2 > 1.0 {
            r1 = 1.0 - r1;
            r2 = 1.0 - r2;
        }
        self.vertices[0] + r1 * self.u + r2 * self.v
    }
}
