//! Lumen Render - CPU path tracing.
//!
//! A Monte Carlo path tracer over triangle meshes: per-group spatial
//! indices prune ray/triangle tests, and a recursive integrator estimates
//! radiance with explicit light sampling, one cosine-weighted indirect
//! bounce, mirror reflection, and refraction through solids.

mod bucket;
mod camera;
mod film;
mod integrator;
mod kdtree;
mod material;
mod sampling;
mod scene;
mod triangle;

pub use bucket::{generate_buckets, render, Bucket, RenderConfig, DEFAULT_BUCKET_SIZE};
pub use camera::Camera;
pub use film::Film;
pub use integrator::Integrator;
pub use kdtree::{GroupHit, KdTree};
pub use material::{Color, Lambertian, Material};
pub use sampling::{cosine_weighted_hemisphere, reflect, refract, schlick};
pub use scene::{RenderGroup, Scene, SceneHit};
pub use triangle::Triangle;

/// Shared self-intersection bias.
///
/// Rays are advanced this far past their origin before scene queries,
/// shadow rays start this far along the surface normal, and primitive hits
/// closer than this are rejected. All three uses must agree or surfaces
/// shadow themselves.
pub const RAY_EPSILON: f32 = 1e-3;

/// Re-export common math types from lumen_math
pub use lumen_math::{Aabb, Ray, Vec3};
