//! Retina-plane camera with stratified pixel sampling.

use glam::Vec3;
use rand::{Rng, RngCore};

use lumen_math::{bilinear_interpolation, Ray};

/// Camera generating primary rays.
///
/// The retina plane sits two units ahead of the eye, spanned by four
/// corners. A primary ray runs from the eye through a bilinearly
/// interpolated point on the plane; its contribution is weighted by the
/// cosine against the plane normal.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub width: u32,
    pub height: u32,
    eye: Vec3,
    corners: [Vec3; 4],
    plane_normal: Vec3,
}

impl Camera {
    pub fn new(width: u32, height: u32, eye: Vec3, direction: Vec3, up: Vec3) -> Self {
        let direction = direction.normalize();
        let center = eye + direction * 2.0;
        let right = direction.cross(up).normalize();
        let up = right.cross(direction).normalize();

        let corners = [
            center + right - up,
            center - right - up,
            center - right + up,
            center + right + up,
        ];
        let plane_normal = -(corners[0] - corners[1])
            .cross(corners[0] - corners[3])
            .normalize();

        Self {
            width,
            height,
            eye,
            corners,
            plane_normal,
        }
    }

    /// Primary ray through the normalized image position `(u, v)` in
    /// [0, 1), with its retina-plane cosine weight.
    pub fn primary_ray(&self, u: f32, v: f32) -> (Ray, f32) {
        let [c1, c2, c3, c4] = self.corners;
        let origin = Vec3::new(
            bilinear_interpolation(u, v, c1.x, c2.x, c3.x, c4.x),
            bilinear_interpolation(u, v, c1.y, c2.y, c3.y, c4.y),
            bilinear_interpolation(u, v, c1.z, c2.z, c3.z, c4.z),
        );
        let direction = (origin - self.eye).normalize();
        let weight = (-direction).dot(self.plane_normal).max(0.0);

        (Ray::new(origin, direction), weight)
    }

    /// Stratified primary rays for pixel `(x, y)`: a jittered n x n grid
    /// where n = floor(sqrt(rays_per_pixel)), at least one sample.
    pub fn sample_pixel(
        &self,
        x: u32,
        y: u32,
        rays_per_pixel: u32,
        rng: &mut dyn RngCore,
    ) -> Vec<(Ray, f32)> {
        let n = ((rays_per_pixel as f32).sqrt() as u32).max(1);
        let inv_width = 1.0 / self.width as f32;
        let inv_height = 1.0 / self.height as f32;
        let cell_u = inv_width / n as f32;
        let cell_v = inv_height / n as f32;

        let mut samples = Vec::with_capacity((n * n) as usize);
        for i in 0..n {
            for j in 0..n {
                let u = x as f32 * inv_width + (i as f32 + rng.gen::<f32>()) * cell_u;
                let v = y as f32 * inv_height + (j as f32 + rng.gen::<f32>()) * cell_v;
                samples.push(self.primary_ray(u, v));
            }
        }
        samples
    }
}
