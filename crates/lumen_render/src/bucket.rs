//! Bucket-based parallel rendering.
//!
//! The image is divided into tiles (buckets) rendered independently on a
//! rayon pool. Buckets run center-out, the pattern production renderers
//! use so the subject resolves first.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::{Camera, Color, Film, Integrator, Scene};

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Render configuration.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    /// Samples per pixel; rounded down to a square for stratification
    pub rays_per_pixel: u32,
    /// Maximum recursion depth of the integrator
    pub max_depth: u32,
    /// Tile edge length in pixels
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            rays_per_pixel: 4,
            max_depth: 4,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

/// A rectangular region of the image.
#[derive(Debug, Clone, Copy)]
pub struct Bucket {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bucket {
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Generate buckets covering a width x height image, sorted center-out.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            buckets.push(Bucket {
                x,
                y,
                width: bucket_size.min(width - x),
                height: bucket_size.min(height - y),
            });
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_center_out(&mut buckets, width, height);
    buckets
}

fn sort_center_out(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let dist = |b: &Bucket| {
        let bx = b.x as f32 + b.width as f32 / 2.0;
        let by = b.y as f32 + b.height as f32 / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    buckets.sort_by(|a, b| {
        dist(a)
            .partial_cmp(&dist(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Render the scene to a film, buckets in parallel.
///
/// Scene data is shared read-only across workers; each bucket owns its own
/// RNG, and pixels are written exactly once when results are merged.
pub fn render(scene: &Scene, camera: &Camera, config: &RenderConfig) -> Film {
    let integrator = Integrator::new(scene, config.max_depth);
    let buckets = generate_buckets(camera.width, camera.height, config.bucket_size);

    log::info!(
        "Rendering {}x{}: {} buckets, {} rays/pixel, max depth {}",
        camera.width,
        camera.height,
        buckets.len(),
        config.rays_per_pixel,
        config.max_depth
    );

    let results: Vec<(Bucket, Vec<Color>)> = buckets
        .par_iter()
        .enumerate()
        .map(|(i, bucket)| {
            let mut rng = SmallRng::from_entropy();
            let pixels = render_bucket(bucket, camera, &integrator, config, &mut rng);
            log::debug!("Bucket {}/{} done", i + 1, buckets.len());
            (*bucket, pixels)
        })
        .collect();

    let mut film = Film::new(camera.width, camera.height);
    for (bucket, pixels) in results {
        for local_y in 0..bucket.height {
            for local_x in 0..bucket.width {
                let color = pixels[(local_y * bucket.width + local_x) as usize];
                film.set(bucket.x + local_x, bucket.y + local_y, color);
            }
        }
    }
    film
}

/// Render one bucket to a row-major pixel vector.
fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    integrator: &Integrator,
    config: &RenderConfig,
    rng: &mut SmallRng,
) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let samples =
                camera.sample_pixel(bucket.x + local_x, bucket.y + local_y, config.rays_per_pixel, rng);
            let inv_samples = 1.0 / samples.len() as f32;

            let mut color = Color::ZERO;
            for (ray, weight) in samples {
                color += weight * integrator.radiance(&ray, rng);
            }
            pixels.push(color * inv_samples);
        }
    }

    pixels
}
