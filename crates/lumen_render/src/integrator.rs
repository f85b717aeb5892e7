//! Recursive path-tracing integrator.
//!
//! Estimates the radiance arriving along a ray: explicit light sampling
//! for direct lighting, one cosine-weighted bounce for indirect, and
//! recursive mirror/refraction branches, all bounded by a fixed maximum
//! depth.

use glam::Vec3;
use rand::RngCore;

use lumen_math::Ray;

use crate::material::COEFF_EPSILON;
use crate::sampling::{cosine_weighted_hemisphere, reflect, refract, schlick};
use crate::{Color, Scene, RAY_EPSILON};

/// Recursive radiance estimator over a scene.
pub struct Integrator<'a> {
    scene: &'a Scene,
    max_depth: u32,
}

impl<'a> Integrator<'a> {
    pub fn new(scene: &'a Scene, max_depth: u32) -> Self {
        Self { scene, max_depth }
    }

    /// Estimate the radiance arriving along a primary ray.
    pub fn radiance(&self, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        self.trace(ray, 0, rng)
    }

    fn trace(&self, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        if depth == self.max_depth {
            return Color::ZERO;
        }

        // Step past the surface the ray left from.
        let ray = Ray::new(ray.origin + RAY_EPSILON * ray.direction, ray.direction);

        let Some(hit) = self.scene.cast_ray(&ray) else {
            return Color::ZERO;
        };

        let point = ray.at(hit.distance);
        let group = self.scene.group(hit.group);
        let triangle = &group.triangles[hit.triangle];
        let normal = triangle.normal_at(point);

        // Surfaces are one-sided; the back of a face is black.
        let cos_view = (-ray.direction).dot(normal);
        if cos_view < COEFF_EPSILON {
            return Color::ZERO;
        }

        let material = group.material.as_ref();

        // Lights terminate the path. A camera ray sees the emission
        // exactly; deeper rays get it attenuated by the viewing cosine,
        // which damps the double count against the explicit light sampling
        // below.
        if material.is_emissive() {
            if depth == 0 {
                return material.emission_color();
            }
            return cos_view * material.emission_color();
        }

        let rf = 1.0 - material.reflectivity();
        let tf = 1.0 - material.transparency();
        let mut color = Color::ZERO;

        // Fully mirrored or fully transparent surfaces skip the diffuse
        // estimate entirely.
        if rf > COEFF_EPSILON && tf > COEFF_EPSILON {
            let mut direct = Color::ZERO;
            for &light_index in self.scene.emissive_groups() {
                let light = self.scene.group(light_index);
                let target = light.random_surface_point(rng);
                let shadow_dir = (target - point).normalize();
                if shadow_dir.dot(normal) < COEFF_EPSILON {
                    // Sampled point is behind this surface.
                    continue;
                }

                let shadow_ray = Ray::new(point + normal * RAY_EPSILON, shadow_dir);
                let Some(shadow_hit) = self.scene.cast_ray(&shadow_ray) else {
                    continue;
                };
                if shadow_hit.group != light_index {
                    // Occluded.
                    continue;
                }

                let light_triangle = &light.triangles[shadow_hit.triangle];
                let light_point = shadow_ray.at(shadow_hit.distance);
                let light_normal = light_triangle.normal_at(light_point);
                let cos_light = (-shadow_dir).dot(light_normal);
                if cos_light < COEFF_EPSILON {
                    // We see the back of the light.
                    continue;
                }

                let radiance = cos_light * light.material.emission_color();
                direct += material.diffuse(-shadow_dir, -ray.direction, normal, radiance);
                if material.is_specular() {
                    direct += material.specular(-shadow_dir, -ray.direction, normal, radiance);
                }
            }
            // One uniform sample per light per bounce: normalize by the
            // light count so many-light scenes don't over-brighten.
            color += direct / self.scene.emissive_groups().len().max(1) as f32;

            // Indirect lighting: a single cosine-weighted bounce.
            let bounce_dir = cosine_weighted_hemisphere(normal, rng);
            let bounce = Ray::new(point, bounce_dir);
            let incoming = self.trace(&bounce, depth + 1, rng);
            color += material.diffuse(-bounce_dir, -ray.direction, normal, incoming);

            // Leave room for the reflected/refracted energy added below.
            color *= rf * tf;
        }

        if material.is_reflective() {
            let reflected = Ray::new(point, reflect(ray.direction, normal));
            color += material.reflectivity() * self.trace(&reflected, depth + 1, rng);
        } else if material.is_transparent() {
            color += self.refracted(&ray, point, normal, hit.group, depth, rng);
        }

        color
    }

    /// Refraction through the hit group.
    ///
    /// When the refracted ray re-enters the same group the exit surface is
    /// resolved immediately with swapped indices; entering and exiting a
    /// solid is one logical bounce, so the interior hop does not consume a
    /// recursion level.
    fn refracted(
        &self,
        ray: &Ray,
        point: Vec3,
        normal: Vec3,
        group_index: usize,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        let group = self.scene.group(group_index);
        let material = group.material.as_ref();
        let n1 = 1.0;
        let n2 = material.refractive_index();
        let reflectance = schlick(ray.direction, normal, n1, n2);

        let mut color = Color::ZERO;
        let refracted = Ray::new(
            point - normal * RAY_EPSILON,
            refract(ray.direction, normal, n1 / n2),
        );

        if let Some(exit) = self.scene.cast_ray_within(&refracted, group_index) {
            let exit_point = refracted.at(exit.distance);
            let exit_triangle = &group.triangles[exit.triangle as usize];
            let exit_normal = exit_triangle.normal_at(exit_point);
            let inner_reflectance = schlick(refracted.direction, -exit_normal, n2, n1);
            let outgoing = Ray::new(
                exit_point + 0.01 * exit_normal,
                refract(refracted.direction, -exit_normal, n2 / n1),
            );
            let incoming = (1.0 - inner_reflectance) * self.trace(&outgoing, depth + 1, rng);
            color += (1.0 - reflectance)
                * material.transparency()
                * material.diffuse(refracted.direction, -ray.direction, normal, incoming);
        } else {
            // Never re-hits its own group: straight out to open space.
            color += (1.0 - reflectance)
                * material.transparency()
                * self.trace(&refracted, depth + 1, rng);
        }

        // The energy Schlick keeps at the surface reflects specularly.
        let specular_ray = Ray::new(point, reflect(ray.direction, normal));
        let incoming = self.trace(&specular_ray, depth + 1, rng);
        color += reflectance
            * material.specularity()
            * material.specular(-specular_ray.direction, -ray.direction, normal, incoming);

        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Material, RenderGroup, Triangle};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn facing_triangle(z: f32, material: Arc<dyn Material>) -> RenderGroup {
        // Wound so the face normal points toward +Z (at the camera).
        let triangles = vec![Triangle::new(
            [
                Vec3::new(0.0, 0.0, z),
                Vec3::new(1.0, 0.0, z),
                Vec3::new(0.0, 1.0, z),
            ],
            0,
        )];
        RenderGroup::new(triangles, material)
    }

    #[test]
    fn test_emission_only_scene_exact() {
        let emission = Vec3::new(0.9, 0.8, 0.7);
        let mut scene = Scene::new();
        scene.add_group(facing_triangle(0.0, Arc::new(Lambertian::emissive(emission, 1.0))));

        let integrator = Integrator::new(&scene, 1);
        let mut rng = StdRng::seed_from_u64(1);

        // Head-on hit returns the emission color exactly.
        let hit_ray = Ray::new(Vec3::new(0.25, 0.25, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(integrator.radiance(&hit_ray, &mut rng), emission);

        // A miss is black.
        let miss_ray = Ray::new(Vec3::new(2.0, 2.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(integrator.radiance(&miss_ray, &mut rng), Vec3::ZERO);
    }

    #[test]
    fn test_back_face_is_black() {
        let mut scene = Scene::new();
        scene.add_group(facing_triangle(
            0.0,
            Arc::new(Lambertian::emissive(Vec3::ONE, 1.0)),
        ));

        let integrator = Integrator::new(&scene, 2);
        let mut rng = StdRng::seed_from_u64(1);

        // Approach from behind the one-sided face.
        let ray = Ray::new(Vec3::new(0.25, 0.25, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(integrator.radiance(&ray, &mut rng), Vec3::ZERO);
    }

    #[test]
    fn test_zero_depth_is_black() {
        let mut scene = Scene::new();
        scene.add_group(facing_triangle(
            0.0,
            Arc::new(Lambertian::emissive(Vec3::ONE, 1.0)),
        ));

        let integrator = Integrator::new(&scene, 0);
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::new(0.25, 0.25, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(integrator.radiance(&ray, &mut rng), Vec3::ZERO);
    }

    #[test]
    fn test_diffuse_surface_lit_by_light() {
        // A diffuse floor below a bright ceiling light must come out
        // non-black through the explicit light sampling path.
        let mut scene = Scene::new();

        // Floor at y=0, normal +Y.
        let floor = vec![
            Triangle::new(
                [
                    Vec3::new(-5.0, 0.0, -5.0),
                    Vec3::new(5.0, 0.0, 5.0),
                    Vec3::new(5.0, 0.0, -5.0),
                ],
                0,
            ),
            Triangle::new(
                [
                    Vec3::new(-5.0, 0.0, -5.0),
                    Vec3::new(-5.0, 0.0, 5.0),
                    Vec3::new(5.0, 0.0, 5.0),
                ],
                1,
            ),
        ];
        scene.add_group(RenderGroup::new(
            floor,
            Arc::new(Lambertian::new(Vec3::splat(0.8))),
        ));

        // Light at y=4, facing down.
        let light = vec![Triangle::new(
            [
                Vec3::new(-1.0, 4.0, -1.0),
                Vec3::new(1.0, 4.0, -1.0),
                Vec3::new(0.0, 4.0, 1.0),
            ],
            0,
        )];
        scene.add_group(RenderGroup::new(
            light,
            Arc::new(Lambertian::emissive(Vec3::ONE, 10.0)),
        ));

        let integrator = Integrator::new(&scene, 3);
        let mut rng = StdRng::seed_from_u64(5);

        // Look down at the floor from above.
        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.1, -1.0, 0.1).normalize());
        let mut lit = Vec3::ZERO;
        for _ in 0..32 {
            lit += integrator.radiance(&ray, &mut rng);
        }
        assert!(lit.max_element() > 0.0, "floor should receive direct light");
    }

    #[test]
    fn test_radiance_non_negative_and_finite() {
        // Randomized soup with every material branch represented; the
        // estimator must never return negative or non-finite channels.
        let mut rng = StdRng::seed_from_u64(99);
        let mut scene = Scene::new();

        let materials: Vec<Arc<dyn Material>> = vec![
            Arc::new(Lambertian::new(Vec3::new(0.8, 0.4, 0.2)).with_specularity(0.5)),
            Arc::new(Lambertian::new(Vec3::splat(0.9)).with_reflectivity(0.7)),
            Arc::new(Lambertian::new(Vec3::ONE).with_transparency(0.8, 1.5)),
            Arc::new(Lambertian::emissive(Vec3::ONE, 4.0)),
        ];

        for (g, material) in materials.into_iter().enumerate() {
            let mut triangles = Vec::new();
            for i in 0..12u32 {
                let base = Vec3::new(
                    rng.gen_range(-4.0..4.0),
                    rng.gen_range(-4.0..4.0),
                    rng.gen_range(-4.0..4.0) - 2.0 * g as f32,
                );
                triangles.push(Triangle::new(
                    [
                        base,
                        base + Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.3),
                        base + Vec3::new(rng.gen_range(-1.0..1.0), 0.3, rng.gen_range(-1.0..1.0)),
                    ],
                    i,
                ));
            }
            scene.add_group(RenderGroup::new(triangles, material));
        }

        let integrator = Integrator::new(&scene, 4);
        for _ in 0..200 {
            let origin = Vec3::new(
                rng.gen_range(-6.0..6.0),
                rng.gen_range(-6.0..6.0),
                rng.gen_range(-6.0..6.0),
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
            let radiance = integrator.radiance(&ray, &mut rng);

            assert!(radiance.is_finite(), "non-finite radiance: {radiance:?}");
            assert!(
                radiance.min_element() >= 0.0,
                "negative radiance: {radiance:?}"
            );
        }
    }
}
