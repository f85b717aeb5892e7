//! Material coefficient descriptions read from `.mtl` files.

use glam::Vec3;

/// Scalar material coefficients plus a diffuse color.
///
/// This is an asset-level description; the renderer turns it into its own
/// material type. The core rendering code never validates these values,
/// that contract is upheld here at load time by construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialDesc {
    /// Diffuse surface color (RGB, 0-1)
    pub diffuse: Vec3,
    /// Emission strength; > 0 marks the surface as a light source
    pub emissivity: f32,
    /// Mirror reflectivity in [0, 1]
    pub reflectivity: f32,
    /// Transparency in [0, 1] (1 - opacity)
    pub transparency: f32,
    /// Refractive index of the interior medium
    pub refractive_index: f32,
    /// Specular highlight strength
    pub specularity: f32,
    /// Blinn-Phong specular exponent
    pub specular_exponent: f32,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            diffuse: Vec3::splat(0.8),
            emissivity: 0.0,
            reflectivity: 0.0,
            transparency: 0.0,
            refractive_index: 1.0,
            specularity: 0.0,
            specular_exponent: 75.0,
        }
    }
}

impl MaterialDesc {
    /// Description of a pure light source. Emissive surfaces carry no other
    /// response coefficients.
    pub fn emissive(diffuse: Vec3, emissivity: f32) -> Self {
        Self {
            diffuse,
            emissivity,
            ..Self::default()
        }
    }
}
