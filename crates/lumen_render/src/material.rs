//! Material trait for surface response.

use glam::Vec3;

use lumen_core::MaterialDesc;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Coefficients at or below this threshold are treated as absent.
pub(crate) const COEFF_EPSILON: f32 = f32::MIN_POSITIVE;

/// How light interacts with a surface.
///
/// The integrator only consumes responses through this trait; it never
/// constructs or mutates materials, and it does not validate coefficients.
/// Direction conventions follow the integrator: `in_dir` points toward the
/// surface along the incoming light, `out_dir` points from the surface
/// toward the viewer.
pub trait Material: Send + Sync {
    /// Base surface color.
    fn surface_color(&self) -> Color;

    fn emissivity(&self) -> f32 {
        0.0
    }

    fn reflectivity(&self) -> f32 {
        0.0
    }

    fn transparency(&self) -> f32 {
        0.0
    }

    fn refractive_index(&self) -> f32 {
        1.0
    }

    fn specularity(&self) -> f32 {
        0.0
    }

    fn specular_exponent(&self) -> f32 {
        75.0
    }

    fn is_emissive(&self) -> bool {
        self.emissivity() > COEFF_EPSILON
    }

    fn is_reflective(&self) -> bool {
        self.reflectivity() > COEFF_EPSILON
    }

    fn is_transparent(&self) -> bool {
        self.transparency() > COEFF_EPSILON
    }

    fn is_specular(&self) -> bool {
        self.specularity() > COEFF_EPSILON
    }

    /// Emitted radiance of a light source.
    fn emission_color(&self) -> Color {
        self.emissivity() * self.surface_color()
    }

    /// Diffuse response to `incoming` radiance arriving along `in_dir`.
    fn diffuse(&self, in_dir: Vec3, out_dir: Vec3, normal: Vec3, incoming: Color) -> Color;

    /// Specular response; Blinn-Phong half-vector highlight by default.
    fn specular(&self, in_dir: Vec3, out_dir: Vec3, normal: Vec3, incoming: Color) -> Color {
        let half = (out_dir - in_dir).normalize();
        // Clamp before the power: a negative base with a fractional
        // exponent is NaN, not a dim highlight.
        let highlight = normal.dot(half).max(0.0).powf(self.specular_exponent());
        highlight * incoming
    }
}

/// Lambertian surface with the full coefficient set.
#[derive(Clone, Copy, Debug)]
pub struct Lambertian {
    color: Color,
    emissivity: f32,
    reflectivity: f32,
    transparency: f32,
    refractive_index: f32,
    specularity: f32,
    specular_exponent: f32,
}

impl Lambertian {
    /// Plain diffuse surface with the given color.
    pub fn new(color: Color) -> Self {
        Self::from_desc(&MaterialDesc {
            diffuse: color,
            ..MaterialDesc::default()
        })
    }

    /// Pure light source.
    pub fn emissive(color: Color, emissivity: f32) -> Self {
        Self::from_desc(&MaterialDesc::emissive(color, emissivity))
    }

    /// Build from a loaded material description.
    pub fn from_desc(desc: &MaterialDesc) -> Self {
        Self {
            color: desc.diffuse,
            emissivity: desc.emissivity,
            reflectivity: desc.reflectivity,
            transparency: desc.transparency,
            refractive_index: desc.refractive_index,
            specularity: desc.specularity,
            specular_exponent: desc.specular_exponent,
        }
    }

    /// Mirror component in [0, 1].
    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity;
        self
    }

    /// Transparency in [0, 1] with the given refractive index.
    pub fn with_transparency(mut self, transparency: f32, refractive_index: f32) -> Self {
        self.transparency = transparency;
        self.refractive_index = refractive_index;
        self
    }

    /// Specular highlight strength.
    pub fn with_specularity(mut self, specularity: f32) -> Self {
        self.specularity = specularity;
        self
    }
}

impl Material for Lambertian {
    fn surface_color(&self) -> Color {
        self.color
    }

    fn emissivity(&self) -> f32 {
        self.emissivity
    }

    fn reflectivity(&self) -> f32 {
        self.reflectivity
    }

    fn transparency(&self) -> f32 {
        self.transparency
    }

    fn refractive_index(&self) -> f32 {
        self.refractive_index
    }

    fn specularity(&self) -> f32 {
        self.specularity
    }

    fn specular_exponent(&self) -> f32 {
        self.specular_exponent
    }

    fn diffuse(&self, in_dir: Vec3, _out_dir: Vec3, normal: Vec3, incoming: Color) -> Color {
        (-in_dir).dot(normal).max(0.0) * (incoming * self.color)
    }
}
