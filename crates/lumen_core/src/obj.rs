//! OBJ scene loading.
//!
//! Loads `.obj` files (with their `.mtl` libraries) into [`MeshData`] and
//! [`MaterialDesc`] pairs, one per shape, applying an optional model
//! transform at load time so the renderer only ever sees world-space
//! geometry.

use std::path::{Path, PathBuf};

use glam::{Mat3, Mat4, Vec3};
use thiserror::Error;

use crate::{MaterialDesc, MeshData};

/// Errors produced while loading a scene asset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load OBJ: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("no mesh shapes in OBJ file {path}")]
    Empty { path: PathBuf },
}

/// A mesh together with the material description of its shape.
#[derive(Clone, Debug)]
pub struct LoadedMesh {
    pub name: String,
    pub mesh: MeshData,
    pub material: MaterialDesc,
}

/// Load an OBJ file without a model transform.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Vec<LoadedMesh>, LoadError> {
    load_obj_transformed(path, Vec3::ZERO, Vec3::ZERO, Vec3::ONE)
}

/// Load an OBJ file, transforming positions and normals by the TRS model
/// matrix `translate * scale * rot_x * rot_y * rot_z` (rotations in degrees).
pub fn load_obj_transformed<P: AsRef<Path>>(
    path: P,
    translate: Vec3,
    rotate_degrees: Vec3,
    scale: Vec3,
) -> Result<Vec<LoadedMesh>, LoadError> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )?;

    if models.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let materials = match materials {
        Ok(materials) => materials,
        Err(err) => {
            log::warn!("Failed to load material library for {path:?}: {err}");
            Vec::new()
        }
    };

    let model_matrix = Mat4::from_translation(translate)
        * Mat4::from_scale(scale)
        * Mat4::from_rotation_x(rotate_degrees.x.to_radians())
        * Mat4::from_rotation_y(rotate_degrees.y.to_radians())
        * Mat4::from_rotation_z(rotate_degrees.z.to_radians());
    let normal_matrix = Mat3::from_mat4(model_matrix);

    let mut loaded = Vec::with_capacity(models.len());
    for model in &models {
        let mesh = &model.mesh;

        let positions: Vec<Vec3> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| model_matrix.transform_point3(Vec3::new(p[0], p[1], p[2])))
            .collect();

        let normals = if mesh.normals.is_empty() {
            None
        } else {
            Some(
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| (normal_matrix * Vec3::new(n[0], n[1], n[2])).normalize_or_zero())
                    .collect(),
            )
        };

        let material = match mesh.material_id.and_then(|id| materials.get(id)) {
            Some(mat) => material_desc(mat),
            None => {
                log::warn!("Shape '{}' has no material, using default", model.name);
                MaterialDesc::default()
            }
        };

        log::info!(
            "Loaded shape '{}': {} triangles, emissivity {}",
            model.name,
            mesh.indices.len() / 3,
            material.emissivity
        );

        loaded.push(LoadedMesh {
            name: model.name.clone(),
            mesh: MeshData::new(positions, mesh.indices.clone(), normals),
            material,
        });
    }

    Ok(loaded)
}

/// Map `.mtl` fields onto the renderer's coefficient set.
///
/// Emission (`Ke`) wins: any emissive shape becomes a pure light source.
/// Otherwise reflectivity comes from the averaged ambient color,
/// specularity from the averaged specular color, and transparency from
/// `1 - dissolve`.
fn material_desc(mat: &tobj::Material) -> MaterialDesc {
    let diffuse = mat.diffuse.map(Vec3::from).unwrap_or(Vec3::splat(0.8));
    let emission = mat
        .unknown_param
        .get("Ke")
        .map(|s| parse_vec3(s))
        .unwrap_or(Vec3::ZERO);

    if emission.max_element() > 0.0 {
        let emissivity = (emission.x + emission.y + emission.z) / 3.0;
        return MaterialDesc::emissive(diffuse, emissivity);
    }

    let ambient = mat.ambient.unwrap_or([0.0; 3]);
    let specular = mat.specular.unwrap_or([0.0; 3]);
    let opacity = mat.dissolve.unwrap_or(1.0);

    MaterialDesc {
        diffuse,
        emissivity: 0.0,
        reflectivity: (ambient[0] + ambient[1] + ambient[2]) / 3.0,
        transparency: 1.0 - opacity,
        refractive_index: mat.optical_density.unwrap_or(1.0),
        specularity: (specular[0] + specular[1] + specular[2]) / 3.0,
        specular_exponent: mat.shininess.unwrap_or(75.0),
    }
}

fn parse_vec3(s: &str) -> Vec3 {
    let mut parts = s.split_whitespace().map(|p| p.parse::<f32>().unwrap_or(0.0));
    let x = parts.next().unwrap_or(0.0);
    let y = parts.next().unwrap_or(x);
    let z = parts.next().unwrap_or(x);
    Vec3::new(x, y, z)
}
