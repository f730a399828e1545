//! glTF/GLB model loading.
//!
//! Only vertex positions are read. Node transforms are multiplied down the
//! hierarchy and baked into the positions, so every returned mesh is in
//! model space. Materials and images are never touched.

use std::fs;
use std::path::Path;

use glam::{Mat4, Vec3};
use palace_core::ModelMesh;

use crate::error::{AssetError, Result};

pub fn load_model(path: &Path) -> Result<Vec<ModelMesh>> {
    let bytes = fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let meshes = model_from_slice(&bytes, path.parent())?;
    tracing::debug!(path = %path.display(), meshes = meshes.len(), "model read");
    Ok(meshes)
}

/// Parse `.gltf` JSON or `.glb` bytes. External buffers resolve against `base`.
pub fn model_from_slice(bytes: &[u8], base: Option<&Path>) -> Result<Vec<ModelMesh>> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, base, blob)?;
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::InvalidData("model has no scene".into()))?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        collect(&node, Mat4::IDENTITY, &buffers, &mut meshes);
    }
    if meshes.is_empty() {
        return Err(AssetError::InvalidData("model has no mesh positions".into()));
    }
    Ok(meshes)
}

fn collect(node: &gltf::Node<'_>, parent: Mat4, buffers: &[gltf::buffer::Data], out: &mut Vec<ModelMesh>) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let mut positions = Vec::new();
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
            match reader.read_positions() {
                Some(iter) => positions.extend(iter.map(|p| world.transform_point3(Vec3::from_array(p)))),
                None => tracing::debug!(mesh = mesh.index(), "primitive without positions skipped"),
            }
        }
        if !positions.is_empty() {
            let name = mesh
                .name()
                .or_else(|| node.name())
                .map(String::from)
                .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
            out.push(ModelMesh { name, positions });
        }
    }

    for child in node.children() {
        collect(&child, world, buffers, out);
    }
}
