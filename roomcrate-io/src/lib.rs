//! I/O for roomcrate
//!
//! This crate converts legacy three.js JSON models (format 3) into glTF 2.0,
//! exports arbitrary triangle meshes as glTF, and persists room projects in a
//! key/value store.

pub mod error;
pub mod legacy;
pub mod texture;
pub mod gltf;
pub mod convert;
pub mod project;

pub use error::*;
pub use legacy::{LegacyMaterial, LegacyModel, strip_wrapper};
pub use texture::{load_texture, load_textures, LoadedTexture, TextureBatch};
pub use gltf::{write_gltf, GltfDocument, GltfExporter};
pub use convert::{convert_file, convert_str, output_path_for, Conversion, ConversionReport, ConvertOptions};
pub use project::{
    load_project, parse_project, save_project, FileStore, KeyValueStore, MemoryStore, PROJECT_STORAGE_KEY,
};

use roomcrate_core::{Material, Result, TriangleMesh};

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<std::path::Path>>(mesh: &TriangleMesh, materials: &[Material], path: P) -> Result<()>;
}

/// glTF writer for untextured meshes, one material per face group
pub struct GltfWriter;

impl MeshWriter for GltfWriter {
    fn write_mesh<P: AsRef<std::path::Path>>(mesh: &TriangleMesh, materials: &[Material], path: P) -> Result<()> {
        let mut exporter = GltfExporter::new();
        let material_indices: Vec<usize> = if materials.is_empty() {
            vec![exporter.add_material(&Material::default(), None)]
        } else {
            materials.iter().map(|m| exporter.add_material(m, None)).collect()
        };
        let name = path.as_ref().file_stem().and_then(|s| s.to_str()).map(str::to_string);
        let mesh_index = exporter.add_mesh(name.as_deref(), mesh, &material_indices)?;
        exporter.add_node(name.as_deref(), Some(mesh_index), None);
        write_gltf(&exporter.finish(), path)?;
        Ok(())
    }
}

/// Write a mesh, choosing the format from the file extension
pub fn write_mesh<P: AsRef<std::path::Path>>(mesh: &TriangleMesh, materials: &[Material], path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("gltf") => GltfWriter::write_mesh(mesh, materials, path),
        _ => Err(roomcrate_core::Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

#[cfg(test)]
mod tests;
