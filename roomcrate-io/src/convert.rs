//! Legacy model to glTF conversion pipeline

use crate::error::IoError;
use crate::gltf::{write_gltf, GltfDocument, GltfExporter};
use crate::legacy::LegacyModel;
use crate::texture::load_textures;
use log::{debug, info, warn};
use roomcrate_core::{Color, Material, TextureRef, DEFAULT_MERGE_TOLERANCE};
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, IoError>;

/// Grey used for every face when textures are not exported
pub const UNTEXTURED_COLOR: u32 = 0x888888;

/// Conversion settings
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Weld coincident vertices after expanding the faces
    pub optimize: bool,
    /// Export the model's own materials and textures
    pub keep_textures: bool,
    pub merge_tolerance: f32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            optimize: false,
            keep_textures: true,
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
        }
    }
}

impl ConvertOptions {
    /// Defaults plus vertex welding
    pub fn optimized() -> Self {
        Self {
            optimize: true,
            ..Self::default()
        }
    }

    pub fn without_textures(mut self) -> Self {
        self.keep_textures = false;
        self
    }
}

/// An in-memory conversion result
#[derive(Debug, Clone)]
pub struct Conversion {
    pub document: GltfDocument,
    pub vertex_count: usize,
    pub face_count: usize,
    pub material_count: usize,
    pub warnings: Vec<String>,
}

/// Summary of a conversion written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub vertex_count: usize,
    pub face_count: usize,
    pub material_count: usize,
    pub warnings: Vec<String>,
}

/// `models/chair.js` becomes `models/chair.gltf`
pub fn output_path_for(input: &Path) -> PathBuf {
    input.with_extension("gltf")
}

/// Unique texture references in first-seen order
fn texture_requests(materials: &[Material]) -> Vec<TextureRef> {
    let mut requests: Vec<TextureRef> = Vec::new();
    for map in materials.iter().filter_map(|m| m.map.as_ref()) {
        if !requests.iter().any(|r| r.uri == map.uri) {
            requests.push(map.clone());
        }
    }
    requests
}

/// Convert model text. Texture paths are resolved against `base_dir`.
pub fn convert_str(text: &str, base_dir: &Path, name: Option<&str>, options: &ConvertOptions) -> Result<Conversion> {
    let model = LegacyModel::parse_str(text)?;
    let mut mesh = model.to_mesh()?;
    debug!("expanded {} faces into {} vertices", mesh.face_count(), mesh.vertex_count());

    if options.optimize {
        let before = mesh.vertex_count();
        mesh = mesh.merge_vertices(options.merge_tolerance);
        debug!("merged vertices: {} -> {}", before, mesh.vertex_count());
    }

    let mut exporter = GltfExporter::new();
    let mut warnings = Vec::new();

    let material_indices: Vec<usize> = if options.keep_textures {
        let materials = model.to_materials();
        let requests = texture_requests(&materials);
        let batch = load_textures(base_dir, &requests)?;
        warnings.extend(batch.warnings);

        let texture_indices: Vec<usize> = batch.textures.iter().map(|t| exporter.add_texture(t)).collect();

        materials
            .iter()
            .map(|material| {
                let texture = material
                    .map
                    .as_ref()
                    .and_then(|map| requests.iter().position(|r| r.uri == map.uri))
                    .map(|i| texture_indices[i]);
                exporter.add_material(material, texture)
            })
            .collect()
    } else {
        let grey = Material::standard(Color::from_hex(UNTEXTURED_COLOR));
        vec![exporter.add_material(&grey, None)]
    };

    // a model without faces still converts, to a scene with one empty node
    let mesh_index = if mesh.is_empty() {
        warn!("model has no faces, exporting an empty scene");
        None
    } else {
        Some(exporter.add_mesh(name, &mesh, &material_indices)?)
    };
    exporter.add_node(name, mesh_index, None);

    Ok(Conversion {
        document: exporter.finish(),
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        material_count: material_indices.len(),
        warnings,
    })
}

/// Convert a model file and write `<stem>.gltf` next to it
pub fn convert_file<P: AsRef<Path>>(input: P, options: &ConvertOptions) -> Result<ConversionReport> {
    let input = input.as_ref();
    if !input.is_file() {
        return Err(IoError::FileNotFound {
            path: input.display().to_string(),
        });
    }
    let text = std::fs::read_to_string(input)?;
    let base_dir = input.parent().unwrap_or_else(|| Path::new("."));
    let name = input.file_stem().and_then(|s| s.to_str());

    let conversion = convert_str(&text, base_dir, name, options)?;
    let output = output_path_for(input);
    write_gltf(&conversion.document, &output)?;
    info!(
        "wrote {} ({} vertices, {} faces)",
        output.display(),
        conversion.vertex_count,
        conversion.face_count
    );

    Ok(ConversionReport {
        output,
        vertex_count: conversion.vertex_count,
        face_count: conversion.face_count,
        material_count: conversion.material_count,
        warnings: conversion.warnings,
    })
}
