//! glTF 2.0 export
//!
//! Produces the JSON flavour of glTF (`.gltf`) with every buffer and image
//! embedded as a base64 data URI, so the output is a single self-contained file.

use crate::error::IoError;
use crate::texture::LoadedTexture;
use base64::Engine;
use roomcrate_core::{Drawable, Material, Transform3D, TriangleMesh, WrapMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

type Result<T> = std::result::Result<T, IoError>;

pub const COMPONENT_UNSIGNED_SHORT: u32 = 5123;
pub const COMPONENT_UNSIGNED_INT: u32 = 5125;
pub const COMPONENT_FLOAT: u32 = 5126;

pub const TARGET_ARRAY_BUFFER: u32 = 34962;
pub const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

const FILTER_LINEAR: u32 = 9729;
const FILTER_LINEAR_MIPMAP_LINEAR: u32 = 9987;

const BUFFER_URI_PREFIX: &str = "data:application/octet-stream;base64,";
const PNG_URI_PREFIX: &str = "data:image/png;base64,";

/// glTF sampler wrap constant for a wrap mode
pub fn wrap_code(mode: WrapMode) -> u32 {
    match mode {
        WrapMode::Repeat => 10497,
        WrapMode::MirroredRepeat => 33648,
        WrapMode::ClampToEdge => 33071,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            generator: Some(format!("roomcrate-io {}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f32; 16]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub attributes: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureInfo {
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    pub base_color_factor: [f32; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfMaterial {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub pbr_metallic_roughness: PbrMetallicRoughness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissive_factor: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_mode: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub double_sided: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sampler {
    pub mag_filter: u32,
    pub min_filter: u32,
    pub wrap_s: u32,
    pub wrap_t: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    pub buffer_view: usize,
    pub component_type: u32,
    pub count: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    pub byte_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Root glTF JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfDocument {
    pub asset: Asset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenes: Vec<Scene>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<Mesh>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<GltfMaterial>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<Texture>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samplers: Vec<Sampler>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessors: Vec<Accessor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffer_views: Vec<BufferView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<Buffer>,
}

impl GltfDocument {
    /// Read a `.gltf` file back, mostly useful for inspection and tests
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Decode the first embedded buffer
    pub fn embedded_buffer(&self) -> Option<Vec<u8>> {
        let uri = self.buffers.first()?.uri.as_ref()?;
        let payload = uri.strip_prefix(BUFFER_URI_PREFIX)?;
        base64::engine::general_purpose::STANDARD.decode(payload).ok()
    }

    /// Total number of vertices across all meshes, counted once per POSITION accessor
    pub fn vertex_count(&self) -> usize {
        let mut seen = std::collections::BTreeSet::new();
        self.meshes
            .iter()
            .flat_map(|m| &m.primitives)
            .filter_map(|p| p.attributes.get("POSITION"))
            .filter(|index| seen.insert(**index))
            .filter_map(|index| self.accessors.get(*index))
            .map(|a| a.count)
            .sum()
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| IoError::WriteError { message: e.to_string() })
    }
}

/// Write a document as a `.gltf` file
pub fn write_gltf<P: AsRef<Path>>(document: &GltfDocument, path: P) -> Result<()> {
    let json = document.to_json()?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Incrementally builds a glTF document backed by a single embedded buffer
#[derive(Debug, Default)]
pub struct GltfExporter {
    document: GltfDocument,
    buffer: Vec<u8>,
    scene_nodes: Vec<usize>,
}

impl GltfExporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_view(&mut self, bytes: &[u8], target: u32) -> usize {
        while self.buffer.len() % 4 != 0 {
            self.buffer.push(0);
        }
        let view = BufferView {
            buffer: 0,
            byte_offset: self.buffer.len(),
            byte_length: bytes.len(),
            target: Some(target),
        };
        self.buffer.extend_from_slice(bytes);
        self.document.buffer_views.push(view);
        self.document.buffer_views.len() - 1
    }

    fn push_float_accessor(&mut self, values: &[f32], kind: &str, count: usize, bounds: Option<(Vec<f32>, Vec<f32>)>) -> usize {
        let view = self.push_view(bytemuck::cast_slice(values), TARGET_ARRAY_BUFFER);
        let (min, max) = match bounds {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };
        self.document.accessors.push(Accessor {
            buffer_view: view,
            component_type: COMPONENT_FLOAT,
            count,
            kind: kind.to_string(),
            min,
            max,
        });
        self.document.accessors.len() - 1
    }

    fn push_index_accessor(&mut self, indices: &[usize], vertex_count: usize) -> usize {
        let (view, component_type) = if vertex_count <= u16::MAX as usize {
            let packed: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
            (self.push_view(bytemuck::cast_slice(&packed), TARGET_ELEMENT_ARRAY_BUFFER), COMPONENT_UNSIGNED_SHORT)
        } else {
            let packed: Vec<u32> = indices.iter().map(|&i| i as u32).collect();
            (self.push_view(bytemuck::cast_slice(&packed), TARGET_ELEMENT_ARRAY_BUFFER), COMPONENT_UNSIGNED_INT)
        };
        self.document.accessors.push(Accessor {
            buffer_view: view,
            component_type,
            count: indices.len(),
            kind: "SCALAR".to_string(),
            min: None,
            max: None,
        });
        self.document.accessors.len() - 1
    }

    /// Embed an image with its own sampler and return the texture index
    pub fn add_texture(&mut self, texture: &LoadedTexture) -> usize {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&texture.png);
        self.document.images.push(Image {
            name: Some(texture.uri.clone()),
            uri: Some(format!("{}{}", PNG_URI_PREFIX, encoded)),
            mime_type: None,
        });
        self.document.samplers.push(Sampler {
            mag_filter: FILTER_LINEAR,
            min_filter: FILTER_LINEAR_MIPMAP_LINEAR,
            wrap_s: wrap_code(texture.wrap_s),
            wrap_t: wrap_code(texture.wrap_t),
        });
        self.document.textures.push(Texture {
            sampler: Some(self.document.samplers.len() - 1),
            source: Some(self.document.images.len() - 1),
        });
        self.document.textures.len() - 1
    }

    /// Add a material, optionally bound to a texture added earlier
    pub fn add_material(&mut self, material: &Material, texture: Option<usize>) -> usize {
        let emissive = material.emissive.to_array();
        self.document.materials.push(GltfMaterial {
            name: material.name.clone(),
            pbr_metallic_roughness: PbrMetallicRoughness {
                base_color_factor: [material.color.r, material.color.g, material.color.b, material.opacity],
                base_color_texture: texture.map(|index| TextureInfo { index }),
                metallic_factor: material.metalness,
                roughness_factor: material.roughness,
            },
            emissive_factor: if emissive == [0.0; 3] { None } else { Some(emissive) },
            alpha_mode: material.transparent.then(|| "BLEND".to_string()),
            double_sided: material.double_sided,
        });
        self.document.materials.len() - 1
    }

    /// Add a mesh with one primitive per face group.
    ///
    /// `materials` maps the mesh's group material indices onto material indices
    /// already added to this exporter. Groups pointing past the end fall back to
    /// the first entry.
    pub fn add_mesh(&mut self, name: Option<&str>, mesh: &TriangleMesh, materials: &[usize]) -> Result<usize> {
        if mesh.is_empty() {
            return Err(IoError::WriteError {
                message: "cannot export a mesh without faces".to_string(),
            });
        }
        let vertex_count = mesh.vertex_count();
        if let Some(face) = mesh.faces.iter().find(|f| f.iter().any(|&i| i >= vertex_count)) {
            return Err(IoError::WriteError {
                message: format!("face {:?} references a missing vertex", face),
            });
        }

        let mut attributes = BTreeMap::new();

        let positions: Vec<f32> = mesh.vertices.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        let (min, max) = mesh.bounding_box();
        let position = self.push_float_accessor(
            &positions,
            "VEC3",
            vertex_count,
            Some((vec![min.x, min.y, min.z], vec![max.x, max.y, max.z])),
        );
        attributes.insert("POSITION".to_string(), position);

        if let Some(normals) = &mesh.normals {
            let values: Vec<f32> = normals.iter().flat_map(|n| [n.x, n.y, n.z]).collect();
            let index = self.push_float_accessor(&values, "VEC3", vertex_count, None);
            attributes.insert("NORMAL".to_string(), index);
        }
        if let Some(colors) = &mesh.colors {
            let values: Vec<f32> = colors.iter().flatten().copied().collect();
            let index = self.push_float_accessor(&values, "VEC3", vertex_count, None);
            attributes.insert("COLOR_0".to_string(), index);
        }
        if let Some(uvs) = &mesh.uvs {
            let values: Vec<f32> = uvs.iter().flatten().copied().collect();
            let index = self.push_float_accessor(&values, "VEC2", vertex_count, None);
            attributes.insert("TEXCOORD_0".to_string(), index);
        }

        let mut primitives = Vec::new();
        for group in mesh.effective_groups() {
            let end = (group.start + group.count).min(mesh.faces.len());
            if group.start >= end {
                continue;
            }
            let indices: Vec<usize> = mesh.faces[group.start..end].iter().flatten().copied().collect();
            let accessor = self.push_index_accessor(&indices, vertex_count);
            primitives.push(Primitive {
                attributes: attributes.clone(),
                indices: Some(accessor),
                material: materials.get(group.material_index).or(materials.first()).copied(),
            });
        }

        self.document.meshes.push(Mesh {
            name: name.map(str::to_string),
            primitives,
        });
        Ok(self.document.meshes.len() - 1)
    }

    /// Add a root node to the default scene
    pub fn add_node(&mut self, name: Option<&str>, mesh: Option<usize>, transform: Option<&Transform3D>) -> usize {
        let matrix = transform.filter(|t| !t.is_identity(1e-6)).map(|t| {
            let mut m = [0.0f32; 16];
            // glTF matrices are column-major, as nalgebra stores them
            m.copy_from_slice(t.matrix.as_slice());
            m
        });
        self.document.nodes.push(Node {
            name: name.map(str::to_string),
            mesh,
            matrix,
        });
        let index = self.document.nodes.len() - 1;
        self.scene_nodes.push(index);
        index
    }

    /// Embed the buffer and return the finished document
    pub fn finish(mut self) -> GltfDocument {
        if !self.buffer.is_empty() {
            while self.buffer.len() % 4 != 0 {
                self.buffer.push(0);
            }
            let encoded = base64::engine::general_purpose::STANDARD.encode(&self.buffer);
            self.document.buffers.push(Buffer {
                byte_length: self.buffer.len(),
                uri: Some(format!("{}{}", BUFFER_URI_PREFIX, encoded)),
            });
        }
        self.document.scenes.push(Scene { nodes: self.scene_nodes });
        self.document.scene = Some(0);
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomcrate_core::{Color, FaceGroup, Point3f, Vector3f};

    fn two_material_quad() -> TriangleMesh {
        let mut mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        mesh.set_normals(vec![Vector3f::z(); 4]);
        mesh.groups = vec![
            FaceGroup { start: 0, count: 1, material_index: 0 },
            FaceGroup { start: 1, count: 1, material_index: 1 },
        ];
        mesh
    }

    #[test]
    fn test_mesh_export_layout() {
        let mut exporter = GltfExporter::new();
        let red = exporter.add_material(&Material::standard(Color::from_hex(0xff0000)), None);
        let glass = exporter.add_material(&Material::standard(Color::WHITE).with_opacity(0.5), None);
        let mesh = exporter.add_mesh(Some("quad"), &two_material_quad(), &[red, glass]).unwrap();
        exporter.add_node(Some("quad"), Some(mesh), None);
        let doc = exporter.finish();

        assert_eq!(doc.asset.version, "2.0");
        assert_eq!(doc.scene, Some(0));
        assert_eq!(doc.scenes[0].nodes, vec![0]);
        assert_eq!(doc.meshes[0].primitives.len(), 2);
        assert_eq!(doc.meshes[0].primitives[1].material, Some(glass));
        assert_eq!(doc.materials[1].alpha_mode.as_deref(), Some("BLEND"));
        assert_eq!(doc.materials[1].pbr_metallic_roughness.base_color_factor[3], 0.5);
        assert!(doc.materials[0].alpha_mode.is_none());

        let position = &doc.accessors[doc.meshes[0].primitives[0].attributes["POSITION"]];
        assert_eq!(position.count, 4);
        assert_eq!(position.max.as_deref(), Some(&[1.0, 1.0, 0.0][..]));
        assert_eq!(doc.vertex_count(), 4);

        let indices = &doc.accessors[doc.meshes[0].primitives[0].indices.unwrap()];
        assert_eq!(indices.component_type, COMPONENT_UNSIGNED_SHORT);
        assert_eq!(indices.count, 3);

        let buffer = doc.embedded_buffer().unwrap();
        assert_eq!(buffer.len(), doc.buffers[0].byte_length);
        for view in &doc.buffer_views {
            assert_eq!(view.byte_offset % 4, 0);
            assert!(view.byte_offset + view.byte_length <= buffer.len());
        }
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let mut exporter = GltfExporter::new();
        let material = exporter.add_material(&Material::default(), None);
        let mesh = exporter.add_mesh(None, &TriangleMesh::cuboid(1.0, 1.0, 1.0), &[material]).unwrap();
        exporter.add_node(None, Some(mesh), Some(&Transform3D::translation(Vector3f::new(0.0, 2.0, 0.0))));
        let doc = exporter.finish();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.gltf");
        write_gltf(&doc, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"bufferViews\""));
        assert!(text.contains("\"TEXCOORD_0\""));
        let back = GltfDocument::from_path(&path).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.nodes[0].matrix.unwrap()[13], 2.0);
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mut exporter = GltfExporter::new();
        assert!(exporter.add_mesh(None, &TriangleMesh::new(), &[]).is_err());
    }
}
