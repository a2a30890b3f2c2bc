//! Legacy three.js JSON model support (format version 3)
//!
//! The legacy format stores flat attribute arrays plus a `faces` stream in
//! which every face starts with a type bitmask announcing which indices follow:
//!
//! | bit | meaning |
//! |-----|---------|
//! | 0 | quad (4 vertex indices instead of 3) |
//! | 1 | material index |
//! | 2 | face uv (carries no payload) |
//! | 3 | one uv index per vertex, per uv layer |
//! | 4 | face normal index |
//! | 5 | one normal index per vertex |
//! | 6 | face color index |
//! | 7 | one color index per vertex |
//!
//! Quads are split into the triangles `(a, b, d)` and `(b, c, d)`.

use crate::error::IoError;
use log::{debug, warn};
use roomcrate_core::{Color, FaceGroup, Material, Point3f, TextureRef, TriangleMesh, Vector3f, WrapMode, UV};
use serde::Deserialize;

type Result<T> = std::result::Result<T, IoError>;

const QUAD: u32 = 1;
const MATERIAL: u32 = 1 << 1;
const FACE_VERTEX_UV: u32 = 1 << 3;
const FACE_NORMAL: u32 = 1 << 4;
const FACE_VERTEX_NORMAL: u32 = 1 << 5;
const FACE_COLOR: u32 = 1 << 6;
const FACE_VERTEX_COLOR: u32 = 1 << 7;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyMetadata {
    pub format_version: Option<f32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub generated_by: Option<String>,
}

/// A material entry as written by the legacy exporters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyMaterial {
    #[serde(rename = "DbgName")]
    pub dbg_name: Option<String>,
    pub color_diffuse: Option<Vec<f32>>,
    pub color_emissive: Option<Vec<f32>>,
    pub map_diffuse: Option<String>,
    pub map_diffuse_wrap: Option<[String; 2]>,
    pub map_diffuse_repeat: Option<[f32; 2]>,
    pub transparent: Option<bool>,
    pub transparency: Option<f32>,
    pub opacity: Option<f32>,
    pub double_sided: Option<bool>,
}

impl LegacyMaterial {
    /// Convert to a standard metallic-roughness material
    pub fn to_material(&self) -> Material {
        let color = self
            .color_diffuse
            .as_deref()
            .and_then(Color::from_slice)
            .unwrap_or(Color::WHITE);
        let mut material = Material::standard(color);
        material.name = self.dbg_name.clone();
        material.emissive = self
            .color_emissive
            .as_deref()
            .and_then(Color::from_slice)
            .unwrap_or(Color::BLACK);
        material.transparent = self.transparent.unwrap_or(false);
        material.opacity = self.transparency.or(self.opacity).unwrap_or(1.0);
        material.double_sided = self.double_sided.unwrap_or(false);
        material.map = self.map_diffuse.as_ref().map(|uri| {
            let mut texture = TextureRef::new(uri.clone());
            if let Some([s, t]) = &self.map_diffuse_wrap {
                texture.wrap_s = WrapMode::from_legacy(s);
                texture.wrap_t = WrapMode::from_legacy(t);
            }
            if let Some(repeat) = self.map_diffuse_repeat {
                texture.repeat = repeat;
            }
            texture
        });
        material
    }
}

/// A parsed legacy model document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyModel {
    pub metadata: Option<LegacyMetadata>,
    pub scale: Option<f32>,
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub colors: Vec<u32>,
    pub uvs: Vec<Vec<f32>>,
    pub faces: Vec<u32>,
    pub materials: Vec<LegacyMaterial>,
}

/// Drop any wrapper text (`var model = ...`, a BOM, a comment) before the JSON
pub fn strip_wrapper(text: &str) -> &str {
    let text = text.trim();
    if text.starts_with('{') {
        return text;
    }
    match text.find('{') {
        Some(start) => &text[start..],
        None => "",
    }
}

/// One triangle after the face stream has been decoded
#[derive(Debug, Clone, PartialEq)]
struct LegacyTriangle {
    indices: [usize; 3],
    material_index: usize,
    uvs: Option<[UV; 3]>,
    normals: Option<[Vector3f; 3]>,
    colors: Option<[u32; 3]>,
}

struct FaceStream<'a> {
    data: &'a [u32],
    offset: usize,
}

impl<'a> FaceStream<'a> {
    fn next(&mut self) -> Result<u32> {
        let value = self.data.get(self.offset).copied().ok_or_else(|| {
            IoError::parse(format!("face data ends unexpectedly at offset {}", self.offset))
        })?;
        self.offset += 1;
        Ok(value)
    }

    fn has_more(&self) -> bool {
        self.offset < self.data.len()
    }
}

impl LegacyModel {
    /// Parse model text, tolerating wrapper text before the JSON object
    pub fn parse_str(text: &str) -> Result<Self> {
        let json = strip_wrapper(text);
        let model: LegacyModel = serde_json::from_str(json)?;

        if let Some(meta) = &model.metadata {
            if let Some(kind) = &meta.kind {
                let kind = kind.to_lowercase();
                if kind == "object" || kind == "scene" {
                    return Err(IoError::InvalidFormat {
                        format: format!("{} document is not a legacy geometry model", kind),
                    });
                }
            }
            if let Some(version) = meta.format_version {
                if version < 3.0 {
                    warn!("legacy model format version {} is older than 3; decoding may be incomplete", version);
                }
            }
        }

        Ok(model)
    }

    /// Number of uv layers that actually carry coordinates
    fn uv_layer_count(&self) -> usize {
        self.uvs.iter().filter(|layer| !layer.is_empty()).count()
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    fn position(&self, index: usize, scale: f32) -> Point3f {
        let i = index * 3;
        Point3f::new(
            self.vertices[i] * scale,
            self.vertices[i + 1] * scale,
            self.vertices[i + 2] * scale,
        )
    }

    fn normal(&self, index: u32, offset: usize) -> Result<Vector3f> {
        let i = index as usize * 3;
        match self.normals.get(i..i + 3) {
            Some(n) => Ok(Vector3f::new(n[0], n[1], n[2])),
            None => Err(IoError::parse(format!("normal index {} out of range at offset {}", index, offset))),
        }
    }

    fn uv(&self, layer: usize, index: u32, offset: usize) -> Result<UV> {
        let i = index as usize * 2;
        match self.uvs[layer].get(i..i + 2) {
            Some(uv) => Ok([uv[0], uv[1]]),
            None => Err(IoError::parse(format!("uv index {} out of range at offset {}", index, offset))),
        }
    }

    fn color(&self, index: u32, offset: usize) -> Result<u32> {
        self.colors
            .get(index as usize)
            .copied()
            .ok_or_else(|| IoError::parse(format!("color index {} out of range at offset {}", index, offset)))
    }

    fn decode_faces(&self) -> Result<Vec<LegacyTriangle>> {
        let vertex_count = self.vertex_count();
        let uv_layers = self.uv_layer_count();
        let mut stream = FaceStream { data: &self.faces, offset: 0 };
        let mut triangles = Vec::new();

        while stream.has_more() {
            let face_offset = stream.offset;
            let kind = stream.next()?;
            let corners = if kind & QUAD != 0 { 4 } else { 3 };

            let mut indices = [0usize; 4];
            for slot in indices.iter_mut().take(corners) {
                let index = stream.next()? as usize;
                if index >= vertex_count {
                    return Err(IoError::parse(format!(
                        "vertex index {} out of range at offset {}",
                        index, face_offset
                    )));
                }
                *slot = index;
            }

            let material_index = if kind & MATERIAL != 0 { stream.next()? as usize } else { 0 };

            let mut uvs: Option<[UV; 4]> = None;
            if kind & FACE_VERTEX_UV != 0 {
                for layer in 0..uv_layers {
                    let mut layer_uvs = [[0.0; 2]; 4];
                    for uv in layer_uvs.iter_mut().take(corners) {
                        let index = stream.next()?;
                        *uv = self.uv(layer, index, face_offset)?;
                    }
                    // only the first layer is exported
                    if layer == 0 {
                        uvs = Some(layer_uvs);
                    }
                }
            }

            // the stored face normal is read past but replaced by the computed one
            if kind & FACE_NORMAL != 0 {
                let index = stream.next()?;
                self.normal(index, face_offset)?;
            }

            let mut normals: Option<[Vector3f; 4]> = None;
            if kind & FACE_VERTEX_NORMAL != 0 {
                let mut vertex_normals = [Vector3f::zeros(); 4];
                for normal in vertex_normals.iter_mut().take(corners) {
                    let index = stream.next()?;
                    *normal = self.normal(index, face_offset)?;
                }
                normals = Some(vertex_normals);
            }

            let mut colors: Option<[u32; 4]> = None;
            if kind & FACE_COLOR != 0 {
                let color = self.color(stream.next()?, face_offset)?;
                colors = Some([color; 4]);
            }
            if kind & FACE_VERTEX_COLOR != 0 {
                let mut vertex_colors = [0u32; 4];
                for color in vertex_colors.iter_mut().take(corners) {
                    *color = self.color(stream.next()?, face_offset)?;
                }
                colors = Some(vertex_colors);
            }

            let splits: &[[usize; 3]] = if corners == 4 { &[[0, 1, 3], [1, 2, 3]] } else { &[[0, 1, 2]] };
            for &corner in splits {
                triangles.push(LegacyTriangle {
                    indices: corner.map(|c| indices[c]),
                    material_index,
                    uvs: uvs.map(|uv| corner.map(|c| uv[c])),
                    normals: normals.map(|n| corner.map(|c| n[c])),
                    colors: colors.map(|col| corner.map(|c| col[c])),
                });
            }
        }

        Ok(triangles)
    }

    /// Expand the model into a non-indexed triangle mesh.
    ///
    /// Every triangle gets three fresh vertices. Triangles without per-vertex
    /// normals use their computed face normal; colors are only emitted when some
    /// face carries them; uvs come from the first uv layer.
    pub fn to_mesh(&self) -> Result<TriangleMesh> {
        if self.vertices.len() % 3 != 0 {
            return Err(IoError::parse(format!(
                "vertex array length {} is not a multiple of 3",
                self.vertices.len()
            )));
        }

        let scale = match self.scale {
            Some(s) if s != 0.0 => 1.0 / s,
            _ => 1.0,
        };
        let triangles = self.decode_faces()?;
        debug!(
            "decoded {} triangles from {} legacy vertices",
            triangles.len(),
            self.vertex_count()
        );

        let has_uvs = triangles.iter().any(|t| t.uvs.is_some());
        let has_colors = triangles.iter().any(|t| t.colors.is_some());

        let mut mesh = TriangleMesh::new();
        let mut normals = Vec::with_capacity(triangles.len() * 3);
        let mut colors = Vec::new();
        let mut uvs = Vec::new();

        for triangle in &triangles {
            let corners = triangle.indices.map(|i| self.position(i, scale));
            let face_normal = (corners[1] - corners[0])
                .cross(&(corners[2] - corners[0]))
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3f::zeros);

            let base = mesh.vertices.len();
            for (corner, position) in corners.iter().enumerate() {
                mesh.add_vertex(*position);
                normals.push(triangle.normals.map_or(face_normal, |n| n[corner]));
                if has_colors {
                    let hex = triangle.colors.map_or(0xffffff, |c| c[corner]);
                    colors.push(Color::from_hex(hex).to_array());
                }
                if has_uvs {
                    uvs.push(triangle.uvs.map_or([0.0, 0.0], |uv| uv[corner]));
                }
            }
            mesh.add_face([base, base + 1, base + 2]);

            match mesh.groups.last_mut() {
                Some(group) if group.material_index == triangle.material_index => group.count += 1,
                _ => mesh.groups.push(FaceGroup {
                    start: mesh.faces.len() - 1,
                    count: 1,
                    material_index: triangle.material_index,
                }),
            }
        }

        mesh.set_normals(normals);
        if has_colors {
            mesh.set_colors(colors);
        }
        if has_uvs {
            mesh.set_uvs(uvs);
        }
        Ok(mesh)
    }

    /// Converted materials; a model without materials gets one white default
    pub fn to_materials(&self) -> Vec<Material> {
        if self.materials.is_empty() {
            return vec![Material::default()];
        }
        self.materials.iter().map(LegacyMaterial::to_material).collect()
    }
}
