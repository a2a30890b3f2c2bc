//! Triangle mesh data structures and functionality

use crate::point::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default tolerance used when welding vertices
pub const DEFAULT_MERGE_TOLERANCE: f32 = 1e-4;

/// A run of consecutive faces drawn with the same material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceGroup {
    /// Index of the first face in the run
    pub start: usize,
    /// Number of faces in the run
    pub count: usize,
    pub material_index: usize,
}

/// A triangle mesh with optional per-vertex attributes and material groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub colors: Option<Vec<[f32; 3]>>,
    pub uvs: Option<Vec<UV>>,
    /// Material runs over `faces`; empty means one group using material 0
    pub groups: Vec<FaceGroup>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
            colors: None,
            uvs: None,
            groups: Vec::new(),
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            ..Self::new()
        }
    }

    /// Axis-aligned box centred on the origin.
    ///
    /// Every side gets its own four vertices so normals and UVs stay flat,
    /// giving 24 vertices and 12 triangles.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vector3f::new(width / 2.0, height / 2.0, depth / 2.0);
        // (normal, u axis, v axis) with u x v == normal
        let sides = [
            (Vector3f::x(), -Vector3f::z(), Vector3f::y()),
            (-Vector3f::x(), Vector3f::z(), Vector3f::y()),
            (Vector3f::y(), Vector3f::x(), -Vector3f::z()),
            (-Vector3f::y(), Vector3f::x(), Vector3f::z()),
            (Vector3f::z(), Vector3f::x(), Vector3f::y()),
            (-Vector3f::z(), -Vector3f::x(), Vector3f::y()),
        ];

        let mut mesh = Self::new();
        let mut normals = Vec::with_capacity(24);
        let mut uvs = Vec::with_capacity(24);

        for (normal, u, v) in sides {
            let center = normal.component_mul(&half);
            let u = u.component_mul(&half);
            let v = v.component_mul(&half);
            let base = mesh.vertices.len();

            for (du, dv, uv) in [
                (-1.0, -1.0, [0.0, 0.0]),
                (1.0, -1.0, [1.0, 0.0]),
                (1.0, 1.0, [1.0, 1.0]),
                (-1.0, 1.0, [0.0, 1.0]),
            ] {
                mesh.vertices.push(Point3f::from(center + u * du + v * dv));
                normals.push(normal);
                uvs.push(uv);
            }
            mesh.faces.push([base, base + 1, base + 2]);
            mesh.faces.push([base, base + 2, base + 3]);
        }

        mesh.normals = Some(normals);
        mesh.uvs = Some(uvs);
        mesh
    }

    /// Horizontal plane on the XZ axes facing +Y
    pub fn plane(width: f32, depth: f32) -> Self {
        let (hw, hd) = (width / 2.0, depth / 2.0);
        let mut mesh = Self::from_vertices_and_faces(
            vec![
                Point3f::new(-hw, 0.0, hd),
                Point3f::new(hw, 0.0, hd),
                Point3f::new(hw, 0.0, -hd),
                Point3f::new(-hw, 0.0, -hd),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        mesh.normals = Some(vec![Vector3f::y(); 4]);
        mesh.uvs = Some(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        mesh
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Calculate face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];

                let edge1 = v1 - v0;
                let edge2 = v2 - v0;

                edge1.cross(&edge2).try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros)
            })
            .collect()
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Set vertex colors
    pub fn set_colors(&mut self, colors: Vec<[f32; 3]>) {
        if colors.len() == self.vertices.len() {
            self.colors = Some(colors);
        }
    }

    /// Set texture coordinates
    pub fn set_uvs(&mut self, uvs: Vec<UV>) {
        if uvs.len() == self.vertices.len() {
            self.uvs = Some(uvs);
        }
    }

    /// Face groups, falling back to a single group over all faces
    pub fn effective_groups(&self) -> Vec<FaceGroup> {
        if self.groups.is_empty() {
            vec![FaceGroup {
                start: 0,
                count: self.faces.len(),
                material_index: 0,
            }]
        } else {
            self.groups.clone()
        }
    }

    /// Highest material index referenced by any group
    pub fn material_slots(&self) -> usize {
        self.effective_groups()
            .iter()
            .map(|g| g.material_index + 1)
            .max()
            .unwrap_or(1)
    }

    /// Append another mesh, drawing all of its faces with `material_index`.
    ///
    /// Attributes missing on one side are filled with neutral defaults when the
    /// other side has them.
    pub fn append(&mut self, other: &TriangleMesh, material_index: usize) {
        let offset = self.vertices.len();
        let face_start = self.faces.len();
        let ours = self.vertices.len();
        let theirs = other.vertices.len();

        if !self.faces.is_empty() && self.groups.is_empty() {
            self.groups.push(FaceGroup {
                start: 0,
                count: self.faces.len(),
                material_index: 0,
            });
        }

        self.normals = merge_attribute(
            self.normals.take(),
            other.normals.as_ref(),
            ours,
            theirs,
            Vector3f::y(),
        );
        self.colors = merge_attribute(self.colors.take(), other.colors.as_ref(), ours, theirs, [1.0; 3]);
        self.uvs = merge_attribute(self.uvs.take(), other.uvs.as_ref(), ours, theirs, [0.0; 2]);

        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );

        match self.groups.last_mut() {
            Some(last) if last.material_index == material_index && last.start + last.count == face_start => {
                last.count += other.faces.len();
            }
            _ => self.groups.push(FaceGroup {
                start: face_start,
                count: other.faces.len(),
                material_index,
            }),
        }
    }

    /// Weld vertices whose attributes agree within `tolerance`.
    ///
    /// Position, normal, color and UV are all part of the key, so seams stay
    /// intact. The first vertex of every cluster is kept verbatim and face order
    /// (and therefore every group) is unchanged. The result never has more
    /// vertices than the input.
    pub fn merge_vertices(&self, tolerance: f32) -> TriangleMesh {
        let scale = if tolerance > 0.0 { 1.0 / tolerance } else { 1.0 / DEFAULT_MERGE_TOLERANCE };
        let quantize = |v: f32| (v * scale).round() as i64;

        let mut lookup: HashMap<Vec<i64>, usize> = HashMap::with_capacity(self.vertices.len());
        let mut remap = Vec::with_capacity(self.vertices.len());
        let mut merged = TriangleMesh::new();
        let mut normals = self.normals.as_ref().map(|_| Vec::new());
        let mut colors = self.colors.as_ref().map(|_| Vec::new());
        let mut uvs = self.uvs.as_ref().map(|_| Vec::new());

        for (i, vertex) in self.vertices.iter().enumerate() {
            let mut key: Vec<i64> = vertex.coords.iter().map(|&c| quantize(c)).collect();
            if let Some(n) = &self.normals {
                key.extend(n[i].iter().map(|&c| quantize(c)));
            }
            if let Some(c) = &self.colors {
                key.extend(c[i].iter().map(|&c| quantize(c)));
            }
            if let Some(uv) = &self.uvs {
                key.extend(uv[i].iter().map(|&c| quantize(c)));
            }

            let index = *lookup.entry(key).or_insert_with(|| {
                if let (Some(out), Some(src)) = (normals.as_mut(), &self.normals) {
                    out.push(src[i]);
                }
                if let (Some(out), Some(src)) = (colors.as_mut(), &self.colors) {
                    out.push(src[i]);
                }
                if let (Some(out), Some(src)) = (uvs.as_mut(), &self.uvs) {
                    out.push(src[i]);
                }
                merged.add_vertex(*vertex)
            });
            remap.push(index);
        }

        merged.faces = self
            .faces
            .iter()
            .map(|f| [remap[f[0]], remap[f[1]], remap[f[2]]])
            .collect();
        merged.normals = normals;
        merged.colors = colors;
        merged.uvs = uvs;
        merged.groups = self.groups.clone();
        merged
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.normals = None;
        self.colors = None;
        self.uvs = None;
        self.groups.clear();
    }
}

fn merge_attribute<T: Copy>(
    ours: Option<Vec<T>>,
    theirs: Option<&Vec<T>>,
    our_len: usize,
    their_len: usize,
    fill: T,
) -> Option<Vec<T>> {
    match (ours, theirs) {
        (None, None) => None,
        (Some(mut a), Some(b)) => {
            a.extend_from_slice(b);
            Some(a)
        }
        (Some(mut a), None) => {
            a.extend(std::iter::repeat(fill).take(their_len));
            Some(a)
        }
        (None, Some(b)) => {
            let mut a = vec![fill; our_len];
            a.extend_from_slice(b);
            Some(a)
        }
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cuboid_shape() {
        let mesh = TriangleMesh::cuboid(2.0, 4.0, 6.0);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.face_count(), 12);

        // winding agrees with the stored normals
        let face_normals = mesh.calculate_face_normals();
        let normals = mesh.normals.as_ref().unwrap();
        for (face, computed) in mesh.faces.iter().zip(&face_normals) {
            assert_relative_eq!(normals[face[0]], *computed, epsilon = 1e-6);
        }

        let max_y = mesh.vertices.iter().map(|v| v.y).fold(f32::MIN, f32::max);
        let min_z = mesh.vertices.iter().map(|v| v.z).fold(f32::MAX, f32::min);
        assert_relative_eq!(max_y, 2.0);
        assert_relative_eq!(min_z, -3.0);
    }

    #[test]
    fn test_merge_keeps_seams() {
        let cube = TriangleMesh::cuboid(1.0, 1.0, 1.0);
        // distinct normals per side: nothing welds
        assert_eq!(cube.merge_vertices(DEFAULT_MERGE_TOLERANCE).vertex_count(), 24);

        let mut bare = cube.clone();
        bare.normals = None;
        bare.uvs = None;
        let welded = bare.merge_vertices(DEFAULT_MERGE_TOLERANCE);
        assert_eq!(welded.vertex_count(), 8);
        assert_eq!(welded.face_count(), 12);
    }

    #[test]
    fn test_merge_within_tolerance() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(1.00001, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [3, 5, 4]],
        );
        let merged = mesh.merge_vertices(1e-4);
        assert_eq!(merged.vertex_count(), 4);
        assert_eq!(merged.faces[1], [1, 3, 2]);
    }

    #[test]
    fn test_append_tracks_groups() {
        let mut mesh = TriangleMesh::new();
        mesh.append(&TriangleMesh::cuboid(1.0, 1.0, 1.0), 0);
        mesh.append(&TriangleMesh::cuboid(1.0, 1.0, 1.0), 0);
        mesh.append(&TriangleMesh::plane(1.0, 1.0), 2);

        assert_eq!(mesh.vertex_count(), 52);
        assert_eq!(mesh.groups.len(), 2);
        assert_eq!(mesh.groups[0], FaceGroup { start: 0, count: 24, material_index: 0 });
        assert_eq!(mesh.groups[1], FaceGroup { start: 24, count: 2, material_index: 2 });
        assert_eq!(mesh.material_slots(), 3);
        assert_eq!(mesh.faces[24], [48, 49, 50]);
    }
}
