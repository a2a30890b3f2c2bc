//! Conversion pipeline tests, from legacy model text to a written glTF file

use crate::{
    convert::{convert_file, convert_str, output_path_for, ConvertOptions, UNTEXTURED_COLOR},
    gltf::GltfDocument,
    IoError,
};
use roomcrate_core::Color;
use std::path::Path;

/// Unit cube as six plain quads
fn cube_model() -> String {
    r#"{
        "metadata": { "formatVersion": 3, "generatedBy": "test" },
        "vertices": [
            0,0,0, 1,0,0, 1,1,0, 0,1,0,
            0,0,1, 1,0,1, 1,1,1, 0,1,1
        ],
        "faces": [
            1, 0,3,2,1,
            1, 4,5,6,7,
            1, 0,1,5,4,
            1, 3,7,6,2,
            1, 0,4,7,3,
            1, 1,2,6,5
        ]
    }"#
    .to_string()
}

/// Two textured materials whose image files do not exist
fn textured_model() -> &'static str {
    r#"var model = {
        "metadata": { "formatVersion": 3.1 },
        "scale": 1.0,
        "vertices": [0,0,0, 1,0,0, 1,1,0, 0,1,0],
        "uvs": [[0,0, 1,0, 1,1, 0,1]],
        "faces": [
            11, 0,1,2,3, 0, 0,1,2,3,
            11, 3,2,1,0, 1, 3,2,1,0
        ],
        "materials": [
            { "DbgName": "wood", "colorDiffuse": [0.6, 0.4, 0.2], "mapDiffuse": "wood.jpg", "mapDiffuseWrap": ["repeat", "repeat"] },
            { "DbgName": "fabric", "mapDiffuse": "fabric.png" }
        ]
    };"#
}

#[test]
fn test_optimize_never_adds_vertices() {
    let text = cube_model();
    let plain = convert_str(&text, Path::new("."), Some("cube"), &ConvertOptions::default()).unwrap();
    let merged = convert_str(&text, Path::new("."), Some("cube"), &ConvertOptions::optimized()).unwrap();

    assert_eq!(plain.face_count, 12);
    assert_eq!(plain.vertex_count, 36);
    assert_eq!(merged.face_count, 12);
    // flat normals keep the faces apart: four corners per side
    assert_eq!(merged.vertex_count, 24);
    assert!(merged.vertex_count <= plain.vertex_count);
    assert_eq!(merged.document.vertex_count(), merged.vertex_count);
}

#[test]
fn test_missing_textures_warn_once_each() {
    let dir = tempfile::tempdir().unwrap();
    let conversion = convert_str(textured_model(), dir.path(), None, &ConvertOptions::default()).unwrap();

    assert_eq!(conversion.warnings.len(), 2);
    assert!(conversion.warnings[0].contains("wood.jpg"));
    assert!(conversion.warnings[1].contains("fabric.png"));

    // each missing image is replaced by a blank 1x1 and stays bound to its material
    let doc = &conversion.document;
    assert_eq!(doc.materials.len(), 2);
    assert_eq!(doc.textures.len(), 2);
    assert_eq!(doc.images[0].name.as_deref(), Some("wood.jpg"));
    assert!(doc.images[1].uri.as_deref().unwrap().starts_with("data:image/png;base64,"));
    let bound: Vec<Option<usize>> = doc
        .materials
        .iter()
        .map(|m| m.pbr_metallic_roughness.base_color_texture.as_ref().map(|t| t.index))
        .collect();
    assert_eq!(bound, vec![Some(0), Some(1)]);
    assert_eq!(doc.meshes[0].primitives.len(), 2);
    assert!(doc.embedded_buffer().is_some());
}

#[test]
fn test_present_texture_is_embedded() {
    let dir = tempfile::tempdir().unwrap();
    image::RgbImage::from_pixel(2, 2, image::Rgb([200, 100, 50]))
        .save(dir.path().join("wood.jpg"))
        .unwrap();

    let conversion = convert_str(textured_model(), dir.path(), None, &ConvertOptions::default()).unwrap();
    assert_eq!(conversion.warnings.len(), 1);

    let doc = &conversion.document;
    assert_eq!(doc.textures.len(), 2);
    assert_eq!(doc.samplers[0].wrap_s, 10497);
    assert!(doc.images[0].uri.as_deref().unwrap().starts_with("data:image/png;base64,"));
    let wood = &doc.materials[0];
    assert_eq!(wood.name.as_deref(), Some("wood"));
    assert_eq!(wood.pbr_metallic_roughness.base_color_texture.as_ref().map(|t| t.index), Some(0));
}

#[test]
fn test_model_without_faces_converts_to_empty_scene() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.js");
    std::fs::write(&input, r#"{ "metadata": { "formatVersion": 3 }, "vertices": [0,0,0], "faces": [] }"#).unwrap();

    let report = convert_file(&input, &ConvertOptions::default()).unwrap();
    assert_eq!(report.face_count, 0);

    let doc = GltfDocument::from_path(&report.output).unwrap();
    assert!(doc.meshes.is_empty());
    assert_eq!(doc.nodes.len(), 1);
    assert_eq!(doc.nodes[0].name.as_deref(), Some("empty"));
    assert_eq!(doc.nodes[0].mesh, None);
    assert_eq!(doc.scenes[0].nodes, vec![0]);
    assert_eq!(doc.vertex_count(), 0);
}

#[test]
fn test_no_textures_uses_single_grey_material() {
    let options = ConvertOptions::default().without_textures();
    let conversion = convert_str(textured_model(), Path::new("."), None, &options).unwrap();

    assert!(conversion.warnings.is_empty());
    assert_eq!(conversion.material_count, 1);
    let doc = &conversion.document;
    assert_eq!(doc.materials.len(), 1);
    let grey = Color::from_hex(UNTEXTURED_COLOR);
    assert_eq!(doc.materials[0].pbr_metallic_roughness.base_color_factor, [grey.r, grey.g, grey.b, 1.0]);
    assert!(doc.meshes[0].primitives.iter().all(|p| p.material == Some(0)));
}

#[test]
fn test_convert_file_writes_sibling_gltf() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cube.js");
    std::fs::write(&input, cube_model()).unwrap();

    let report = convert_file(&input, &ConvertOptions::optimized()).unwrap();
    assert_eq!(report.output, dir.path().join("cube.gltf"));
    assert_eq!(report.output, output_path_for(&input));
    assert!(report.warnings.is_empty());

    let doc = GltfDocument::from_path(&report.output).unwrap();
    assert_eq!(doc.asset.version, "2.0");
    assert_eq!(doc.nodes[0].name.as_deref(), Some("cube"));
    assert_eq!(doc.vertex_count(), report.vertex_count);
}

#[test]
fn test_bad_inputs_fail_without_output() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("nothing.js");
    assert!(matches!(
        convert_file(&missing, &ConvertOptions::default()),
        Err(IoError::FileNotFound { .. })
    ));

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "this is not json").unwrap();
    assert!(convert_file(&garbage, &ConvertOptions::default()).is_err());
    assert!(!output_path_for(&garbage).exists());
}
