use std::{path::PathBuf, sync::Arc};

use cgmath::Matrix4;

use room_viewer::data_structures::{
    instance::Instance,
    model::{MeshData, ModelData, ModelNode},
    primitives::Shape,
};

pub const EPSILON: f32 = 1e-4;

pub fn assert_close(actual: f32, expected: f32, what: &str) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "{what}: expected {expected}, got {actual}"
    );
}

/// A model with one box mesh of the given size, hanging under a node at `offset`.
///
/// The offset makes the model's origin deliberately not coincide with its geometry.
pub fn box_model(source: &str, size: [f32; 3], offset: [f32; 3]) -> ModelData {
    let mesh = Shape::Box {
        width: size[0],
        height: size[1],
        depth: size[2],
    }
    .mesh();
    ModelData {
        source: source.to_string(),
        materials: Vec::new(),
        roots: vec![ModelNode {
            name: Some("root".to_string()),
            local: Instance::at(offset[0], offset[1], offset[2]).to_matrix(),
            meshes: vec![Arc::new(MeshData {
                name: "box".to_string(),
                ..mesh
            })],
            children: Vec::new(),
        }],
    }
}

/// A box mesh of `size` under a `child` node, itself under a `root` node.
pub fn nested_box_model(
    source: &str,
    root: Matrix4<f32>,
    child: Matrix4<f32>,
    size: [f32; 3],
) -> ModelData {
    let mesh = Shape::Box {
        width: size[0],
        height: size[1],
        depth: size[2],
    }
    .mesh();
    ModelData {
        source: source.to_string(),
        materials: Vec::new(),
        roots: vec![ModelNode {
            name: Some("root".to_string()),
            local: root,
            meshes: Vec::new(),
            children: vec![ModelNode {
                name: Some("child".to_string()),
                local: child,
                meshes: vec![Arc::new(mesh)],
                children: Vec::new(),
            }],
        }],
    }
}

/// Material factors written into test glTF files.
pub struct TestMaterial {
    pub base_colour: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
}

/// Vertices and indices of a unit cube spanning -1..1 on every axis.
pub fn cube() -> (Vec<[f32; 3]>, Vec<u32>) {
    let positions = vec![
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
    ];
    let indices = vec![
        0, 2, 1, 0, 3, 2, // back
        4, 5, 6, 4, 6, 7, // front
        0, 1, 5, 0, 5, 4, // bottom
        3, 7, 6, 3, 6, 2, // top
        0, 4, 7, 0, 7, 3, // left
        1, 2, 6, 1, 6, 5, // right
    ];
    (positions, indices)
}

/// Binary buffer holding positions followed by indices, plus the glTF JSON describing it.
///
/// `buffer_uri` is `None` for a GLB binary chunk.
fn gltf_json(
    positions: &[[f32; 3]],
    indices: &[u32],
    translation: [f32; 3],
    scale: f32,
    material: &TestMaterial,
    buffer_uri: Option<&str>,
) -> (String, Vec<u8>) {
    let mut bin: Vec<u8> = Vec::new();
    for p in positions {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    let positions_len = bin.len();
    for i in indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let indices_len = bin.len() - positions_len;

    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for p in positions {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }

    let uri = buffer_uri
        .map(|uri| format!(r#""uri": "{uri}", "#))
        .unwrap_or_default();
    let [r, g, b, a] = material.base_colour;
    let json = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "name": "cube", "mesh": 0, "translation": [{tx}, {ty}, {tz}], "scale": [{scale}, {scale}, {scale}] }}],
  "meshes": [{{ "name": "cube", "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "material": 0 }}] }}],
  "materials": [{{ "pbrMetallicRoughness": {{ "baseColorFactor": [{r}, {g}, {b}, {a}], "metallicFactor": {metallic}, "roughnessFactor": {roughness} }} }}],
  "buffers": [{{ {uri}"byteLength": {total} }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": {positions_len}, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": {positions_len}, "byteLength": {indices_len}, "target": 34963 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": {count}, "type": "VEC3", "min": [{min0}, {min1}, {min2}], "max": [{max0}, {max1}, {max2}] }},
    {{ "bufferView": 1, "componentType": 5125, "count": {index_count}, "type": "SCALAR" }}
  ]
}}"#,
        tx = translation[0],
        ty = translation[1],
        tz = translation[2],
        metallic = material.metallic,
        roughness = material.roughness,
        total = bin.len(),
        count = positions.len(),
        index_count = indices.len(),
        min0 = min[0],
        min1 = min[1],
        min2 = min[2],
        max0 = max[0],
        max1 = max[1],
        max2 = max[2],
    );
    (json, bin)
}

/// A binary glTF (GLB) file with a single cube mesh under one node.
pub fn cube_glb(translation: [f32; 3], scale: f32, material: &TestMaterial) -> Vec<u8> {
    let (positions, indices) = cube();
    let (json, mut bin) = gltf_json(&positions, &indices, translation, scale, material, None);

    let mut json = json.into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

/// A `.gltf` JSON file referencing an external buffer at `buffer_uri`, and that buffer.
pub fn cube_gltf(buffer_uri: &str, material: &TestMaterial) -> (String, Vec<u8>) {
    let (positions, indices) = cube();
    gltf_json(&positions, &indices, [0.0, 0.0, 0.0], 1.0, material, Some(buffer_uri))
}

/// A fresh, empty directory under the system temp dir.
pub fn temp_assets(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("room-viewer-{name}-{}", std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("failed to clear temp dir");
    }
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}
