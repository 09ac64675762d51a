use base64::Engine;
use futures::StreamExt;
use room_viewer::{
    data_structures::scene_graph::SceneGraph,
    placement::Placement,
    resources::{
        AssetSource,
        loader::{self, LoadCompletion, LoadRequest, Loader},
        decode_data_uri, load_model_gltf, resolve_uri,
    },
};

use crate::common::test_utils::{TestMaterial, assert_close, cube_glb, cube_gltf, temp_assets};

mod common;

const RED_METAL: TestMaterial = TestMaterial {
    base_colour: [0.8, 0.1, 0.1, 1.0],
    metallic: 0.25,
    roughness: 0.75,
};

fn source(dir: &std::path::Path) -> AssetSource {
    AssetSource::new(dir.to_string_lossy().into_owned())
}

#[tokio::test]
async fn loads_mesh_bounds_and_material_from_glb() {
    let dir = temp_assets("glb");
    std::fs::write(dir.join("cube.glb"), cube_glb([0.0, 3.0, 0.0], 2.0, &RED_METAL)).unwrap();

    let model = load_model_gltf("cube.glb", &source(&dir)).await.unwrap();

    assert_eq!(model.source, "cube.glb");
    assert_eq!(model.mesh_count(), 1);
    let mut vertices = 0;
    let mut indices = 0;
    model.for_each_mesh(&mut |_, mesh| {
        vertices += mesh.vertices.len();
        indices += mesh.indices.len();
        // the file has no normals, so they were computed
        assert!(mesh.vertices.iter().all(|v| v.normal != [0.0, 0.0, 0.0]));
    });
    assert_eq!(vertices, 8);
    assert_eq!(indices, 36);

    // the node scales the -1..1 cube by 2 and lifts it by 3
    let bounds = model.bounds();
    assert_close(bounds.min.x, -2.0, "min x");
    assert_close(bounds.max.x, 2.0, "max x");
    assert_close(bounds.min.y, 1.0, "min y");
    assert_close(bounds.max.y, 5.0, "max y");

    assert_eq!(model.materials.len(), 1);
    let material = &model.materials[0];
    assert_eq!(material.colour, RED_METAL.base_colour);
    assert_eq!(material.metalness, 0.25);
    assert_eq!(material.roughness, 0.75);
    assert!(material.texture.is_none());
}

#[tokio::test]
async fn loads_gltf_with_external_buffer() {
    let dir = temp_assets("gltf");
    std::fs::create_dir_all(dir.join("Tree")).unwrap();
    let (json, bin) = cube_gltf("cube%20data.bin", &RED_METAL);
    std::fs::write(dir.join("Tree/scene.gltf"), json).unwrap();
    std::fs::write(dir.join("Tree/cube data.bin"), bin).unwrap();

    let model = load_model_gltf("Tree/scene.gltf", &source(&dir)).await.unwrap();
    let size = model.bounds().size();
    assert_close(size.x, 2.0, "width");
    assert_close(size.y, 2.0, "height");
    assert_close(size.z, 2.0, "depth");
}

#[tokio::test]
async fn loads_single_file_gltf_with_embedded_buffer() {
    let dir = temp_assets("embedded");
    let (_, bin) = cube_gltf("unused.bin", &RED_METAL);
    let uri = format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&bin)
    );
    let (json, _) = cube_gltf(&uri, &RED_METAL);
    std::fs::write(dir.join("scene.gltf"), json).unwrap();

    let model = load_model_gltf("scene.gltf", &source(&dir)).await.unwrap();
    assert_eq!(model.mesh_count(), 1);
    let size = model.bounds().size();
    assert_close(size.x, 2.0, "width");
    assert_close(size.y, 2.0, "height");
}

#[tokio::test]
async fn corrupt_embedded_buffer_is_an_error() {
    let dir = temp_assets("embedded-corrupt");
    let (json, _) = cube_gltf("data:application/octet-stream;base64,@@not base64@@", &RED_METAL);
    std::fs::write(dir.join("scene.gltf"), json).unwrap();
    assert!(load_model_gltf("scene.gltf", &source(&dir)).await.is_err());
}

#[test]
fn data_uris_decode_in_place() {
    assert!(decode_data_uri("scene.bin").is_none());
    assert_eq!(
        decode_data_uri("data:application/octet-stream;base64,AAEC/w==")
            .unwrap()
            .unwrap(),
        vec![0, 1, 2, 255]
    );
    assert_eq!(
        decode_data_uri("data:text/plain,hello%20room").unwrap().unwrap(),
        b"hello room".to_vec()
    );
    assert!(decode_data_uri("data:;base64,***").unwrap().is_err());
    assert!(decode_data_uri("data:no-separator").unwrap().is_err());
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let dir = temp_assets("missing");
    let err = load_model_gltf("models/scene.gltf", &source(&dir))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("models/scene.gltf"));
}

#[tokio::test]
async fn missing_external_buffer_is_an_error() {
    let dir = temp_assets("missing-buffer");
    let (json, _) = cube_gltf("scene.bin", &RED_METAL);
    std::fs::write(dir.join("scene.gltf"), json).unwrap();

    let result = load_model_gltf("scene.gltf", &source(&dir)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn garbage_is_not_a_model() {
    let dir = temp_assets("garbage");
    std::fs::write(dir.join("scene.gltf"), b"definitely not gltf").unwrap();
    assert!(load_model_gltf("scene.gltf", &source(&dir)).await.is_err());
}

#[test]
fn uris_resolve_next_to_the_model() {
    assert_eq!(resolve_uri("Tree/scene.gltf", "scene.bin").unwrap(), "Tree/scene.bin");
    assert_eq!(
        resolve_uri("models/scene.gltf", "textures/Material%201_baseColor.png").unwrap(),
        "models/textures/Material 1_baseColor.png"
    );
    assert_eq!(resolve_uri("scene.gltf", "scene.bin").unwrap(), "scene.bin");
    assert!(resolve_uri("scene.gltf", "data:application/octet-stream;base64,AAAA").is_err());
}

#[test]
fn failed_load_adds_nothing() {
    let mut scene = SceneGraph::default();
    let completion = LoadCompletion {
        request: LoadRequest::new("models/scene.gltf", Placement::default()),
        result: Err(anyhow::anyhow!("connection reset")),
    };
    assert_eq!(scene.apply_load(completion), None);
    assert!(scene.is_empty());
}

#[tokio::test]
async fn load_completes_with_its_request() {
    let dir = temp_assets("load");
    std::fs::write(dir.join("cube.glb"), cube_glb([0.0, 0.0, 0.0], 1.0, &RED_METAL)).unwrap();
    let placement = Placement::at(1.0, 0.0, 2.0).with_scale(3.0);

    let completion = loader::load(LoadRequest::new("cube.glb", placement), source(&dir)).await;
    assert_eq!(completion.request.placement, placement);
    assert!(completion.result.is_ok());
}

#[tokio::test]
async fn spawned_loads_are_delivered_to_the_sink() {
    let dir = temp_assets("spawn");
    std::fs::write(dir.join("cube.glb"), cube_glb([0.0, 0.0, 0.0], 1.0, &RED_METAL)).unwrap();

    let loader = Loader::new(tokio::runtime::Handle::current(), source(&dir));
    let (sender, mut receiver) = futures::channel::mpsc::unbounded::<LoadCompletion>();
    loader.spawn(
        LoadRequest::new("cube.glb", Placement::at(4.0, 0.0, 4.0)),
        sender.clone(),
    );
    loader.spawn(
        LoadRequest::new("absent.glb", Placement::default()),
        sender,
    );

    let mut scene = SceneGraph::default();
    let mut delivered = 0;
    while let Some(completion) = receiver.next().await {
        delivered += 1;
        scene.apply_load(completion);
    }

    // every load completes exactly once, only the successful one is added
    assert_eq!(delivered, 2);
    assert_eq!(scene.len(), 1);
    let centre = scene.objects()[0].world_bounds().center();
    assert_close(centre.x, 4.0, "placed x");
    assert_close(centre.z, 4.0, "placed z");
}
