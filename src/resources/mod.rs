/**
 * This module contains all logic for loading models and textures from external files.
 *
 * Files are read from the asset root: the local filesystem on native targets and
 * the page origin over HTTP on the web.
 */
pub mod loader;

use std::{collections::HashSet, sync::Arc};

use anyhow::{Context, bail};
use base64::Engine;

use crate::{
    config::Config,
    data_structures::{
        material::{Appearance, ImageData},
        model::{MeshData, ModelData, ModelNode, ModelVertex},
    },
};

/// Where asset paths are resolved from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetSource {
    pub root: String,
}

impl AssetSource {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}

impl From<&Config> for AssetSource {
    fn from(config: &Config) -> Self {
        Self::new(config.assets_dir.clone())
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str, source: &AssetSource) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no global window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("could not read the page origin: {e:?}"))?;
    let root = source.root.trim_matches('/');
    let base = if root.is_empty() {
        format!("{origin}/")
    } else {
        format!("{origin}/{root}/")
    };
    let base = reqwest::Url::parse(&base)?;
    Ok(base.join(file_name.trim_start_matches('/'))?)
}

pub async fn load_binary(file_name: &str, source: &AssetSource) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name, source)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new(&source.root).join(file_name.trim_start_matches('/'));
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?
    };

    Ok(data)
}

/// Resolve a file URI found inside a model file relative to the model's own path.
///
/// Embedded `data:` URIs are not paths; read those with [`decode_data_uri`].
pub fn resolve_uri(model_path: &str, uri: &str) -> anyhow::Result<String> {
    if uri.starts_with("data:") {
        bail!("a data URI does not name a file");
    }
    let uri = String::from_utf8_lossy(&percent_decode(uri)).into_owned();
    let dir = match model_path.rfind('/') {
        Some(idx) => &model_path[..=idx],
        None => "",
    };
    Ok(format!("{dir}{uri}"))
}

/// Payload of an RFC 2397 `data:` URI, or `None` if `uri` is not one.
pub fn decode_data_uri(uri: &str) -> Option<anyhow::Result<Vec<u8>>> {
    let rest = uri.strip_prefix("data:")?;
    let Some((header, payload)) = rest.split_once(',') else {
        return Some(Err(anyhow::anyhow!("data URI without a ',' separator")));
    };
    if header.ends_with(";base64") {
        Some(
            base64::engine::general_purpose::STANDARD
                .decode(payload)
                .context("invalid base64 in data URI"),
        )
    } else {
        Some(Ok(percent_decode(payload)))
    }
}

/// Bytes behind a URI found in `model_path`: decoded in place for `data:`
/// URIs, otherwise fetched next to the model.
async fn fetch_uri(model_path: &str, uri: &str, source: &AssetSource) -> anyhow::Result<Vec<u8>> {
    if let Some(embedded) = decode_data_uri(uri) {
        return embedded;
    }
    let path = resolve_uri(model_path, uri)?;
    load_binary(&path, source)
        .await
        .with_context(|| format!("failed to fetch {path}"))
}

fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

/// Load a glTF 2.0 model (`.gltf` with external or embedded data, or `.glb`) into CPU-side data.
pub async fn load_model_gltf(file_name: &str, source: &AssetSource) -> anyhow::Result<ModelData> {
    let bytes = load_binary(file_name, source)
        .await
        .with_context(|| format!("failed to fetch {file_name}"))?;
    let gltf = gltf::Gltf::from_slice(&bytes)
        .with_context(|| format!("{file_name} is not a valid glTF file"))?;

    // Load buffers
    let buffer_uris: Vec<Option<String>> = gltf
        .buffers()
        .map(|buffer| match buffer.source() {
            gltf::buffer::Source::Bin => None,
            gltf::buffer::Source::Uri(uri) => Some(uri.to_string()),
        })
        .collect();
    let mut buffers: Vec<Vec<u8>> = Vec::with_capacity(buffer_uris.len());
    for uri in buffer_uris {
        let data = match uri {
            None => gltf
                .blob
                .clone()
                .context("the model references a binary chunk but has none")?,
            Some(uri) => fetch_uri(file_name, &uri, source)
                .await
                .with_context(|| format!("failed to load a buffer of {file_name}"))?,
        };
        buffers.push(data);
    }
    for buffer in gltf.buffers() {
        let available = buffers[buffer.index()].len();
        if available < buffer.length() {
            bail!(
                "buffer {} of {file_name} is {available} bytes but {} are declared",
                buffer.index(),
                buffer.length()
            );
        }
    }

    // Only base colour textures are rendered, so only those images are decoded
    let used_images: HashSet<usize> = gltf
        .materials()
        .filter_map(|m| m.pbr_metallic_roughness().base_color_texture())
        .map(|info| info.texture().source().index())
        .collect();
    let mut images: Vec<Option<Arc<ImageData>>> = Vec::new();
    let image_sources: Vec<ImageSource> = gltf
        .images()
        .map(|image| match image.source() {
            gltf::image::Source::View { view, .. } => ImageSource::View {
                buffer: view.buffer().index(),
                offset: view.offset(),
                length: view.length(),
            },
            gltf::image::Source::Uri { uri, .. } => ImageSource::Uri(uri.to_string()),
        })
        .collect();
    for (idx, image_source) in image_sources.into_iter().enumerate() {
        if !used_images.contains(&idx) {
            images.push(None);
            continue;
        }
        let encoded = match image_source {
            ImageSource::View {
                buffer,
                offset,
                length,
            } => buffers[buffer]
                .get(offset..offset + length)
                .map(<[u8]>::to_vec)
                .with_context(|| format!("image {idx} of {file_name} is out of bounds"))?,
            ImageSource::Uri(uri) => {
                match fetch_uri(file_name, &uri, source).await {
                    Ok(data) => data,
                    Err(e) => {
                        log::warn!(
                            "Image {idx} of {file_name} could not be loaded, using plain colour: {e:#}"
                        );
                        images.push(None);
                        continue;
                    }
                }
            }
        };
        images.push(decode_image(&encoded, idx, file_name));
    }

    // Load materials
    let materials = gltf
        .materials()
        .map(|material| {
            let pbr = material.pbr_metallic_roughness();
            Appearance {
                colour: pbr.base_color_factor(),
                metalness: pbr.metallic_factor(),
                roughness: pbr.roughness_factor(),
                texture: pbr
                    .base_color_texture()
                    .and_then(|info| images.get(info.texture().source().index()).cloned())
                    .flatten(),
            }
        })
        .collect();

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .with_context(|| format!("{file_name} contains no scene"))?;
    let roots = scene
        .nodes()
        .map(|node| to_model_node(node, &buffers))
        .collect();

    Ok(ModelData {
        source: file_name.to_string(),
        materials,
        roots,
    })
}

enum ImageSource {
    View {
        buffer: usize,
        offset: usize,
        length: usize,
    },
    Uri(String),
}

fn decode_image(encoded: &[u8], idx: usize, file_name: &str) -> Option<Arc<ImageData>> {
    match image::load_from_memory(encoded) {
        Ok(img) if img.width() == 0 || img.height() == 0 => {
            log::warn!("Image {idx} of {file_name} is empty, using plain colour");
            None
        }
        Ok(img) => {
            let rgba = img.to_rgba8();
            Some(Arc::new(ImageData {
                width: rgba.width(),
                height: rgba.height(),
                rgba: rgba.into_raw(),
            }))
        }
        Err(e) => {
            log::warn!("Image {idx} of {file_name} could not be decoded, using plain colour: {e}");
            None
        }
    }
}

fn to_model_node(node: gltf::Node, buffers: &[Vec<u8>]) -> ModelNode {
    // column-major, like cgmath
    let local: cgmath::Matrix4<f32> = node.transform().matrix().into();

    let mut meshes = Vec::new();
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping primitive {} of mesh {:?}: only triangles are supported, got {:?}",
                    primitive.index(),
                    mesh.name(),
                    primitive.mode()
                );
                continue;
            }
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

            let mut vertices: Vec<ModelVertex> = match reader.read_positions() {
                Some(positions) => positions
                    .map(|position| ModelVertex {
                        position,
                        ..Default::default()
                    })
                    .collect(),
                None => {
                    log::warn!("Skipping primitive without positions in mesh {:?}", mesh.name());
                    continue;
                }
            };
            let has_normals = match reader.read_normals() {
                Some(normals) => {
                    vertices
                        .iter_mut()
                        .zip(normals)
                        .for_each(|(vertex, normal)| vertex.normal = normal);
                    true
                }
                None => false,
            };
            if let Some(tex_coords) = reader.read_tex_coords(0) {
                vertices
                    .iter_mut()
                    .zip(tex_coords.into_f32())
                    .for_each(|(vertex, tex_coord)| vertex.tex_coords = tex_coord);
            }
            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };

            let mut data = MeshData {
                name: mesh.name().unwrap_or("unknown_mesh").to_string(),
                vertices,
                indices,
                material: primitive.material().index(),
            };
            if !has_normals {
                data.compute_normals();
            }
            meshes.push(Arc::new(data));
        }
    }

    let children = node
        .children()
        .map(|child| to_model_node(child, buffers))
        .collect();

    ModelNode {
        name: node.name().map(str::to_string),
        local,
        meshes,
        children,
    }
}
