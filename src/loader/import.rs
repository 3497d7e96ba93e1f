use std::collections::HashMap;
use std::sync::Arc;

use gltf::animation::util::ReadOutputs;
use gltf::image::Format;
use gltf::texture::WrappingMode;
use image::RgbaImage;
use log::{debug, info, warn};
use nalgebra_glm as glm;
use serde::Deserialize;

use crate::animation::{AnimationClip, Interpolation, Track, TrackProperty};
use crate::material::{BasicParams, Material, MaterialKind, StandardParams};
use crate::scene::{Color, Geometry, Mesh, MorphTargets, Node, NodeId, SceneGraph, Transform};
use crate::texture::{TextureImage, WrapMode};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("gltf: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("asset has no scene")]
    NoScene,
    #[error("mesh '{mesh}' has a primitive without positions")]
    MissingPositions { mesh: String },
}

/// A parsed asset: its own graph, the graph's root and the clips that
/// animate it. Node ids in the clips refer to `graph`.
pub struct LoadedAsset {
    pub graph: SceneGraph,
    pub root: NodeId,
    pub animations: Vec<AnimationClip>,
}

#[derive(Deserialize)]
struct MeshExtras {
    #[serde(rename = "targetNames", default)]
    target_names: Vec<String>,
}

struct Importer<'a> {
    document: &'a gltf::Document,
    buffers: &'a [gltf::buffer::Data],
    textures: Vec<Option<Arc<TextureImage>>>,
    nodes: HashMap<usize, NodeId>,
    graph: SceneGraph,
}

/// Parses a binary glTF container (or a self-contained .gltf) into a scene
/// graph. Only the default scene is imported, in file order.
pub fn import_glb(bytes: &[u8]) -> Result<LoadedAsset, ImportError> {
    let (document, buffers, images) = gltf::import_slice(bytes)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(ImportError::NoScene)?;

    let mut importer = Importer {
        document: &document,
        buffers: &buffers,
        textures: images.into_iter().map(convert_image).collect(),
        nodes: HashMap::new(),
        graph: SceneGraph::new(),
    };

    let root = importer
        .graph
        .add(Node::group(scene.name().unwrap_or("Scene")));
    for node in scene.nodes() {
        importer.import_node(root, &node)?;
    }

    let animations = importer.import_animations();

    info!(
        "Imported glTF: {} nodes, {} animations",
        importer.graph.len(),
        animations.len()
    );

    Ok(LoadedAsset {
        graph: importer.graph,
        root,
        animations,
    })
}

impl Importer<'_> {
    fn import_node(&mut self, parent: NodeId, node: &gltf::Node) -> Result<(), ImportError> {
        let name = node
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("node_{}", node.index()));

        let (translation, rotation, scale) = node.transform().decomposed();
        let transform = Transform {
            translation: glm::make_vec3(&translation),
            rotation: glm::quat(rotation[0], rotation[1], rotation[2], rotation[3]),
            scale: glm::make_vec3(&scale),
        };

        let id = match node.mesh() {
            Some(mesh) => {
                let mut meshes = self.import_mesh(&mesh, node.weights())?;
                if meshes.len() == 1 {
                    let mut scene_node = Node::mesh(name, meshes.remove(0));
                    scene_node.transform = transform;
                    self.graph.add_child(parent, scene_node)
                } else {
                    let mut group = Node::group(name.clone());
                    group.transform = transform;
                    let id = self.graph.add_child(parent, group);
                    for (i, primitive) in meshes.into_iter().enumerate() {
                        self.graph
                            .add_child(id, Node::mesh(format!("{name}_{i}"), primitive));
                    }
                    id
                }
            }
            None => {
                let mut group = Node::group(name);
                group.transform = transform;
                self.graph.add_child(parent, group)
            }
        };
        self.nodes.insert(node.index(), id);

        for child in node.children() {
            self.import_node(id, &child)?;
        }
        Ok(())
    }

    /// One scene mesh per primitive.
    fn import_mesh(
        &self,
        mesh: &gltf::Mesh,
        node_weights: Option<&[f32]>,
    ) -> Result<Vec<Mesh>, ImportError> {
        let mesh_name = mesh
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

        let target_names = mesh
            .extras()
            .as_ref()
            .and_then(|raw| serde_json::from_str::<MeshExtras>(raw.get()).ok())
            .map(|extras| extras.target_names)
            .unwrap_or_default();

        let mut result = Vec::new();
        for primitive in mesh.primitives() {
            let geometry = self.read_geometry(&primitive, &mesh_name)?;
            let material = self.import_material(&primitive.material());

            let mut scene_mesh = Mesh::new(geometry, material);
            let channels = scene_mesh.geometry.morph_positions.len();
            if channels > 0 {
                let names = (0..channels)
                    .map(|i| {
                        target_names
                            .get(i)
                            .cloned()
                            .unwrap_or_else(|| i.to_string())
                    })
                    .collect();
                let mut influences = node_weights
                    .or_else(|| mesh.weights())
                    .map(<[f32]>::to_vec)
                    .unwrap_or_default();
                influences.resize(channels, 0.0);
                scene_mesh = scene_mesh.with_morph(MorphTargets::new(names, influences));
            }
            result.push(scene_mesh);
        }

        debug!("Mesh '{}': {} primitives", mesh_name, result.len());
        Ok(result)
    }

    fn read_geometry(
        &self,
        primitive: &gltf::Primitive,
        mesh_name: &str,
    ) -> Result<Geometry, ImportError> {
        let reader = primitive.reader(|buffer| Some(self.buffers[buffer.index()].0.as_slice()));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| ImportError::MissingPositions {
                mesh: mesh_name.to_owned(),
            })?
            .collect();
        let count = positions.len();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..count as u32).collect(),
        };

        let normals = match reader.read_normals() {
            Some(normals) => normals.collect(),
            None => compute_normals(&positions, &indices),
        };

        let uvs = match reader.read_tex_coords(0) {
            Some(uvs) => uvs.into_f32().collect(),
            None => vec![[0.0, 0.0]; count],
        };

        let mut morph_positions = Vec::new();
        let mut morph_normals = Vec::new();
        for (target_positions, target_normals, _) in reader.read_morph_targets() {
            morph_positions.push(
                target_positions
                    .map(Iterator::collect)
                    .unwrap_or_else(|| vec![[0.0; 3]; count]),
            );
            morph_normals.push(
                target_normals
                    .map(Iterator::collect)
                    .unwrap_or_else(|| vec![[0.0; 3]; count]),
            );
        }

        Ok(Geometry {
            positions,
            normals,
            uvs,
            indices,
            groups: Vec::new(),
            morph_positions,
            morph_normals,
        })
    }

    /// Every primitive gets its own copy so edits never leak between meshes.
    fn import_material(&self, material: &gltf::Material) -> Material {
        if material.index().is_none() {
            return Material::default();
        }

        let pbr = material.pbr_metallic_roughness();
        let factor = pbr.base_color_factor();
        let color = Color::from_linear([factor[0], factor[1], factor[2]]);
        let map = pbr
            .base_color_texture()
            .and_then(|info| self.texture(&info.texture()));

        let kind = if material.unlit() {
            MaterialKind::Basic(BasicParams { color, map })
        } else {
            MaterialKind::Standard(StandardParams {
                color,
                map,
                roughness: pbr.roughness_factor(),
                metalness: pbr.metallic_factor(),
                emissive: Color::from_linear(material.emissive_factor()),
                ..Default::default()
            })
        };

        let mut result = Material::new(kind);
        result.name = material.name().map(str::to_owned);
        result.double_sided = material.double_sided();
        result.opacity = factor[3];
        result
    }

    fn texture(&self, texture: &gltf::Texture) -> Option<Arc<TextureImage>> {
        let source = self.textures.get(texture.source().index())?.as_ref()?;
        let sampler = texture.sampler();
        let (wrap_s, wrap_t) = (wrap_mode(sampler.wrap_s()), wrap_mode(sampler.wrap_t()));
        if source.wrap_s == wrap_s && source.wrap_t == wrap_t {
            return Some(source.clone());
        }
        let mut image = TextureImage::new(source.image.clone(), true);
        image.wrap_s = wrap_s;
        image.wrap_t = wrap_t;
        Some(Arc::new(image))
    }

    fn import_animations(&self) -> Vec<AnimationClip> {
        self.document
            .animations()
            .map(|animation| {
                let name = animation
                    .name()
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("animation_{}", animation.index()));
                let tracks = animation
                    .channels()
                    .filter_map(|channel| self.import_channel(&channel))
                    .collect();
                AnimationClip::new(name, tracks)
            })
            .collect()
    }

    fn import_channel(&self, channel: &gltf::animation::Channel) -> Option<Track> {
        let node = channel.target().node();
        let Some(&target) = self.nodes.get(&node.index()) else {
            debug!("Channel targets node {} outside the scene", node.index());
            return None;
        };

        let reader = channel.reader(|buffer| Some(self.buffers[buffer.index()].0.as_slice()));
        let times: Vec<f32> = reader.read_inputs()?.collect();
        if times.is_empty() {
            return None;
        }

        let (property, values, base_stride): (_, Vec<f32>, Option<usize>) =
            match reader.read_outputs()? {
                ReadOutputs::Translations(it) => {
                    (TrackProperty::Translation, it.flatten().collect(), Some(3))
                }
                ReadOutputs::Rotations(it) => {
                    (TrackProperty::Rotation, it.into_f32().flatten().collect(), Some(4))
                }
                ReadOutputs::Scales(it) => (TrackProperty::Scale, it.flatten().collect(), Some(3)),
                ReadOutputs::MorphTargetWeights(it) => {
                    (TrackProperty::MorphWeights, it.into_f32().collect(), None)
                }
            };

        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };
        let per_key = match interpolation {
            Interpolation::CubicSpline => 3 * times.len(),
            Interpolation::Step | Interpolation::Linear => times.len(),
        };
        let stride = base_stride.unwrap_or(values.len() / per_key);

        if stride == 0 || values.len() != stride * per_key {
            warn!(
                "Skipping channel on node {}: {} values for {} keys",
                node.index(),
                values.len(),
                times.len()
            );
            return None;
        }

        Some(Track {
            target,
            property,
            interpolation,
            times,
            values,
            stride,
        })
    }
}

fn wrap_mode(mode: WrappingMode) -> WrapMode {
    match mode {
        WrappingMode::ClampToEdge => WrapMode::ClampToEdge,
        WrappingMode::MirroredRepeat => WrapMode::MirroredRepeat,
        WrappingMode::Repeat => WrapMode::Repeat,
    }
}

fn convert_image(data: gltf::image::Data) -> Option<Arc<TextureImage>> {
    let pixels: Vec<u8> = match data.format {
        Format::R8G8B8A8 => data.pixels,
        Format::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => data.pixels.iter().flat_map(|&p| [p, p, p, 255]).collect(),
        other => {
            warn!("Unsupported image format {:?}, texture dropped", other);
            return None;
        }
    };
    let image = RgbaImage::from_raw(data.width, data.height, pixels)?;
    Some(Arc::new(TextureImage::new(image, true)))
}

/// Area-weighted vertex normals for primitives that ship without them.
fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![glm::Vec3::zeros(); positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = glm::make_vec3(&positions[a]);
        let face = glm::cross(
            &(glm::make_vec3(&positions[b]) - pa),
            &(glm::make_vec3(&positions[c]) - pa),
        );
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| {
            let len = glm::length(&n);
            if len > 0.0 {
                [n.x / len, n.y / len, n.z / len]
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}
