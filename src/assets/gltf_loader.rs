//! glTF Import
//!
//! Converts a glTF 2.0 document into engine resources and game objects.
//!
//! # Pipeline
//!
//! 1. Buffers (GLB blob, data URIs, external files)
//! 2. Samplers, one per glTF sampler
//! 3. Textures, one per glTF image; decode failures fall back to white
//! 4. Materials from metallic-roughness data
//! 5. Meshes: every triangle primitive of a glTF mesh becomes a sub-mesh of
//!    one [`Mesh`]; meshes without any are skipped
//! 6. Nodes: one game object each, then a second pass links the hierarchy
//!
//! Node transforms and mesh references are checked before the first game
//! object is created, so a failed import leaves the [`World`] untouched.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use base64::Engine as _;
use glam::{Mat4, Quat, Vec3, Vec4};

use crate::core::{Bounds, math};
use crate::errors::{EmberError, Result};
use crate::gfx::{RenderDevice, SamplerDesc};
use crate::resources::{AlphaMode, Material, MaterialDesc, Mesh, Sampler, SubMesh, Texture, Vertex};
use crate::scene::{GameObjectHandle, MeshComponent, World};

/// Everything one import produced. Index `i` of each resource list matches
/// the glTF array of the same name, except for a trailing default material
/// when primitives without one were found.
#[derive(Debug, Default)]
pub struct GltfModel {
    pub samplers: Vec<Rc<Sampler>>,
    pub textures: Vec<Rc<Texture>>,
    pub materials: Vec<Rc<Material>>,
    /// `None` where the glTF mesh had no triangle primitives.
    pub meshes: Vec<Option<Rc<Mesh>>>,
    /// One per glTF node, in node order.
    pub game_objects: Vec<GameObjectHandle>,
    /// Game objects without a parent.
    pub top_game_objects: Vec<GameObjectHandle>,
}

/// Loads a `.gltf` or `.glb` file. Relative URIs resolve against its directory.
pub fn load_gltf(path: impl AsRef<Path>, world: &mut World, device: &mut RenderDevice) -> Result<GltfModel> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
    let model = load_gltf_from_slice(&bytes, &base_dir, world, device)?;
    log::info!(
        "Loaded '{}': {} object(s), {} mesh(es), {} material(s), {} texture(s)",
        path.display(),
        model.game_objects.len(),
        model.meshes.iter().flatten().count(),
        model.materials.len(),
        model.textures.len()
    );
    Ok(model)
}

/// Loads a glTF document held in memory.
pub fn load_gltf_from_slice(
    bytes: &[u8],
    base_dir: &Path,
    world: &mut World,
    device: &mut RenderDevice,
) -> Result<GltfModel> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, Some(base_dir), blob)?;

    let mut loader = GltfLoader {
        world,
        device,
        base_dir: base_dir.to_path_buf(),
        buffers: &buffers,
        default_material: None,
        model: GltfModel::default(),
    };

    loader.load_samplers(&document)?;
    loader.load_textures(&document);
    loader.load_materials(&document)?;
    loader.load_meshes(&document)?;
    loader.load_nodes(&document)?;

    Ok(loader.model)
}

struct GltfLoader<'a> {
    world: &'a mut World,
    device: &'a mut RenderDevice,
    base_dir: PathBuf,
    buffers: &'a [gltf::buffer::Data],
    default_material: Option<Rc<Material>>,
    model: GltfModel,
}

impl GltfLoader<'_> {
    // ========================================================================
    // Samplers & Textures
    // ========================================================================

    fn load_samplers(&mut self, document: &gltf::Document) -> Result<()> {
        for sampler in document.samplers() {
            let desc = convert_sampler(&sampler);
            self.model.samplers.push(Rc::new(self.device.create_sampler(&desc)?));
        }
        Ok(())
    }

    fn load_textures(&mut self, document: &gltf::Document) {
        for image in document.images() {
            let label = image
                .name()
                .map_or_else(|| format!("Image {}", image.index()), str::to_string);

            let texture = match self.decode_image(&image).and_then(|rgba| {
                let (width, height) = rgba.dimensions();
                self.device
                    .create_texture(&crate::gfx::TextureDesc {
                        label: &label,
                        width,
                        height,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                        data: Some(rgba.as_raw()),
                    })
            }) {
                Ok(texture) => Rc::new(texture),
                Err(err) => {
                    log::error!("Failed to load texture '{label}': {err}; using white texture");
                    Rc::clone(self.device.white_texture())
                }
            };
            self.model.textures.push(texture);
        }
    }

    fn decode_image(&self, image: &gltf::Image<'_>) -> Result<image::RgbaImage> {
        let decoded = match image.source() {
            gltf::image::Source::View { view, .. } => {
                let buffer = self.buffers.get(view.buffer().index()).ok_or_else(|| {
                    EmberError::AssetIndexOutOfBounds {
                        context: "image buffer".to_string(),
                        index: view.buffer().index(),
                    }
                })?;
                let bytes = buffer
                    .get(view.offset()..view.offset() + view.length())
                    .ok_or_else(|| EmberError::Gltf(format!("buffer view {} out of range", view.index())))?;
                image::load_from_memory(bytes)?
            }
            gltf::image::Source::Uri { uri, .. } => {
                if uri.starts_with("data:") {
                    image::load_from_memory(&decode_data_uri(uri)?)?
                } else {
                    image::open(self.base_dir.join(uri))?
                }
            }
        };
        Ok(decoded.to_rgba8())
    }

    fn texture_for(&self, info: Option<gltf::texture::Info<'_>>) -> Result<Option<Rc<Texture>>> {
        let Some(info) = info else {
            return Ok(None);
        };
        let index = info.texture().source().index();
        self.model
            .textures
            .get(index)
            .cloned()
            .map(Some)
            .ok_or(EmberError::AssetIndexOutOfBounds {
                context: "texture image".to_string(),
                index,
            })
    }

    // ========================================================================
    // Materials
    // ========================================================================

    fn load_materials(&mut self, document: &gltf::Document) -> Result<()> {
        for material in document.materials() {
            let pbr = material.pbr_metallic_roughness();
            let desc = MaterialDesc {
                name: material.name().unwrap_or_default().to_string(),
                base_color_factor: Vec4::from_array(pbr.base_color_factor()),
                metallic_factor: pbr.metallic_factor(),
                roughness_factor: pbr.roughness_factor(),
                base_color_texture: self.texture_for(pbr.base_color_texture())?,
                metallic_roughness_texture: self.texture_for(pbr.metallic_roughness_texture())?,
                alpha_mode: match material.alpha_mode() {
                    gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
                    gltf::material::AlphaMode::Mask => AlphaMode::Mask,
                    gltf::material::AlphaMode::Blend => AlphaMode::Blend,
                },
                alpha_cutoff: material.alpha_cutoff().unwrap_or(0.5),
                double_sided: material.double_sided(),
            };
            self.model.materials.push(Rc::new(Material::new(self.device, desc)?));
        }
        Ok(())
    }

    fn default_material(&mut self) -> Result<Rc<Material>> {
        if let Some(material) = &self.default_material {
            return Ok(Rc::clone(material));
        }
        let material = Rc::new(Material::new(
            self.device,
            MaterialDesc {
                name: "Default".to_string(),
                ..Default::default()
            },
        )?);
        self.model.materials.push(Rc::clone(&material));
        self.default_material = Some(Rc::clone(&material));
        Ok(material)
    }

    // ========================================================================
    // Meshes
    // ========================================================================

    fn load_meshes(&mut self, document: &gltf::Document) -> Result<()> {
        let buffers = self.buffers;
        for mesh in document.meshes() {
            let name = mesh
                .name()
                .map_or_else(|| format!("Mesh {}", mesh.index()), str::to_string);

            let mut vertices: Vec<Vertex> = Vec::new();
            let mut indices: Vec<u32> = Vec::new();
            let mut sub_meshes = Vec::new();

            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!("Skipping non-triangle primitive {} of '{name}'", primitive.index());
                    continue;
                }

                let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

                let positions: Vec<[f32; 3]> = reader
                    .read_positions()
                    .ok_or_else(|| EmberError::MissingAttribute {
                        attribute: "POSITION",
                        mesh: name.clone(),
                    })?
                    .collect();
                let normals: Vec<[f32; 3]> = reader.read_normals().map(Iterator::collect).unwrap_or_default();
                let uvs: Vec<[f32; 2]> = reader
                    .read_tex_coords(0)
                    .map(|uv| uv.into_f32().collect())
                    .unwrap_or_default();

                let first_vertex = u32::try_from(vertices.len())
                    .map_err(|_| too_many_vertices(&name))?;
                let index_offset = indices.len() as u32;

                vertices.extend(positions.iter().enumerate().map(|(i, &position)| Vertex {
                    position,
                    normal: normals.get(i).copied().unwrap_or([1.0, 0.0, 0.0]),
                    uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                }));

                match reader.read_indices() {
                    Some(read) => indices.extend(rebase_indices(read.into_u32(), first_vertex, &name)?),
                    None => {
                        let count = u32::try_from(positions.len()).map_err(|_| too_many_vertices(&name))?;
                        indices.extend(rebase_indices(0..count, first_vertex, &name)?);
                    }
                }

                let material = match primitive.material().index() {
                    Some(index) => self.model.materials.get(index).cloned().ok_or(
                        EmberError::AssetIndexOutOfBounds {
                            context: format!("material of '{name}'"),
                            index,
                        },
                    )?,
                    None => self.default_material()?,
                };

                let bounding_box = primitive.bounding_box();
                sub_meshes.push(SubMesh {
                    index_offset,
                    index_count: indices.len() as u32 - index_offset,
                    material,
                    bounds: Bounds::from_min_max(
                        Vec3::from_array(bounding_box.min),
                        Vec3::from_array(bounding_box.max),
                    ),
                });
            }

            if sub_meshes.is_empty() {
                log::warn!("Skipping mesh '{name}': no triangle primitives");
                self.model.meshes.push(None);
                continue;
            }
            let mesh = Mesh::new(self.device, &name, &vertices, &indices, sub_meshes)?;
            self.model.meshes.push(Some(Rc::new(mesh)));
        }
        Ok(())
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    fn load_nodes(&mut self, document: &gltf::Document) -> Result<()> {
        let mut prepared = Vec::new();
        for node in document.nodes() {
            let matrix = Mat4::from_cols_array_2d(&node.transform().matrix());
            math::try_decompose(&matrix)?;

            let mesh = match node.mesh() {
                Some(mesh) => self.model.meshes.get(mesh.index()).cloned().ok_or(
                    EmberError::AssetIndexOutOfBounds {
                        context: "node mesh".to_string(),
                        index: mesh.index(),
                    },
                )?,
                None => None,
            };
            prepared.push((node, matrix, mesh));
        }

        for (node, matrix, mesh) in prepared {
            let name = node
                .name()
                .map_or_else(|| format!("Node {}", node.index()), str::to_string);
            let handle = self.world.create(name, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE);
            self.world.set_local_matrix(handle, matrix);
            if let Some(mesh) = mesh {
                self.world.add_component(handle, MeshComponent::new(mesh));
            }
            self.model.game_objects.push(handle);
        }

        for node in document.nodes() {
            let parent = self.model.game_objects[node.index()];
            for child in node.children() {
                if let Some(&child) = self.model.game_objects.get(child.index()) {
                    self.world.add_child(parent, child);
                }
            }
        }

        self.model.top_game_objects = self
            .model
            .game_objects
            .iter()
            .copied()
            .filter(|&handle| self.world.parent(handle).is_none())
            .collect();
        Ok(())
    }
}

fn too_many_vertices(mesh: &str) -> EmberError {
    EmberError::InvalidDescriptor(format!("mesh '{mesh}' exceeds the u32 vertex range"))
}

/// Offsets primitive-local indices into the mesh's shared vertex buffer.
fn rebase_indices(indices: impl IntoIterator<Item = u32>, base: u32, mesh: &str) -> Result<Vec<u32>> {
    indices
        .into_iter()
        .map(|index| index.checked_add(base).ok_or_else(|| too_many_vertices(mesh)))
        .collect()
}

fn convert_sampler(sampler: &gltf::texture::Sampler<'_>) -> SamplerDesc {
    use gltf::texture::{MagFilter, MinFilter, WrappingMode};

    let wrap = |mode: WrappingMode| match mode {
        WrappingMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        WrappingMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        WrappingMode::Repeat => wgpu::AddressMode::Repeat,
    };

    SamplerDesc {
        mag_filter: match sampler.mag_filter() {
            Some(MagFilter::Nearest) => wgpu::FilterMode::Nearest,
            Some(MagFilter::Linear) | None => wgpu::FilterMode::Linear,
        },
        min_filter: match sampler.min_filter() {
            Some(MinFilter::Nearest | MinFilter::NearestMipmapNearest | MinFilter::NearestMipmapLinear) => {
                wgpu::FilterMode::Nearest
            }
            _ => wgpu::FilterMode::Linear,
        },
        address_mode_u: wrap(sampler.wrap_s()),
        address_mode_v: wrap(sampler.wrap_t()),
        compare: None,
    }
}

/// Decodes a base64 `data:` URI.
fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| EmberError::DataUri("missing 'data:' scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| EmberError::DataUri("missing ',' separator".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(EmberError::DataUri(format!("unsupported encoding '{header}'")));
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_decodes_base64_payload() {
        let bytes = decode_data_uri("data:application/octet-stream;base64,AQID").unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn rebased_indices_stay_in_u32_range() {
        assert_eq!(rebase_indices([0, 1, 2], 10, "m").unwrap(), vec![10, 11, 12]);
        assert!(matches!(
            rebase_indices([0, u32::MAX - 4], 5, "m"),
            Err(EmberError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn data_uri_rejects_plain_encoding() {
        assert!(matches!(
            decode_data_uri("data:text/plain,hello"),
            Err(EmberError::DataUri(_))
        ));
    }
}
