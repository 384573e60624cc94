//! Materials
//!
//! A material's shader-visible state lives in a [`GpuMaterial`] block inside
//! the device's material pool; draws reference it by device address.

use std::rc::Rc;

use glam::Vec4;

use super::texture::Texture;
use crate::errors::Result;
use crate::gfx::{BufferSlice, RenderDevice};
use crate::renderer::uniforms::GpuMaterial;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    /// Binary coverage against `alpha_cutoff`.
    Mask,
    Blend,
}

impl AlphaMode {
    #[must_use]
    pub fn is_transparent(self) -> bool {
        self == Self::Blend
    }
}

#[derive(Debug, Clone)]
pub struct MaterialDesc {
    pub name: String,
    pub base_color_factor: Vec4,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub base_color_texture: Option<Rc<Texture>>,
    pub metallic_roughness_texture: Option<Rc<Texture>>,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color_factor: Vec4::ONE,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            base_color_texture: None,
            metallic_roughness_texture: None,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}

#[derive(Debug)]
pub struct Material {
    pub name: String,
    pub base_color_factor: Vec4,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub base_color_texture: Option<Rc<Texture>>,
    pub metallic_roughness_texture: Option<Rc<Texture>>,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
    uniforms: BufferSlice,
}

impl Material {
    /// Builds the material and uploads its uniform block.
    ///
    /// Missing textures resolve to the device's white texture.
    pub fn new(device: &mut RenderDevice, desc: MaterialDesc) -> Result<Self> {
        let white = device.white_texture().bindless_index();
        let index_of = |t: &Option<Rc<Texture>>| t.as_ref().map_or(white, |t| t.bindless_index());

        let gpu = GpuMaterial {
            base_color_factor: desc.base_color_factor,
            metallic_factor: desc.metallic_factor,
            roughness_factor: desc.roughness_factor,
            base_color_texture: index_of(&desc.base_color_texture),
            metallic_roughness_texture: index_of(&desc.metallic_roughness_texture),
            alpha_mask: u32::from(desc.alpha_mode == AlphaMode::Mask),
            alpha_cutoff: desc.alpha_cutoff,
            _pad: [0; 2],
        };
        let uniforms = device.alloc_material_block(bytemuck::bytes_of(&gpu))?;

        Ok(Self {
            name: desc.name,
            base_color_factor: desc.base_color_factor,
            metallic_factor: desc.metallic_factor,
            roughness_factor: desc.roughness_factor,
            base_color_texture: desc.base_color_texture,
            metallic_roughness_texture: desc.metallic_roughness_texture,
            alpha_mode: desc.alpha_mode,
            alpha_cutoff: desc.alpha_cutoff,
            double_sided: desc.double_sided,
            uniforms,
        })
    }

    /// Address of the uniform block; embedded in draw push constants.
    #[must_use]
    pub fn gpu_address(&self) -> u64 {
        self.uniforms.gpu_address()
    }

    #[must_use]
    pub fn uniforms(&self) -> &BufferSlice {
        &self.uniforms
    }

    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.alpha_mode.is_transparent()
    }
}
