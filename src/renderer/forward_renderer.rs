//! Forward Renderer
//!
//! Drives one frame end to end:
//!
//! 1. release resources dropped since the last frame
//! 2. advance the transient ring to this frame's page
//! 3. collect and sort render objects and lights
//! 4. upload each list's world matrices once; both passes index into them
//! 5. shadow pass when a directional light exists
//! 6. forward pass into the swapchain, then present

use glam::Mat4;

use super::collect::collect_frame;
use super::passes::{DrawBatch, ForwardPass, PassContext, RenderNode, ShadowPass};
use super::render_object::RenderList;
use super::settings::{RendererSettings, ShaderType};
use super::shader::ShaderLoader;
use super::uniforms::{GlobalUniforms, GpuLight, MAX_LIGHTS, ShadowPassUniforms};
use crate::errors::{EmberError, Result};
use crate::gfx::{BufferRing, RenderDevice, SamplerDesc, TextureDesc};
use crate::resources::{Sampler, Texture};
use crate::scene::{CameraComponent, GameObjectHandle, World};

/// What the last call to [`ForwardRenderer::render`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub opaque: usize,
    pub transparent: usize,
    pub lights: usize,
    pub draw_calls: u32,
    pub shadow_pass: bool,
}

pub struct ForwardRenderer {
    device: RenderDevice,
    settings: RendererSettings,

    ring: BufferRing,
    shadow_sampler: Sampler,
    depth_texture: Texture,

    shadow_pass: ShadowPass,
    forward_pass: ForwardPass,

    frame_count: u64,
}

impl ForwardRenderer {
    /// Compiles all pipelines up front; any shader or pipeline failure is returned.
    pub fn new(mut device: RenderDevice, loader: &dyn ShaderLoader, settings: RendererSettings) -> Result<Self> {
        let release_queue = device.release_queue().clone();
        let ring = BufferRing::new(
            device.gfx_mut(),
            release_queue,
            settings.temp_buffer_size,
            settings.frames_in_flight,
            "Frame Ring",
        )?;
        let shadow_sampler = device.create_sampler(&SamplerDesc::SHADOW)?;
        let depth_texture = Self::create_depth_texture(&mut device, &settings)?;

        let shadow_pass = ShadowPass::new(&mut device, loader, &settings)?;
        let forward_pass = ForwardPass::new(&mut device, loader, &settings)?;

        log::info!(
            "Forward renderer ready ({}x{}, {:?}, shadow map {})",
            settings.width,
            settings.height,
            settings.shader_type,
            settings.shadow_map_size
        );

        Ok(Self {
            device,
            settings,
            ring,
            shadow_sampler,
            depth_texture,
            shadow_pass,
            forward_pass,
            frame_count: 0,
        })
    }

    fn create_depth_texture(device: &mut RenderDevice, settings: &RendererSettings) -> Result<Texture> {
        device.create_texture(&TextureDesc {
            label: "Depth Buffer",
            width: settings.width,
            height: settings.height,
            format: settings.depth_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            data: None,
        })
    }

    #[must_use]
    pub fn device(&self) -> &RenderDevice {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut RenderDevice {
        &mut self.device
    }

    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn forward_pass(&self) -> &ForwardPass {
        &self.forward_pass
    }

    #[must_use]
    pub fn shadow_pass(&self) -> &ShadowPass {
        &self.shadow_pass
    }

    pub fn set_shader_type(&mut self, shader_type: ShaderType) {
        self.settings.shader_type = shader_type;
    }

    /// Recreates the swapchain and depth buffer. Zero-sized requests are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        if width == self.settings.width && height == self.settings.height {
            return Ok(());
        }
        self.device.gfx_mut().resize_swapchain(width, height)?;
        self.settings.width = width;
        self.settings.height = height;
        self.depth_texture = Self::create_depth_texture(&mut self.device, &self.settings)?;
        log::debug!("Resized to {width}x{height}");
        Ok(())
    }

    fn upload_transforms(&mut self, list: &RenderList) -> Result<u64> {
        if list.is_empty() {
            return Ok(0);
        }
        self.ring.alloc_slice(self.device.gfx_mut(), &list.world_transforms())
    }

    /// Renders `world` from `camera` and presents.
    pub fn render(&mut self, world: &World, camera: GameObjectHandle) -> Result<FrameStats> {
        let camera_component = world
            .get_component::<CameraComponent>(camera)
            .ok_or(EmberError::MissingCamera)?;
        let camera_world = world.matrix(camera).ok_or(EmberError::MissingCamera)?;
        let camera_location = camera_world.w_axis.truncate();

        self.device.collect_garbage();
        self.ring.advance();

        let mut frame = collect_frame(world);
        frame.sort(camera_location);

        let opaque_transforms = self.upload_transforms(&frame.opaque)?;
        let transparent_transforms = self.upload_transforms(&frame.transparent)?;

        let (light_view_proj, shadow_uniforms, shadow_map) = match frame.main_light {
            Some(main_light) => {
                let light_view_proj = main_light.view_projection();
                let address = self
                    .ring
                    .alloc_pod(self.device.gfx_mut(), &ShadowPassUniforms { light_view_proj })?;
                (light_view_proj, address, self.shadow_pass.shadow_map().bindless_index())
            }
            None => {
                log::debug!("No directional light, shadow pass skipped");
                (Mat4::IDENTITY, 0, self.device.white_texture().bindless_index())
            }
        };

        let mut lights = [GpuLight::default(); MAX_LIGHTS];
        lights[..frame.lights.len()].copy_from_slice(&frame.lights);
        let globals = GlobalUniforms {
            proj: camera_component.projection_matrix(),
            view: camera_component.view_matrix(&camera_world),
            light_view_proj,
            linear_sampler: self.device.linear_sampler().bindless_index(),
            shadow_sampler: self.shadow_sampler.bindless_index(),
            shadow_map,
            _pad: 0,
            ambient_light: self.settings.ambient_light,
            light_count: frame.lights.len() as u32,
            lights,
        };
        let global_uniforms = self.ring.alloc_pod(self.device.gfx_mut(), &globals)?;

        let swapchain = self.device.swapchain_texture();
        let ctx = PassContext {
            frame: &frame,
            opaque: DrawBatch {
                list: &frame.opaque,
                transforms: opaque_transforms,
            },
            transparent: DrawBatch {
                list: &frame.transparent,
                transforms: transparent_transforms,
            },
            shader_type: self.settings.shader_type,
            global_uniforms,
            shadow_uniforms,
            color_target: swapchain,
            depth_target: self.depth_texture.handle(),
            width: self.settings.width,
            height: self.settings.height,
            clear_color: self.settings.clear_color,
        };

        let gfx = self.device.gfx_mut();
        let mut cmd = gfx.acquire_command_buffer();
        let mut draw_calls = 0;
        let shadow_pass = frame.main_light.is_some();
        if shadow_pass {
            draw_calls += self.shadow_pass.run(&ctx, &mut cmd);
        }
        draw_calls += self.forward_pass.run(&ctx, &mut cmd);
        gfx.submit(cmd, Some(swapchain))?;

        self.frame_count += 1;
        let stats = FrameStats {
            opaque: frame.opaque.len(),
            transparent: frame.transparent.len(),
            lights: frame.lights.len(),
            draw_calls,
            shadow_pass,
        };
        log::trace!("Frame {}: {stats:?}", self.frame_count);
        Ok(stats)
    }
}
