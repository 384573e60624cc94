//! Frame Collection
//!
//! Walks the world once per frame and produces everything the passes need:
//! opaque and transparent render lists, the GPU light list and the shadow
//! casting light.

use glam::{Mat4, Vec3};

use super::render_object::{RenderList, RenderObject};
use super::uniforms::{GpuLight, MAX_LIGHTS};
use crate::scene::components::{DirectionalLight, LightComponent, LightKind, MeshComponent};
use crate::scene::World;

/// The directional light that casts shadows this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainLight {
    pub world_matrix: Mat4,
    pub light: DirectionalLight,
}

impl MainLight {
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.light.view_projection(&self.world_matrix)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameData {
    pub opaque: RenderList,
    pub transparent: RenderList,
    pub lights: Vec<GpuLight>,
    pub main_light: Option<MainLight>,
}

impl FrameData {
    /// Sorts both lists for drawing from `camera_location`.
    pub fn sort(&mut self, camera_location: Vec3) {
        self.opaque.sort_opaque();
        self.transparent.sort_transparent(camera_location);
    }
}

/// Collects render objects and lights in node order. Lists come back
/// unsorted; see [`FrameData::sort`].
#[must_use]
pub fn collect_frame(world: &World) -> FrameData {
    let mut frame = FrameData::default();
    let mut dropped_lights = 0usize;

    for (handle, object) in world.iter() {
        let world_transform = object.matrix();

        for mesh_component in world.get_components::<MeshComponent>(handle) {
            let mesh = &mesh_component.mesh;
            for sub_mesh in mesh.sub_meshes() {
                let render_object = RenderObject {
                    vertex_buffer: mesh.vertex_buffer(),
                    vertex_buffer_address: mesh.vertex_buffer_address(),
                    index_buffer: mesh.index_buffer(),
                    index_offset: sub_mesh.index_offset,
                    index_count: sub_mesh.index_count,
                    bounds: sub_mesh.bounds,
                    material_gpu_address: sub_mesh.material.gpu_address(),
                    world_transform,
                };
                if sub_mesh.material.is_transparent() {
                    frame.transparent.push(render_object);
                } else {
                    frame.opaque.push(render_object);
                }
            }
        }

        for light_component in world.get_components::<LightComponent>(handle) {
            let light = &light_component.light;
            if let LightKind::Directional(directional) = light.kind
                && frame.main_light.is_none()
            {
                frame.main_light = Some(MainLight {
                    world_matrix: world_transform,
                    light: directional,
                });
            }

            if frame.lights.len() < MAX_LIGHTS {
                frame.lights.push(light.to_gpu(&world_transform));
            } else {
                dropped_lights += 1;
            }
        }
    }

    if dropped_lights > 0 {
        log::debug!("Light limit ({MAX_LIGHTS}) reached, {dropped_lights} light(s) dropped");
    }
    frame
}
