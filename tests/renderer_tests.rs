//! Renderer Tests
//!
//! Drives [`ForwardRenderer`] on the headless device and inspects the
//! recorded command stream.
//!
//! Tests for:
//! - Pass order, shadow-map transition and presentation
//! - Push-constant contents (global, object, material and vertex addresses)
//! - Shadow pass skipping without a directional light
//! - Opaque/transparent pipeline state
//! - Transient ring paging across frames
//! - Deferred destruction of dropped meshes
//! - Resize and error paths

use std::rc::Rc;

use glam::{Mat4, Quat, Vec3, Vec4};

use ember::core::Bounds;
use ember::errors::EmberError;
use ember::gfx::{Command, DepthState, DeviceSettings, HeadlessDevice, RenderDevice, Submission};
use ember::renderer::{
    EmbeddedShaderLoader, ForwardPushConstants, ForwardRenderer, GlobalUniforms, RendererSettings,
    ShaderType, ShadowPushConstants,
};
use ember::resources::{AlphaMode, Material, MaterialDesc, Mesh, SubMesh, Vertex};
use ember::scene::{CameraComponent, GameObjectHandle, Light, LightComponent, MeshComponent, World};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn renderer() -> ForwardRenderer {
    init_logger();
    let gfx = HeadlessDevice::new(64, 48).expect("headless device");
    let device = RenderDevice::new(Box::new(gfx), DeviceSettings::default()).expect("render device");
    let settings = RendererSettings {
        width: 64,
        height: 48,
        temp_buffer_size: 64 * 1024,
        shadow_map_size: 256,
        ..Default::default()
    };
    ForwardRenderer::new(device, &EmbeddedShaderLoader, settings).expect("renderer")
}

fn gfx(renderer: &ForwardRenderer) -> &HeadlessDevice {
    renderer
        .device()
        .downcast_gfx::<HeadlessDevice>()
        .expect("headless backend")
}

fn last_submission(renderer: &ForwardRenderer) -> &Submission {
    gfx(renderer).last_submission().expect("a submitted frame")
}

fn material(renderer: &mut ForwardRenderer, alpha_mode: AlphaMode) -> Rc<Material> {
    let desc = MaterialDesc {
        base_color_factor: Vec4::new(1.0, 0.5, 0.25, 1.0),
        alpha_mode,
        ..Default::default()
    };
    Rc::new(Material::new(renderer.device_mut(), desc).unwrap())
}

fn cube(renderer: &mut ForwardRenderer, material: &Rc<Material>) -> Rc<Mesh> {
    let vertices: Vec<Vertex> = (0..8)
        .map(|i| {
            let corner = Vec3::new(
                if i & 1 == 0 { -0.5 } else { 0.5 },
                if i & 2 == 0 { -0.5 } else { 0.5 },
                if i & 4 == 0 { -0.5 } else { 0.5 },
            );
            Vertex {
                position: corner.to_array(),
                normal: corner.normalize().to_array(),
                uv: [0.0, 0.0],
            }
        })
        .collect();
    #[rustfmt::skip]
    let indices: [u32; 36] = [
        0, 2, 1, 1, 2, 3, // -Z
        4, 5, 6, 5, 7, 6, // +Z
        0, 1, 4, 1, 5, 4, // -Y
        2, 6, 3, 3, 6, 7, // +Y
        0, 4, 2, 2, 4, 6, // -X
        1, 3, 5, 3, 7, 5, // +X
    ];
    let sub_mesh = SubMesh {
        index_offset: 0,
        index_count: 36,
        material: Rc::clone(material),
        bounds: Bounds::from_min_max(Vec3::splat(-0.5), Vec3::splat(0.5)),
    };
    Rc::new(Mesh::new(renderer.device_mut(), "cube", &vertices, &indices, vec![sub_mesh]).unwrap())
}

fn spawn_mesh(world: &mut World, mesh: &Rc<Mesh>, location: Vec3) -> GameObjectHandle {
    let node = world.create("mesh", location, Quat::IDENTITY, Vec3::ONE);
    world.add_component(node, MeshComponent::new(Rc::clone(mesh)));
    node
}

fn spawn_camera(world: &mut World) -> GameObjectHandle {
    let camera = world.create("camera", Vec3::new(0.0, 0.0, -5.0), Quat::IDENTITY, Vec3::ONE);
    world.add_component(camera, CameraComponent::new(1.0, 64.0 / 48.0, 0.1, 100.0));
    camera
}

fn spawn_sun(world: &mut World) -> GameObjectHandle {
    let sun = world.create(
        "sun",
        Vec3::new(0.0, 10.0, 0.0),
        Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        Vec3::ONE,
    );
    world.add_component(sun, LightComponent::new(Light::new_directional(Vec3::ONE, 2.0)));
    sun
}

/// Commands of the pass whose `BeginRendering` label is `label`.
fn pass_commands<'a>(submission: &'a Submission, label: &str) -> Vec<&'a Command> {
    let mut inside = false;
    let mut out = Vec::new();
    for command in &submission.commands {
        match command {
            Command::BeginRendering(pass) => inside = pass.label == label,
            Command::EndRendering => inside = false,
            _ if inside => out.push(command),
            _ => {}
        }
    }
    out
}

fn push_constants(commands: &[&Command]) -> Vec<Vec<u8>> {
    commands
        .iter()
        .filter_map(|c| match c {
            Command::PushConstants(bytes) => Some(bytes.to_vec()),
            _ => None,
        })
        .collect()
}

fn pass_labels(submission: &Submission) -> Vec<&str> {
    submission
        .commands
        .iter()
        .filter_map(|c| match c {
            Command::BeginRendering(pass) => Some(pass.label.as_str()),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Frame structure
// ============================================================================

#[test]
fn lit_scene_runs_shadow_then_forward() {
    let mut renderer = renderer();
    let opaque = material(&mut renderer, AlphaMode::Opaque);
    let mesh = cube(&mut renderer, &opaque);

    let mut world = World::new();
    let camera = spawn_camera(&mut world);
    spawn_mesh(&mut world, &mesh, Vec3::ZERO);
    spawn_sun(&mut world);

    let stats = renderer.render(&world, camera).unwrap();
    assert_eq!(stats.opaque, 1);
    assert_eq!(stats.transparent, 0);
    assert_eq!(stats.lights, 1);
    assert!(stats.shadow_pass);
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(renderer.frame_count(), 1);

    let submission = last_submission(&renderer);
    assert_eq!(pass_labels(submission), vec!["Shadow Pass", "Forward Pass"]);
    assert_eq!(submission.present, Some(renderer.device().swapchain_texture()));
    assert_eq!(submission.draw_count(), 2);

    // The shadow map is transitioned between the passes
    let shadow_map = renderer.shadow_pass().shadow_map().handle();
    let transition = submission
        .commands
        .iter()
        .position(|c| *c == Command::TransitionToShaderReadOnly(shadow_map))
        .expect("shadow map transition");
    let forward_begin = submission
        .commands
        .iter()
        .position(|c| matches!(c, Command::BeginRendering(p) if p.label == "Forward Pass"))
        .unwrap();
    assert!(transition < forward_begin);
}

#[test]
fn shadow_pass_is_skipped_without_directional_light() {
    let mut renderer = renderer();
    let opaque = material(&mut renderer, AlphaMode::Opaque);
    let mesh = cube(&mut renderer, &opaque);

    let mut world = World::new();
    let camera = spawn_camera(&mut world);
    spawn_mesh(&mut world, &mesh, Vec3::ZERO);
    let lamp = world.spawn("lamp");
    world.add_component(lamp, LightComponent::new(Light::new_point(Vec3::ONE, 1.0, 10.0)));

    let stats = renderer.render(&world, camera).unwrap();
    assert!(!stats.shadow_pass);
    assert_eq!(stats.draw_calls, 1);

    let submission = last_submission(&renderer);
    assert_eq!(pass_labels(submission), vec!["Forward Pass"]);

    // Globals point the shadow map slot at the white texture
    let pushes = push_constants(&pass_commands(submission, "Forward Pass"));
    let push: ForwardPushConstants = bytemuck::pod_read_unaligned(&pushes[0]);
    let bytes = gfx(&renderer)
        .read_gpu_address(push.per_frame, size_of::<GlobalUniforms>())
        .unwrap();
    let globals: GlobalUniforms = bytemuck::pod_read_unaligned(bytes);
    assert_eq!(globals.shadow_map, renderer.device().white_texture().bindless_index());
    assert_eq!(globals.light_view_proj, Mat4::IDENTITY);
    assert_eq!(globals.light_count, 1);
}

#[test]
fn empty_world_still_clears_and_presents() {
    let mut renderer = renderer();
    let mut world = World::new();
    let camera = spawn_camera(&mut world);

    let stats = renderer.render(&world, camera).unwrap();
    assert_eq!(stats.draw_calls, 0);

    let submission = last_submission(&renderer);
    assert_eq!(pass_labels(submission), vec!["Forward Pass"]);
    assert!(submission.present.is_some());
}

#[test]
fn render_without_camera_component_fails() {
    let mut renderer = renderer();
    let mut world = World::new();
    let not_a_camera = world.spawn("empty");

    assert!(matches!(
        renderer.render(&world, not_a_camera),
        Err(EmberError::MissingCamera)
    ));
    assert!(gfx(&renderer).submissions().is_empty());
}

// ============================================================================
// Push constants
// ============================================================================

#[test]
fn forward_push_constants_carry_device_addresses() {
    let mut renderer = renderer();
    let opaque = material(&mut renderer, AlphaMode::Opaque);
    let mesh = cube(&mut renderer, &opaque);

    let mut world = World::new();
    let camera = spawn_camera(&mut world);
    let node = spawn_mesh(&mut world, &mesh, Vec3::new(1.0, 2.0, 3.0));
    spawn_sun(&mut world);
    renderer.render(&world, camera).unwrap();

    let submission = last_submission(&renderer);
    let pushes = push_constants(&pass_commands(submission, "Forward Pass"));
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].len(), size_of::<ForwardPushConstants>());
    assert_eq!(pushes[0].len(), 32);

    let push: ForwardPushConstants = bytemuck::pod_read_unaligned(&pushes[0]);
    assert_eq!(push.material, opaque.gpu_address());
    assert_eq!(push.vertex_buffer, mesh.vertex_buffer_address());

    let device = gfx(&renderer);
    let model: Mat4 = bytemuck::pod_read_unaligned(device.read_gpu_address(push.per_object, 64).unwrap());
    assert_eq!(model, world.matrix(node).unwrap());

    let globals: GlobalUniforms = bytemuck::pod_read_unaligned(
        device
            .read_gpu_address(push.per_frame, size_of::<GlobalUniforms>())
            .unwrap(),
    );
    let camera_world = world.matrix(camera).unwrap();
    assert!(globals.view.abs_diff_eq(camera_world.inverse(), 1e-5));
    assert_eq!(globals.light_count, 1);
    assert_eq!(
        globals.shadow_map,
        renderer.shadow_pass().shadow_map().bindless_index()
    );
    assert_ne!(globals.light_view_proj, Mat4::IDENTITY);

    let shadow_pushes = push_constants(&pass_commands(submission, "Shadow Pass"));
    assert_eq!(shadow_pushes[0].len(), size_of::<ShadowPushConstants>());
    let shadow_push: ShadowPushConstants = bytemuck::pod_read_unaligned(&shadow_pushes[0]);
    assert_eq!(shadow_push.per_object, push.per_object);
}

#[test]
fn objects_get_consecutive_matrix_slots() {
    let mut renderer = renderer();
    let opaque = material(&mut renderer, AlphaMode::Opaque);
    let mesh = cube(&mut renderer, &opaque);

    let mut world = World::new();
    let camera = spawn_camera(&mut world);
    for i in 0..3 {
        spawn_mesh(&mut world, &mesh, Vec3::new(i as f32 * 2.0, 0.0, 0.0));
    }
    renderer.render(&world, camera).unwrap();

    let pushes = push_constants(&pass_commands(last_submission(&renderer), "Forward Pass"));
    let objects: Vec<u64> = pushes
        .iter()
        .map(|p| bytemuck::pod_read_unaligned::<ForwardPushConstants>(p).per_object)
        .collect();
    assert_eq!(objects.len(), 3);
    assert_eq!(objects[1] - objects[0], 64);
    assert_eq!(objects[2] - objects[1], 64);
}

// ============================================================================
// Pipelines
// ============================================================================

#[test]
fn transparent_draws_follow_opaque_with_read_only_depth() {
    let mut renderer = renderer();
    let opaque = material(&mut renderer, AlphaMode::Opaque);
    let blended = material(&mut renderer, AlphaMode::Blend);
    let solid = cube(&mut renderer, &opaque);
    let glass = cube(&mut renderer, &blended);

    let mut world = World::new();
    let camera = spawn_camera(&mut world);
    spawn_mesh(&mut world, &glass, Vec3::new(0.0, 0.0, 1.0));
    spawn_mesh(&mut world, &glass, Vec3::new(0.0, 0.0, 8.0));
    spawn_mesh(&mut world, &solid, Vec3::ZERO);

    let stats = renderer.render(&world, camera).unwrap();
    assert_eq!(stats.opaque, 1);
    assert_eq!(stats.transparent, 2);

    let commands = pass_commands(last_submission(&renderer), "Forward Pass");
    let read_only = commands
        .iter()
        .position(|c| **c == Command::BindDepthState(DepthState::READ_ONLY))
        .unwrap();
    let draws: Vec<usize> = commands
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Command::DrawIndexed { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(draws.len(), 3);
    assert!(draws[0] < read_only && read_only < draws[1]);

    // Back to front: the far cube is drawn first
    let pushes = push_constants(&commands);
    let first_transparent: ForwardPushConstants = bytemuck::pod_read_unaligned(&pushes[1]);
    let model: Mat4 = bytemuck::pod_read_unaligned(
        gfx(&renderer)
            .read_gpu_address(first_transparent.per_object, 64)
            .unwrap(),
    );
    assert_eq!(model.w_axis.z, 8.0);
}

#[test]
fn pipelines_differ_per_shader_type_and_blending() {
    let renderer = renderer();
    let forward = renderer.forward_pass();
    let device = gfx(&renderer);

    let pipelines = [
        forward.pipeline(ShaderType::Unlit, false),
        forward.pipeline(ShaderType::Unlit, true),
        forward.pipeline(ShaderType::SimpleLit, false),
        forward.pipeline(ShaderType::SimpleLit, true),
    ];
    for (i, a) in pipelines.iter().enumerate() {
        for b in &pipelines[i + 1..] {
            assert_ne!(a, b);
        }
    }

    for pipeline in pipelines {
        let desc = device.pipeline_desc(pipeline).unwrap();
        assert_eq!(desc.front_face, wgpu::FrontFace::Cw);
    }

    let opaque = device.pipeline_desc(pipelines[2]).unwrap();
    assert_eq!(opaque.cull_mode, Some(wgpu::Face::Back));
    assert_eq!(opaque.color.as_ref().unwrap().blend, None);
    assert_eq!(opaque.push_constant_size, 32);

    let transparent = device.pipeline_desc(pipelines[3]).unwrap();
    assert_eq!(transparent.cull_mode, None);
    assert_eq!(
        transparent.color.as_ref().unwrap().blend,
        Some(wgpu::BlendState::ALPHA_BLENDING)
    );
}

#[test]
fn shader_type_selects_forward_pipeline() {
    let mut renderer = renderer();
    let opaque = material(&mut renderer, AlphaMode::Opaque);
    let mesh = cube(&mut renderer, &opaque);

    let mut world = World::new();
    let camera = spawn_camera(&mut world);
    spawn_mesh(&mut world, &mesh, Vec3::ZERO);

    renderer.set_shader_type(ShaderType::Unlit);
    renderer.render(&world, camera).unwrap();

    let unlit = renderer.forward_pass().pipeline(ShaderType::Unlit, false);
    let commands = pass_commands(last_submission(&renderer), "Forward Pass");
    assert!(commands.contains(&&Command::BindRenderPipeline(unlit)));
}

// ============================================================================
// Frame resources
// ============================================================================

#[test]
fn ring_pages_rotate_with_frames_in_flight() {
    let mut renderer = renderer();
    let mut world = World::new();
    let camera = spawn_camera(&mut world);
    let opaque = material(&mut renderer, AlphaMode::Opaque);
    let mesh = cube(&mut renderer, &opaque);
    spawn_mesh(&mut world, &mesh, Vec3::ZERO);

    let frames = renderer.settings().frames_in_flight as usize;
    let mut globals = Vec::new();
    for _ in 0..=frames {
        renderer.render(&world, camera).unwrap();
        let pushes = push_constants(&pass_commands(last_submission(&renderer), "Forward Pass"));
        globals.push(bytemuck::pod_read_unaligned::<ForwardPushConstants>(&pushes[0]).per_frame);
    }

    let mut distinct = globals[..frames].to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(distinct.len(), frames);
    assert_eq!(globals[frames], globals[0]);
}

#[test]
fn dropped_mesh_is_released_on_next_frame() {
    let mut renderer = renderer();
    let opaque = material(&mut renderer, AlphaMode::Opaque);
    let mesh = cube(&mut renderer, &opaque);

    let mut world = World::new();
    let camera = spawn_camera(&mut world);
    let node = spawn_mesh(&mut world, &mesh, Vec3::ZERO);
    renderer.render(&world, camera).unwrap();
    let before = gfx(&renderer).live_buffers();

    world.destroy(node);
    drop(mesh);
    assert_eq!(gfx(&renderer).live_buffers(), before);

    let stats = renderer.render(&world, camera).unwrap();
    assert_eq!(stats.opaque, 0);
    assert_eq!(gfx(&renderer).live_buffers(), before - 2);
}

#[test]
fn resize_recreates_targets() {
    let mut renderer = renderer();
    let mut world = World::new();
    let camera = spawn_camera(&mut world);

    let old_swapchain = renderer.device().swapchain_texture();
    renderer.resize(0, 100).unwrap();
    assert_eq!(renderer.device().swapchain_texture(), old_swapchain);

    renderer.resize(128, 96).unwrap();
    assert_eq!(renderer.settings().width, 128);
    let swapchain = renderer.device().swapchain_texture();
    assert_ne!(swapchain, old_swapchain);
    let info = gfx(&renderer).texture_info(swapchain).unwrap();
    assert_eq!((info.width, info.height), (128, 96));

    renderer.render(&world, camera).unwrap();
    let submission = last_submission(&renderer);
    assert_eq!(submission.present, Some(swapchain));
    let Some(Command::BindViewport(viewport)) = pass_commands(submission, "Forward Pass")
        .into_iter()
        .find(|c| matches!(c, Command::BindViewport(_)))
    else {
        panic!("forward pass sets no viewport");
    };
    assert_eq!(viewport.width, 128.0);
}
