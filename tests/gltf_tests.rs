//! glTF Import Tests
//!
//! Builds small glTF documents in memory (buffers and images as data URIs)
//! and checks what the importer produces.
//!
//! Tests for:
//! - Resource counts and sharing between meshes and materials
//! - Node hierarchy and transforms
//! - Default material for primitives without one
//! - Texture decode fallback
//! - Missing POSITION and degenerate node matrices
//! - Meshes without triangle primitives

use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;

use base64::Engine as _;
use glam::Vec3;
use image::{ImageBuffer, ImageFormat, Rgba};

use ember::errors::EmberError;
use ember::gfx::{DeviceSettings, HeadlessDevice, RenderDevice};
use ember::resources::AlphaMode;
use ember::scene::{MeshComponent, World};
use ember::{GltfModel, load_gltf_from_slice};

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn render_device() -> RenderDevice {
    let _ = env_logger::builder().is_test(true).try_init();
    let gfx = HeadlessDevice::new(16, 16).expect("headless device");
    RenderDevice::new(Box::new(gfx), DeviceSettings::default()).expect("render device")
}

fn base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Cube geometry: 8 corner positions followed by 36 `u32` indices.
fn cube_buffer() -> (Vec<u8>, usize, usize) {
    let mut bytes = Vec::new();
    for i in 0..8u32 {
        for axis in 0..3 {
            let v: f32 = if i & (1 << axis) == 0 { -1.0 } else { 1.0 };
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }
    let positions_len = bytes.len();
    let indices: [u32; 36] = [
        0, 2, 1, 1, 2, 3, 4, 5, 6, 5, 7, 6, 0, 1, 4, 1, 5, 4, 2, 6, 3, 3, 6, 7, 0, 4, 2, 2, 4, 6, 1,
        3, 5, 3, 7, 5,
    ];
    for index in indices {
        bytes.extend_from_slice(&index.to_le_bytes());
    }
    let indices_len = bytes.len() - positions_len;
    (bytes, positions_len, indices_len)
}

fn png_data_uri() -> String {
    let image = ImageBuffer::from_pixel(2, 2, Rgba([255u8, 128, 0, 255]));
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png).expect("png encode");
    format!("data:image/png;base64,{}", base64(png.get_ref()))
}

struct CubeDoc {
    /// `"material": 0` on the primitive, or nothing
    with_material: bool,
    image_uri: String,
    /// Attribute semantic the geometry accessor is bound to
    position_semantic: &'static str,
    /// Scale of the cube node
    scale: [f32; 3],
    /// glTF primitive topology, 4 for triangles
    mode: u32,
}

impl Default for CubeDoc {
    fn default() -> Self {
        Self {
            with_material: true,
            image_uri: png_data_uri(),
            position_semantic: "POSITION",
            scale: [1.0, 1.0, 1.0],
            mode: 4,
        }
    }
}

impl CubeDoc {
    fn json(&self) -> String {
        let (buffer, positions_len, indices_len) = cube_buffer();
        let material = if self.with_material { r#","material": 0"# } else { "" };
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "name": "Root", "translation": [0.0, 2.0, 0.0], "children": [1] }},
    {{ "name": "Cube", "mesh": 0, "translation": [1.0, 0.0, 0.0], "scale": {scale:?} }}
  ],
  "meshes": [{{
    "name": "CubeMesh",
    "primitives": [{{
      "attributes": {{ "{semantic}": 0 }},
      "indices": 1,
      "mode": {mode}{material}
    }}]
  }}],
  "materials": [{{
    "name": "Orange",
    "pbrMetallicRoughness": {{
      "baseColorFactor": [1.0, 0.5, 0.0, 1.0],
      "baseColorTexture": {{ "index": 0 }},
      "metallicFactor": 0.0,
      "roughnessFactor": 0.8
    }},
    "alphaMode": "BLEND",
    "doubleSided": true
  }}],
  "textures": [{{ "source": 0, "sampler": 0 }}],
  "images": [{{ "uri": "{image}" }}],
  "samplers": [{{ "magFilter": 9728, "minFilter": 9728, "wrapS": 33071, "wrapT": 10497 }}],
  "buffers": [{{
    "byteLength": {buffer_len},
    "uri": "data:application/octet-stream;base64,{buffer}"
  }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": {positions_len}, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": {positions_len}, "byteLength": {indices_len}, "target": 34963 }}
  ],
  "accessors": [
    {{
      "bufferView": 0, "componentType": 5126, "count": 8, "type": "VEC3",
      "min": [-1.0, -1.0, -1.0], "max": [1.0, 1.0, 1.0]
    }},
    {{ "bufferView": 1, "componentType": 5125, "count": 36, "type": "SCALAR" }}
  ]
}}"#,
            scale = self.scale,
            mode = self.mode,
            semantic = self.position_semantic,
            image = self.image_uri,
            buffer_len = buffer.len(),
            buffer = base64(&buffer),
        )
    }

    fn load(&self, world: &mut World, device: &mut RenderDevice) -> ember::Result<GltfModel> {
        load_gltf_from_slice(self.json().as_bytes(), Path::new("."), world, device)
    }
}

// ============================================================================
// Resources
// ============================================================================

#[test]
fn cube_document_imports_all_resources() {
    let mut device = render_device();
    let mut world = World::new();
    let model = CubeDoc::default().load(&mut world, &mut device).unwrap();

    assert_eq!(model.samplers.len(), 1);
    assert_eq!(model.textures.len(), 1);
    assert_eq!(model.materials.len(), 1);
    assert_eq!(model.meshes.len(), 1);
    assert_eq!(model.game_objects.len(), 2);
    assert_eq!(model.top_game_objects.len(), 1);
    assert_eq!(world.len(), 2);

    let mesh = model.meshes[0].as_ref().unwrap();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.index_count(), 36);
    assert_eq!(mesh.sub_meshes().len(), 1);
    let sub_mesh = &mesh.sub_meshes()[0];
    assert!(Rc::ptr_eq(&sub_mesh.material, &model.materials[0]));
    assert!(vec3_approx(sub_mesh.bounds.extents, Vec3::ONE));
}

#[test]
fn material_and_sampler_properties_are_converted() {
    let mut device = render_device();
    let mut world = World::new();
    let model = CubeDoc::default().load(&mut world, &mut device).unwrap();

    let material = &model.materials[0];
    assert_eq!(material.name, "Orange");
    assert_eq!(material.alpha_mode, AlphaMode::Blend);
    assert!(material.is_transparent());
    assert!(material.double_sided);
    assert_eq!(material.metallic_factor, 0.0);
    let texture = material.base_color_texture.as_ref().unwrap();
    assert!(Rc::ptr_eq(texture, &model.textures[0]));
    assert_eq!((texture.width(), texture.height()), (2, 2));

    let sampler = model.samplers[0].desc();
    assert_eq!(sampler.mag_filter, wgpu::FilterMode::Nearest);
    assert_eq!(sampler.address_mode_u, wgpu::AddressMode::ClampToEdge);
    assert_eq!(sampler.address_mode_v, wgpu::AddressMode::Repeat);
}

#[test]
fn primitive_without_material_gets_shared_default() {
    let mut device = render_device();
    let mut world = World::new();
    let doc = CubeDoc {
        with_material: false,
        ..Default::default()
    };
    let model = doc.load(&mut world, &mut device).unwrap();

    // The glTF material plus the appended default
    assert_eq!(model.materials.len(), 2);
    let default = &model.materials[1];
    assert_eq!(default.alpha_mode, AlphaMode::Opaque);
    let mesh = model.meshes[0].as_ref().unwrap();
    assert!(Rc::ptr_eq(&mesh.sub_meshes()[0].material, default));
}

#[test]
fn undecodable_image_falls_back_to_white() {
    let mut device = render_device();
    let mut world = World::new();
    let doc = CubeDoc {
        image_uri: "data:image/png;base64,AAAAAAAA".to_string(),
        ..Default::default()
    };
    let model = doc.load(&mut world, &mut device).unwrap();

    assert_eq!(model.textures.len(), 1);
    assert!(Rc::ptr_eq(&model.textures[0], device.white_texture()));
}

// ============================================================================
// Nodes
// ============================================================================

#[test]
fn node_hierarchy_and_transforms_are_applied() {
    let mut device = render_device();
    let mut world = World::new();
    let doc = CubeDoc {
        scale: [2.0, 2.0, 2.0],
        ..Default::default()
    };
    let model = doc.load(&mut world, &mut device).unwrap();

    let [root, cube] = [model.game_objects[0], model.game_objects[1]];
    assert_eq!(model.top_game_objects, vec![root]);
    assert_eq!(world.get(root).unwrap().name(), "Root");
    assert_eq!(world.parent(cube), Some(root));
    assert_eq!(world.children(root), &[cube]);

    assert!(vec3_approx(world.location(cube).unwrap(), Vec3::new(1.0, 2.0, 0.0)));
    assert!(vec3_approx(world.local_scale(cube).unwrap(), Vec3::splat(2.0)));

    let mesh_component = world.get_component::<MeshComponent>(cube).unwrap();
    assert!(Rc::ptr_eq(&mesh_component.mesh, model.meshes[0].as_ref().unwrap()));
    assert!(!world.has_component::<MeshComponent>(root));
}

#[test]
fn mesh_without_triangles_is_skipped() {
    let mut device = render_device();
    let mut world = World::new();
    let doc = CubeDoc {
        mode: 0,
        ..Default::default()
    };
    let model = doc.load(&mut world, &mut device).unwrap();

    assert_eq!(model.meshes.len(), 1);
    assert!(model.meshes[0].is_none());
    assert_eq!(model.game_objects.len(), 2);
    assert_eq!(world.len(), 2);

    let cube = model.game_objects[1];
    assert_eq!(world.get(cube).unwrap().name(), "Cube");
    assert!(!world.has_component::<MeshComponent>(cube));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn missing_position_attribute_is_an_error() {
    let mut device = render_device();
    let mut world = World::new();
    let doc = CubeDoc {
        position_semantic: "NORMAL",
        ..Default::default()
    };

    let err = doc.load(&mut world, &mut device).unwrap_err();
    assert!(
        matches!(&err, EmberError::MissingAttribute { attribute: "POSITION", mesh } if mesh == "CubeMesh"),
        "unexpected error: {err}"
    );
}

#[test]
fn zero_scale_node_is_rejected() {
    let mut device = render_device();
    let mut world = World::new();
    let doc = CubeDoc {
        scale: [1.0, 0.0, 1.0],
        ..Default::default()
    };

    let root = world.spawn("existing");

    assert!(matches!(
        doc.load(&mut world, &mut device),
        Err(EmberError::DegenerateMatrix { column: 1 })
    ));
    assert_eq!(world.len(), 1);
    assert_eq!(world.roots().collect::<Vec<_>>(), vec![root]);
}

#[test]
fn malformed_json_is_a_gltf_error() {
    let mut device = render_device();
    let mut world = World::new();
    let result = load_gltf_from_slice(b"{ not gltf", Path::new("."), &mut world, &mut device);
    assert!(matches!(result, Err(EmberError::Gltf(_))));
    assert!(world.is_empty());
}
