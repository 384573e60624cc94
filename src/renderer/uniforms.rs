//! GPU Binary Layouts
//!
//! Every struct here is read by shader code through a device address, so
//! field order and size are part of the shader interface. All blocks are
//! multiples of 16 bytes with no implicit padding; the size assertions at
//! the bottom pin the layouts.

use glam::{Mat4, Vec3, Vec4};

/// Maximum number of lights uploaded per frame; extra lights are dropped.
pub const MAX_LIGHTS: usize = 16;

/// Declares a `#[repr(C)]` Pod block with per-field defaults.
///
/// Fields without `= value` default through [`Default`].
macro_rules! define_gpu_struct {
    (
        $(#[$meta:meta])* struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $vis:vis $field_name:ident : $field_type:ty $(= $default_val:expr)?
            ),* $(,)?
        }
    ) => {
        #[repr(C)]
        #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
        $(#[$meta])*
        pub struct $name {
            $( $(#[$field_meta])* $vis $field_name : $field_type, )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $( $field_name: define_gpu_struct!(@val_or_default $field_type $(, $default_val)?), )*
                }
            }
        }
    };
    (@val_or_default $type:ty, $val:expr) => { $val };
    (@val_or_default $type:ty) => { <$type as Default>::default() };
}

define_gpu_struct!(
    /// One light as the lighting shader sees it.
    struct GpuLight {
        pub position: Vec3,
        pub light_type: u32,
        pub color: Vec3 = Vec3::ONE,
        pub intensity: f32 = 1.0,
        pub direction: Vec3 = Vec3::Z,
        pub range: f32,
        pub inner_cone_angle: f32,
        pub outer_cone_angle: f32,
        pub _pad: [f32; 2],
    }
);

impl GpuLight {
    pub const DIRECTIONAL: u32 = 0;
    pub const POINT: u32 = 1;
    pub const SPOT: u32 = 2;
}

define_gpu_struct!(
    struct GpuMaterial {
        pub base_color_factor: Vec4 = Vec4::ONE,
        pub metallic_factor: f32 = 1.0,
        pub roughness_factor: f32 = 1.0,
        /// Bindless texture indices.
        pub base_color_texture: u32,
        pub metallic_roughness_texture: u32,
        /// Non-zero for alpha-tested materials.
        pub alpha_mask: u32,
        pub alpha_cutoff: f32 = 0.5,
        pub _pad: [u32; 2],
    }
);

define_gpu_struct!(
    /// Per-object block; the renderer uploads these as tightly packed arrays.
    struct ObjectUniforms {
        pub model: Mat4 = Mat4::IDENTITY,
    }
);

define_gpu_struct!(
    /// Frame-wide data for the forward pass.
    struct GlobalUniforms {
        pub proj: Mat4 = Mat4::IDENTITY,
        pub view: Mat4 = Mat4::IDENTITY,
        pub light_view_proj: Mat4 = Mat4::IDENTITY,
        pub linear_sampler: u32,
        pub shadow_sampler: u32,
        pub shadow_map: u32,
        pub _pad: u32,
        pub ambient_light: Vec3,
        pub light_count: u32,
        pub lights: [GpuLight; MAX_LIGHTS],
    }
);

define_gpu_struct!(
    struct ShadowPassUniforms {
        pub light_view_proj: Mat4 = Mat4::IDENTITY,
    }
);

define_gpu_struct!(
    /// Device addresses pushed with every forward draw.
    struct ForwardPushConstants {
        pub per_frame: u64,
        pub per_object: u64,
        pub material: u64,
        pub vertex_buffer: u64,
    }
);

define_gpu_struct!(
    struct ShadowPushConstants {
        pub per_frame: u64,
        pub per_object: u64,
    }
);

const _: () = {
    assert!(size_of::<GpuLight>() == 64);
    assert!(size_of::<GpuMaterial>() == 48);
    assert!(size_of::<ObjectUniforms>() == 64);
    assert!(size_of::<GlobalUniforms>() == 1248);
    assert!(size_of::<ShadowPassUniforms>() == 64);
    assert!(size_of::<ForwardPushConstants>() == 32);
    assert!(size_of::<ShadowPushConstants>() == 16);
};
