//! Render Objects
//!
//! Flattened, draw-ready records built fresh every frame: one per sub-mesh
//! of every mesh component in the world.

use std::cmp::Ordering;

use glam::{Mat4, Vec3};

use crate::core::Bounds;
use crate::gfx::BufferHandle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderObject {
    pub vertex_buffer: BufferHandle,
    pub vertex_buffer_address: u64,
    pub index_buffer: BufferHandle,
    pub index_offset: u32,
    pub index_count: u32,
    pub bounds: Bounds,
    pub material_gpu_address: u64,
    pub world_transform: Mat4,
}

impl RenderObject {
    #[inline]
    #[must_use]
    pub fn world_location(&self) -> Vec3 {
        self.world_transform.w_axis.truncate()
    }

    #[inline]
    #[must_use]
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.world_location().distance(point)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderList {
    pub objects: Vec<RenderObject>,
}

impl RenderList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, object: RenderObject) {
        self.objects.push(object);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderObject> {
        self.objects.iter()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Groups draws by material, then by index buffer, to minimize rebinding.
    pub fn sort_opaque(&mut self) {
        self.objects.sort_unstable_by_key(|o| (o.material_gpu_address, o.index_buffer));
    }

    /// Orders draws back to front from `camera_location`.
    pub fn sort_transparent(&mut self, camera_location: Vec3) {
        self.objects.sort_by(|a, b| {
            let da = a.distance_to(camera_location);
            let db = b.distance_to(camera_location);
            db.partial_cmp(&da).unwrap_or(Ordering::Equal)
        });
    }

    /// World matrices in list order, ready for a single upload.
    #[must_use]
    pub fn world_transforms(&self) -> Vec<Mat4> {
        self.objects.iter().map(|o| o.world_transform).collect()
    }
}

impl<'a> IntoIterator for &'a RenderList {
    type Item = &'a RenderObject;
    type IntoIter = std::slice::Iter<'a, RenderObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}
