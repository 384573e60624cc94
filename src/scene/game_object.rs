use glam::{Mat4, Quat, Vec3};

use crate::core::math;
use crate::scene::GameObjectHandle;
use crate::scene::component::Component;
use crate::scene::transform::Transform;

/// A node of the world's scene graph.
///
/// # Hierarchy
///
/// - `parent`: handle of the parent object (`None` for roots)
/// - `children`: ordered child handles
///
/// Both directions are plain handles; the [`World`](crate::scene::World)
/// owns the storage, so the graph cannot form ownership cycles.
///
/// # Transform
///
/// Local TRS and cached matrices live in [`Transform`]. Mutation goes through
/// the world so the change cascades to descendants before the call returns.
pub struct GameObject {
    pub(crate) handle: GameObjectHandle,
    pub(crate) name: String,

    // === Core Hierarchy ===
    pub(crate) parent: Option<GameObjectHandle>,
    pub(crate) children: Vec<GameObjectHandle>,

    // === Behaviour ===
    pub(crate) components: Vec<Box<dyn Component>>,

    // === Core Spatial Data ===
    pub(crate) transform: Transform,

    pub(crate) destroying: bool,
}

impl GameObject {
    pub(crate) fn new(
        handle: GameObjectHandle,
        name: impl Into<String>,
        location: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) -> Self {
        Self {
            handle,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
            transform: Transform::new(location, rotation, scale),
            destroying: false,
        }
    }

    /// Handle this object was stored under.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> GameObjectHandle {
        self.handle
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<GameObjectHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[GameObjectHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    // === World-space queries ===

    #[inline]
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        *self.transform.world_matrix()
    }

    #[inline]
    #[must_use]
    pub fn location(&self) -> Vec3 {
        math::decompose_translation(self.transform.world_matrix())
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        math::decompose_rotation(self.transform.world_matrix())
    }

    #[must_use]
    pub fn scale(&self) -> Vec3 {
        math::decompose_scale(self.transform.world_matrix())
    }

    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation() * math::FORWARD
    }

    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation() * math::RIGHT
    }

    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation() * math::UP
    }
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameObject")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("components", &self.components.len())
            .field("transform", &self.transform)
            .finish_non_exhaustive()
    }
}
