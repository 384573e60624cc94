//! World
//!
//! Owns every [`GameObject`] in a slot-indexed store and is the only place
//! the scene graph is mutated.
//!
//! # Guarantees
//!
//! - Handles are weak. Any query on a destroyed object returns `None` and any
//!   mutation is a no-op.
//! - World matrices are recomputed eagerly: after `set_parent`,
//!   `set_location` or any other transform setter returns, the object and all
//!   of its descendants hold up-to-date world matrices.
//! - Reparenting never creates a cycle; requests that would are rejected
//!   with a warning.

use glam::{Mat4, Quat, Vec3};

use crate::app::input::Input;
use crate::core::{ObjectStore, math};
use crate::scene::GameObjectHandle;
use crate::scene::component::{self, Component, ComponentContext, Detached};
use crate::scene::game_object::GameObject;
use crate::scene::transform_system;

/// Outcome of running a hook on a temporarily detached component.
enum HookOutcome {
    /// Put back into the owner's list at this index.
    Reattached(usize),
    /// The owner disappeared while the hook ran.
    Orphaned(Box<dyn Component>),
    /// Nothing ran: stale owner or index.
    Skipped,
}

pub struct World {
    objects: ObjectStore<GameObjectHandle, GameObject>,
    next_detach_token: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: ObjectStore::new(),
            next_detach_token: 0,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Creates a root object with the given local transform.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        location: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) -> GameObjectHandle {
        let name = name.into();
        let handle = self
            .objects
            .emplace_with(|handle| GameObject::new(handle, name, location, rotation, scale));
        log::trace!("Created game object {handle:?}");
        handle
    }

    /// Creates a root object with an identity transform.
    pub fn spawn(&mut self, name: impl Into<String>) -> GameObjectHandle {
        self.create(name, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }

    /// Destroys `handle` and its whole subtree.
    ///
    /// Children go first (post-order), then every component of the object
    /// receives `on_destroy`, then the object is unlinked and its slot freed.
    pub fn destroy(&mut self, handle: GameObjectHandle) {
        let children = match self.objects.get_mut(handle) {
            Some(node) if !node.destroying => {
                node.destroying = true;
                node.children.clone()
            }
            _ => return,
        };

        for child in children {
            self.destroy(child);
        }

        let mut index = 0;
        loop {
            let Some(node) = self.objects.get(handle) else {
                return;
            };
            if index >= node.components.len() {
                break;
            }
            index = match self.run_hook(handle, index, None, |c, ctx| c.on_destroy(ctx)) {
                HookOutcome::Reattached(position) => position + 1,
                HookOutcome::Orphaned(_) | HookOutcome::Skipped => return,
            };
        }

        if let Some(parent) = self.objects.get(handle).and_then(|node| node.parent)
            && let Some(parent_node) = self.objects.get_mut(parent)
        {
            parent_node.children.retain(|&c| c != handle);
        }
        self.objects.erase(handle);
        log::trace!("Destroyed game object {handle:?}");
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self, handle: GameObjectHandle) -> bool {
        self.objects.is_valid(handle)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, handle: GameObjectHandle) -> Option<&GameObject> {
        self.objects.get(handle)
    }

    /// Live objects in store order.
    pub fn iter(&self) -> impl Iterator<Item = (GameObjectHandle, &GameObject)> {
        self.objects.iter()
    }

    /// Objects without a parent.
    pub fn roots(&self) -> impl Iterator<Item = GameObjectHandle> + '_ {
        self.objects
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(handle, _)| handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn set_name(&mut self, handle: GameObjectHandle, name: impl Into<String>) {
        if let Some(node) = self.objects.get_mut(handle) {
            node.name = name.into();
        }
    }

    /// Runs `update(dt)` on every component of every live object, in store order.
    pub fn update(&mut self, dt: f32, input: &Input) {
        for handle in self.objects.keys() {
            let mut index = 0;
            loop {
                let Some(node) = self.objects.get(handle) else {
                    break;
                };
                if index >= node.components.len() {
                    break;
                }
                match self.run_hook(handle, index, Some(input), |c, ctx| c.update(ctx, dt)) {
                    HookOutcome::Reattached(position) => index = position + 1,
                    HookOutcome::Orphaned(mut component) => {
                        // The component tore down its own owner; it never saw on_destroy.
                        let mut ctx = ComponentContext::new(self, handle, Some(input));
                        component.on_destroy(&mut ctx);
                        break;
                    }
                    HookOutcome::Skipped => break,
                }
            }
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    #[must_use]
    pub fn parent(&self, handle: GameObjectHandle) -> Option<GameObjectHandle> {
        self.objects.get(handle).and_then(|node| node.parent)
    }

    #[must_use]
    pub fn children(&self, handle: GameObjectHandle) -> &[GameObjectHandle] {
        self.objects
            .get(handle)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Returns `true` if `ancestor` appears on the parent chain of `handle`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: GameObjectHandle, handle: GameObjectHandle) -> bool {
        let mut current = self.parent(handle);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Moves `child` under `new_parent` (`None` makes it a root).
    ///
    /// The local transform is kept; world matrices of the moved subtree are
    /// recomputed before returning.
    pub fn set_parent(&mut self, child: GameObjectHandle, new_parent: Option<GameObjectHandle>) {
        if !self.objects.is_valid(child) {
            return;
        }
        if let Some(parent) = new_parent {
            if !self.objects.is_valid(parent) {
                log::warn!("set_parent: parent {parent:?} is not a live object");
                return;
            }
            if parent == child || self.is_ancestor(child, parent) {
                log::warn!("set_parent: attaching {child:?} under {parent:?} would create a cycle");
                return;
            }
        }
        if self.parent(child) == new_parent {
            return;
        }

        // 1. Unlink from the old parent
        if let Some(old_parent) = self.parent(child)
            && let Some(old_node) = self.objects.get_mut(old_parent)
        {
            old_node.children.retain(|&c| c != child);
        }

        // 2. Link into the new parent
        if let Some(parent) = new_parent
            && let Some(parent_node) = self.objects.get_mut(parent)
        {
            parent_node.children.push(child);
        }
        if let Some(node) = self.objects.get_mut(child) {
            node.parent = new_parent;
        }

        // 3. Cascade
        transform_system::update_subtree(&mut self.objects, child);
    }

    pub fn add_child(&mut self, parent: GameObjectHandle, child: GameObjectHandle) {
        self.set_parent(child, Some(parent));
    }

    /// Detaches `child` from `parent`; its local transform becomes its world transform.
    pub fn remove_child(&mut self, parent: GameObjectHandle, child: GameObjectHandle) {
        if self.parent(child) == Some(parent) {
            self.set_parent(child, None);
        }
    }

    // ========================================================================
    // Transform: queries
    // ========================================================================

    /// World matrix.
    #[must_use]
    pub fn matrix(&self, handle: GameObjectHandle) -> Option<Mat4> {
        self.objects.get(handle).map(GameObject::matrix)
    }

    #[must_use]
    pub fn local_matrix(&self, handle: GameObjectHandle) -> Option<Mat4> {
        self.objects.get(handle).map(|node| *node.transform.local_matrix())
    }

    /// World location.
    #[must_use]
    pub fn location(&self, handle: GameObjectHandle) -> Option<Vec3> {
        self.objects.get(handle).map(GameObject::location)
    }

    /// World rotation.
    #[must_use]
    pub fn rotation(&self, handle: GameObjectHandle) -> Option<Quat> {
        self.objects.get(handle).map(GameObject::rotation)
    }

    /// World scale.
    #[must_use]
    pub fn scale(&self, handle: GameObjectHandle) -> Option<Vec3> {
        self.objects.get(handle).map(GameObject::scale)
    }

    #[must_use]
    pub fn local_location(&self, handle: GameObjectHandle) -> Option<Vec3> {
        self.objects.get(handle).map(|node| node.transform.location())
    }

    #[must_use]
    pub fn local_rotation(&self, handle: GameObjectHandle) -> Option<Quat> {
        self.objects.get(handle).map(|node| node.transform.rotation())
    }

    #[must_use]
    pub fn local_scale(&self, handle: GameObjectHandle) -> Option<Vec3> {
        self.objects.get(handle).map(|node| node.transform.scale())
    }

    #[must_use]
    pub fn forward(&self, handle: GameObjectHandle) -> Option<Vec3> {
        self.objects.get(handle).map(GameObject::forward)
    }

    #[must_use]
    pub fn right(&self, handle: GameObjectHandle) -> Option<Vec3> {
        self.objects.get(handle).map(GameObject::right)
    }

    #[must_use]
    pub fn up(&self, handle: GameObjectHandle) -> Option<Vec3> {
        self.objects.get(handle).map(GameObject::up)
    }

    // ========================================================================
    // Transform: local setters
    // ========================================================================

    pub fn set_local_location(&mut self, handle: GameObjectHandle, location: Vec3) {
        if let Some(node) = self.objects.get_mut(handle)
            && node.transform.set_location(location)
        {
            transform_system::update_subtree(&mut self.objects, handle);
        }
    }

    pub fn set_local_rotation(&mut self, handle: GameObjectHandle, rotation: Quat) {
        if let Some(node) = self.objects.get_mut(handle)
            && node.transform.set_rotation(rotation)
        {
            transform_system::update_subtree(&mut self.objects, handle);
        }
    }

    pub fn set_local_scale(&mut self, handle: GameObjectHandle, scale: Vec3) {
        if let Some(node) = self.objects.get_mut(handle)
            && node.transform.set_scale(scale)
        {
            transform_system::update_subtree(&mut self.objects, handle);
        }
    }

    /// Stores `matrix` as the local matrix; TRS is derived from it on demand.
    pub fn set_local_matrix(&mut self, handle: GameObjectHandle, matrix: Mat4) {
        if let Some(node) = self.objects.get_mut(handle) {
            node.transform.set_local_matrix(matrix);
            transform_system::update_subtree(&mut self.objects, handle);
        }
    }

    // ========================================================================
    // Transform: world-space setters
    // ========================================================================

    fn parent_world_matrix(&self, handle: GameObjectHandle) -> Option<Mat4> {
        self.parent(handle).and_then(|parent| self.matrix(parent))
    }

    pub fn set_location(&mut self, handle: GameObjectHandle, location: Vec3) {
        let local = match self.parent_world_matrix(handle) {
            Some(parent) => parent.inverse().transform_point3(location),
            None => location,
        };
        self.set_local_location(handle, local);
    }

    pub fn set_rotation(&mut self, handle: GameObjectHandle, rotation: Quat) {
        let local = match self.parent_world_matrix(handle) {
            Some(parent) => (math::decompose_rotation(&parent).inverse() * rotation).normalize(),
            None => rotation,
        };
        self.set_local_rotation(handle, local);
    }

    pub fn set_scale(&mut self, handle: GameObjectHandle, scale: Vec3) {
        let local = match self.parent_world_matrix(handle) {
            Some(parent) => scale * math::reciprocal(math::decompose_scale(&parent)),
            None => scale,
        };
        self.set_local_scale(handle, local);
    }

    /// Sets the world matrix; the local matrix becomes `inverse(parent) * matrix`.
    pub fn set_matrix(&mut self, handle: GameObjectHandle, matrix: Mat4) {
        let local = match self.parent_world_matrix(handle) {
            Some(parent) => parent.inverse() * matrix,
            None => matrix,
        };
        self.set_local_matrix(handle, local);
    }

    /// Places the object at `eye` facing `target`.
    pub fn look_at(&mut self, handle: GameObjectHandle, eye: Vec3, target: Vec3, up: Vec3) {
        let forward = target - eye;
        if forward.length_squared() < 1e-12 || forward.cross(up).length_squared() < 1e-12 {
            return;
        }
        let world = Mat4::look_at_lh(eye, target, up).inverse();
        self.set_location(handle, eye);
        self.set_rotation(handle, math::decompose_rotation(&world));
    }

    /// Keeps the current location and faces along `direction`.
    pub fn set_look_direction(&mut self, handle: GameObjectHandle, direction: Vec3, up: Vec3) {
        if let Some(eye) = self.location(handle) {
            self.look_at(handle, eye, eye + direction, up);
        }
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Attaches `component` and runs its `on_create`.
    ///
    /// Returns `None` when the handle is stale or the component's own
    /// `on_create` removed it again.
    pub fn add_component<C: Component>(&mut self, handle: GameObjectHandle, component: C) -> Option<&mut C> {
        let index = {
            let node = self.objects.get_mut(handle)?;
            node.components.push(Box::new(component));
            node.components.len() - 1
        };

        let position = match self.run_hook(handle, index, None, |c, ctx| c.on_create(ctx)) {
            HookOutcome::Reattached(position) => position,
            HookOutcome::Orphaned(mut component) => {
                let mut ctx = ComponentContext::new(self, handle, None);
                component.on_destroy(&mut ctx);
                return None;
            }
            HookOutcome::Skipped => return None,
        };

        let node = self.objects.get_mut(handle)?;
        component::downcast_mut::<C>(node.components.get_mut(position)?.as_mut())
    }

    /// First component of type `T`.
    #[must_use]
    pub fn get_component<T: Component>(&self, handle: GameObjectHandle) -> Option<&T> {
        self.objects
            .get(handle)?
            .components
            .iter()
            .find_map(|c| component::downcast_ref::<T>(c.as_ref()))
    }

    pub fn get_component_mut<T: Component>(&mut self, handle: GameObjectHandle) -> Option<&mut T> {
        self.objects
            .get_mut(handle)?
            .components
            .iter_mut()
            .find_map(|c| component::downcast_mut::<T>(c.as_mut()))
    }

    /// All components of type `T`, in attach order.
    #[must_use]
    pub fn get_components<T: Component>(&self, handle: GameObjectHandle) -> Vec<&T> {
        self.objects.get(handle).map_or_else(Vec::new, |node| {
            node.components
                .iter()
                .filter_map(|c| component::downcast_ref::<T>(c.as_ref()))
                .collect()
        })
    }

    #[must_use]
    pub fn has_component<T: Component>(&self, handle: GameObjectHandle) -> bool {
        self.get_component::<T>(handle).is_some()
    }

    /// Removes every component whose concrete type is `T`, running `on_destroy` on each first.
    ///
    /// Returns the number of components removed.
    pub fn remove_components<T: Component>(&mut self, handle: GameObjectHandle) -> usize {
        let mut removed = 0;
        let mut index = 0;
        loop {
            let Some(node) = self.objects.get(handle) else {
                break;
            };
            let Some(offset) = node.components[index.min(node.components.len())..]
                .iter()
                .position(|c| component::is::<T>(c.as_ref()))
            else {
                break;
            };
            let target = index + offset;

            match self.run_hook(handle, target, None, |c, ctx| c.on_destroy(ctx)) {
                HookOutcome::Reattached(position) => {
                    if let Some(node) = self.objects.get_mut(handle) {
                        node.components.remove(position);
                    }
                    removed += 1;
                    index = position;
                }
                HookOutcome::Orphaned(_) => {
                    removed += 1;
                    break;
                }
                HookOutcome::Skipped => break,
            }
        }
        removed
    }

    /// Swaps the component at `index` for a placeholder, runs `hook` with
    /// full world access, then puts the component back where the
    /// placeholder ended up.
    fn run_hook(
        &mut self,
        owner: GameObjectHandle,
        index: usize,
        input: Option<&Input>,
        hook: impl FnOnce(&mut dyn Component, &mut ComponentContext<'_>),
    ) -> HookOutcome {
        let token = self.next_detach_token;
        self.next_detach_token += 1;

        let Some(slot) = self
            .objects
            .get_mut(owner)
            .and_then(|node| node.components.get_mut(index))
        else {
            return HookOutcome::Skipped;
        };
        let mut component = std::mem::replace(slot, Box::new(Detached(token)));

        {
            let mut ctx = ComponentContext::new(self, owner, input);
            hook(component.as_mut(), &mut ctx);
        }

        let Some(node) = self.objects.get_mut(owner) else {
            return HookOutcome::Orphaned(component);
        };
        let placeholder = node.components.iter().position(|c| {
            component::downcast_ref::<Detached>(c.as_ref()).is_some_and(|d| d.0 == token)
        });
        match placeholder {
            Some(position) => {
                node.components[position] = component;
                HookOutcome::Reattached(position)
            }
            // The owner was torn down and its slot reused while the hook ran.
            None => HookOutcome::Orphaned(component),
        }
    }
}

impl Drop for World {
    fn drop(&mut self) {
        let roots: Vec<GameObjectHandle> = self.roots().collect();
        for root in roots {
            self.destroy(root);
        }
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World").field("objects", &self.objects.len()).finish()
    }
}
