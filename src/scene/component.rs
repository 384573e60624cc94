//! Component System
//!
//! Behaviour is attached to game objects as boxed [`Component`] trait
//! objects. Lookup is by concrete type, so new behaviours never require
//! touching [`GameObject`](crate::scene::GameObject).
//!
//! Hooks receive a [`ComponentContext`] carrying the world, the owner handle
//! and the frame input. Nothing is fetched from global state.
//!
//! While a hook runs, its component is swapped out of the owner's list for
//! a placeholder, so the hook may freely mutate the world (including the
//! owner's other components).

use std::any::Any;

use crate::app::input::Input;
use crate::scene::GameObjectHandle;
use crate::scene::world::World;

/// Type-erased access for downcasting components.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-object behaviour with lifecycle hooks.
///
/// - `on_create`: once, right after the component is attached
/// - `update`: once per [`World::update`] for every live component, in object order
/// - `on_destroy`: once, before the component is detached; the owner may be
///   stale by the time the world finishes tearing it down
pub trait Component: AsAny {
    fn on_create(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn update(&mut self, _ctx: &mut ComponentContext<'_>, _dt: f32) {}

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {}
}

/// Everything a component hook may touch.
pub struct ComponentContext<'a> {
    pub world: &'a mut World,
    pub owner: GameObjectHandle,
    input: Option<&'a Input>,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(world: &'a mut World, owner: GameObjectHandle, input: Option<&'a Input>) -> Self {
        Self { world, owner, input }
    }

    /// Frame input. Only present during [`World::update`].
    #[must_use]
    pub fn input(&self) -> Option<&'a Input> {
        self.input
    }
}

#[inline]
pub(crate) fn downcast_ref<T: Component>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

#[inline]
pub(crate) fn downcast_mut<T: Component>(component: &mut dyn Component) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

#[inline]
pub(crate) fn is<T: Component>(component: &dyn Component) -> bool {
    component.as_any().is::<T>()
}

/// Stand-in occupying a component's slot while one of its hooks runs.
pub(crate) struct Detached(pub(crate) u64);

impl Component for Detached {}
