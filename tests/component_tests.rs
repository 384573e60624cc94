//! Component Tests
//!
//! Tests for:
//! - on_create / update / on_destroy hook counts
//! - Typed lookup and removal
//! - Hooks mutating the world (spawning, destroying the owner)
//! - Camera controllers driven by Input

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::{Vec2, Vec3};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

use ember::app::Input;
use ember::scene::{
    CameraComponent, Component, ComponentContext, FlyCameraController, GameObjectHandle,
    OrbitCameraController, World,
};

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

#[derive(Default)]
struct Counters {
    created: Cell<u32>,
    updated: Cell<u32>,
    destroyed: Cell<u32>,
}

struct Recorder {
    counters: Rc<Counters>,
}

impl Recorder {
    fn new() -> (Self, Rc<Counters>) {
        let counters = Rc::new(Counters::default());
        (
            Self {
                counters: Rc::clone(&counters),
            },
            counters,
        )
    }
}

impl Component for Recorder {
    fn on_create(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.counters.created.set(self.counters.created.get() + 1);
    }

    fn update(&mut self, _ctx: &mut ComponentContext<'_>, _dt: f32) {
        self.counters.updated.set(self.counters.updated.get() + 1);
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.counters.destroyed.set(self.counters.destroyed.get() + 1);
    }
}

struct Tag(u32);

impl Component for Tag {}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn hooks_run_once_each() {
    let mut world = World::new();
    let node = world.spawn("node");
    let (recorder, counters) = Recorder::new();
    assert!(world.add_component(node, recorder).is_some());
    assert_eq!(counters.created.get(), 1);

    let input = Input::new();
    world.update(0.016, &input);
    world.update(0.016, &input);
    assert_eq!(counters.updated.get(), 2);

    world.destroy(node);
    assert_eq!(counters.destroyed.get(), 1);
    assert_eq!(counters.created.get(), 1);
}

#[test]
fn destroying_parent_destroys_child_components() {
    let mut world = World::new();
    let parent = world.spawn("parent");
    let child = world.spawn("child");
    world.add_child(parent, child);

    let (recorder, counters) = Recorder::new();
    world.add_component(child, recorder);

    world.destroy(parent);
    assert_eq!(counters.destroyed.get(), 1);
}

#[test]
fn dropping_world_runs_on_destroy() {
    let mut world = World::new();
    let node = world.spawn("node");
    let (recorder, counters) = Recorder::new();
    world.add_component(node, recorder);

    drop(world);
    assert_eq!(counters.destroyed.get(), 1);
}

#[test]
fn add_component_to_stale_handle_fails() {
    let mut world = World::new();
    let node = world.spawn("node");
    world.destroy(node);

    let (recorder, counters) = Recorder::new();
    assert!(world.add_component(node, recorder).is_none());
    assert_eq!(counters.created.get(), 0);
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn components_are_found_by_type() {
    let mut world = World::new();
    let node = world.spawn("node");
    world.add_component(node, Tag(1));
    world.add_component(node, CameraComponent::default());
    world.add_component(node, Tag(2));

    assert_eq!(world.get_component::<Tag>(node).map(|t| t.0), Some(1));
    let tags: Vec<u32> = world.get_components::<Tag>(node).iter().map(|t| t.0).collect();
    assert_eq!(tags, vec![1, 2]);
    assert!(world.has_component::<CameraComponent>(node));
    assert!(!world.has_component::<FlyCameraController>(node));
    assert_eq!(world.get(node).unwrap().component_count(), 3);

    world.get_component_mut::<Tag>(node).unwrap().0 = 10;
    assert_eq!(world.get_component::<Tag>(node).map(|t| t.0), Some(10));
}

#[test]
fn remove_components_runs_on_destroy_for_each() {
    let mut world = World::new();
    let node = world.spawn("node");
    let (first, first_counters) = Recorder::new();
    let (second, second_counters) = Recorder::new();
    world.add_component(node, first);
    world.add_component(node, Tag(7));
    world.add_component(node, second);

    assert_eq!(world.remove_components::<Recorder>(node), 2);
    assert_eq!(first_counters.destroyed.get(), 1);
    assert_eq!(second_counters.destroyed.get(), 1);
    assert!(!world.has_component::<Recorder>(node));
    assert_eq!(world.get_component::<Tag>(node).map(|t| t.0), Some(7));

    // Removed components are not destroyed again with the object
    world.destroy(node);
    assert_eq!(first_counters.destroyed.get(), 1);
}

// ============================================================================
// Hooks with world access
// ============================================================================

/// Spawns a child on creation and moves its owner every update.
struct Mover {
    spawned: Rc<RefCell<Option<GameObjectHandle>>>,
    velocity: Vec3,
}

impl Component for Mover {
    fn on_create(&mut self, ctx: &mut ComponentContext<'_>) {
        let child = ctx.world.spawn("spawned");
        ctx.world.add_child(ctx.owner, child);
        *self.spawned.borrow_mut() = Some(child);
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, dt: f32) {
        if let Some(location) = ctx.world.location(ctx.owner) {
            ctx.world.set_location(ctx.owner, location + self.velocity * dt);
        }
    }
}

#[test]
fn hooks_can_mutate_the_world() {
    let mut world = World::new();
    let node = world.spawn("node");
    let spawned = Rc::new(RefCell::new(None));
    world.add_component(
        node,
        Mover {
            spawned: Rc::clone(&spawned),
            velocity: Vec3::new(2.0, 0.0, 0.0),
        },
    );

    let child = spawned.borrow().unwrap();
    assert_eq!(world.parent(child), Some(node));

    world.update(0.5, &Input::new());
    assert!(vec3_approx(world.location(node).unwrap(), Vec3::new(1.0, 0.0, 0.0)));
    assert!(vec3_approx(world.location(child).unwrap(), Vec3::new(1.0, 0.0, 0.0)));
}

/// Destroys its own owner on the first update.
struct SelfDestruct {
    counters: Rc<Counters>,
}

impl Component for SelfDestruct {
    fn update(&mut self, ctx: &mut ComponentContext<'_>, _dt: f32) {
        self.counters.updated.set(self.counters.updated.get() + 1);
        ctx.world.destroy(ctx.owner);
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.counters.destroyed.set(self.counters.destroyed.get() + 1);
    }
}

#[test]
fn component_may_destroy_its_owner() {
    let mut world = World::new();
    let doomed = world.spawn("doomed");
    let survivor = world.spawn("survivor");

    let counters = Rc::new(Counters::default());
    world.add_component(
        doomed,
        SelfDestruct {
            counters: Rc::clone(&counters),
        },
    );
    let (recorder, recorder_counters) = Recorder::new();
    world.add_component(doomed, recorder);
    let (other, other_counters) = Recorder::new();
    world.add_component(survivor, other);

    world.update(0.016, &Input::new());

    assert!(!world.is_valid(doomed));
    assert_eq!(counters.updated.get(), 1);
    assert_eq!(counters.destroyed.get(), 1);
    assert_eq!(recorder_counters.destroyed.get(), 1);
    assert_eq!(other_counters.updated.get(), 1);
}

// ============================================================================
// Camera controllers
// ============================================================================

#[test]
fn fly_controller_moves_forward_on_w() {
    let mut world = World::new();
    let camera = world.spawn("camera");
    world.add_component(camera, CameraComponent::default());
    world.add_component(
        camera,
        FlyCameraController {
            move_speed: 4.0,
            ..Default::default()
        },
    );

    let mut input = Input::new();
    input.handle_key(KeyCode::KeyW, ElementState::Pressed);
    world.update(0.5, &input);

    assert!(vec3_approx(world.location(camera).unwrap(), Vec3::new(0.0, 0.0, 2.0)));
}

#[test]
fn fly_controller_ignores_mouse_without_button() {
    let mut world = World::new();
    let camera = world.spawn("camera");
    world.add_component(camera, FlyCameraController::default());

    let mut input = Input::new();
    input.cursor_delta = Vec2::new(300.0, 0.0);
    world.update(0.016, &input);
    assert!(vec3_approx(world.forward(camera).unwrap(), Vec3::Z));

    input.handle_mouse_input(ElementState::Pressed, MouseButton::Right);
    world.update(0.016, &input);
    let controller = world.get_component::<FlyCameraController>(camera).unwrap();
    assert!((controller.yaw - 0.3).abs() < EPSILON);
    assert!(!vec3_approx(world.forward(camera).unwrap(), Vec3::Z));
}

#[test]
fn orbit_controller_keeps_distance_to_pivot() {
    let mut world = World::new();
    let camera = world.spawn("camera");
    let pivot = Vec3::new(1.0, 2.0, 3.0);
    world.add_component(camera, OrbitCameraController::new(pivot, 10.0));

    let mut input = Input::new();
    input.handle_mouse_input(ElementState::Pressed, MouseButton::Left);
    input.cursor_delta = Vec2::new(500.0, 200.0);
    world.update(0.016, &input);

    let location = world.location(camera).unwrap();
    assert!((location.distance(pivot) - 10.0).abs() < 1e-3);
    let forward = world.forward(camera).unwrap();
    assert!(vec3_approx((pivot - location).normalize(), forward));
}

#[test]
fn orbit_controller_clamps_zoom() {
    let mut world = World::new();
    let camera = world.spawn("camera");
    world.add_component(camera, OrbitCameraController::new(Vec3::ZERO, 5.0));

    let mut input = Input::new();
    input.scroll_delta = Vec2::new(0.0, 50.0);
    world.update(0.016, &input);

    let controller = world.get_component::<OrbitCameraController>(camera).unwrap();
    assert_eq!(controller.distance, controller.min_distance);
    assert!((world.location(camera).unwrap().length() - controller.min_distance).abs() < 1e-3);
}
