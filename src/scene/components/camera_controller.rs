//! Camera controllers
//!
//! Both controllers keep pitch/yaw angles and rebuild the owner's world
//! rotation every frame as `yaw(UP) * pitch(RIGHT)`.

use glam::{Quat, Vec2, Vec3};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::core::math::{RIGHT, UP};
use crate::scene::component::{Component, ComponentContext};

fn pitch_yaw_rotation(pitch: f32, yaw: f32) -> Quat {
    let pitch_rotation = Quat::from_axis_angle(RIGHT, pitch);
    let yaw_rotation = Quat::from_axis_angle(UP, yaw);
    yaw_rotation * pitch_rotation
}

// ============================================================================
// Fly
// ============================================================================

/// Free-flying camera: hold the right mouse button to look, WASD to move.
#[derive(Debug, Clone)]
pub struct FlyCameraController {
    pub pitch: f32,
    pub yaw: f32,
    /// Radians per pixel of cursor movement
    pub look_sensitivity: f32,
    /// Units per second
    pub move_speed: f32,
}

impl Default for FlyCameraController {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            yaw: 0.0,
            look_sensitivity: 0.001,
            move_speed: 10.0,
        }
    }
}

impl Component for FlyCameraController {
    fn update(&mut self, ctx: &mut ComponentContext<'_>, dt: f32) {
        let Some(input) = ctx.input() else {
            return;
        };
        let owner = ctx.owner;

        let mouse_delta = input.cursor_delta;
        if input.is_button_pressed(MouseButton::Right) && mouse_delta.length() > 0.0 {
            let delta = mouse_delta * self.look_sensitivity;
            self.pitch += delta.y;
            self.yaw += delta.x;
        }

        let mut move_axis = Vec2::ZERO;
        if input.is_key_down(KeyCode::KeyW) {
            move_axis.x += 1.0;
        }
        if input.is_key_down(KeyCode::KeyS) {
            move_axis.x -= 1.0;
        }
        if input.is_key_down(KeyCode::KeyD) {
            move_axis.y += 1.0;
        }
        if input.is_key_down(KeyCode::KeyA) {
            move_axis.y -= 1.0;
        }

        ctx.world.set_rotation(owner, pitch_yaw_rotation(self.pitch, self.yaw));

        if move_axis.length() > 0.0 {
            let (Some(forward), Some(right), Some(location)) = (
                ctx.world.forward(owner),
                ctx.world.right(owner),
                ctx.world.location(owner),
            ) else {
                return;
            };
            let direction = (forward * move_axis.x + right * move_axis.y).normalize_or_zero();
            ctx.world
                .set_location(owner, location + direction * self.move_speed * dt);
        }
    }
}

// ============================================================================
// Orbit
// ============================================================================

/// Orbits a pivot: hold the left mouse button to rotate, scroll to zoom.
#[derive(Debug, Clone)]
pub struct OrbitCameraController {
    pub pivot: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per pixel of cursor movement
    pub look_sensitivity: f32,
    /// Distance per scroll line
    pub scroll_sensitivity: f32,
}

impl Default for OrbitCameraController {
    fn default() -> Self {
        Self {
            pivot: Vec3::ZERO,
            pitch: 0.0,
            yaw: 0.0,
            distance: 20.0,
            min_distance: 1.0,
            max_distance: 100.0,
            look_sensitivity: 0.001,
            scroll_sensitivity: 1.0,
        }
    }
}

impl OrbitCameraController {
    #[must_use]
    pub fn new(pivot: Vec3, distance: f32) -> Self {
        Self {
            pivot,
            distance,
            ..Default::default()
        }
    }
}

impl Component for OrbitCameraController {
    fn update(&mut self, ctx: &mut ComponentContext<'_>, _dt: f32) {
        let Some(input) = ctx.input() else {
            return;
        };
        let owner = ctx.owner;

        let mouse_delta = input.cursor_delta;
        if input.is_button_pressed(MouseButton::Left) && mouse_delta.length() > 0.0 {
            let delta = mouse_delta * self.look_sensitivity;
            self.pitch += delta.y;
            self.yaw += delta.x;
        }

        if input.scroll_delta.length() > 0.0 {
            self.distance -= input.scroll_delta.y * self.scroll_sensitivity;
        }
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);

        ctx.world.set_rotation(owner, pitch_yaw_rotation(self.pitch, self.yaw));
        if let Some(forward) = ctx.world.forward(owner) {
            ctx.world.set_location(owner, self.pivot - forward * self.distance);
        }
    }
}
