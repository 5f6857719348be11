use std::f32::consts::{PI, TAU};

use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::config::InteractionSettings;
use crate::constants::{CAMERA_FOV_DEGREES, DEFAULT_DAMPING};

// keeps the camera off the poles, look_at breaks down there
const POLAR_EPSILON: f32 = 1e-6;

// camera component
// damped orbit around a target, the camera eases toward where the input put it
#[derive(Component, Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub radius: f32,
    pub theta: f32, // azimuth around +Y, measured from +Z
    pub phi: f32,   // polar angle from +Y
    pub damping: f32,
    pub rotate_speed: f32,
    pub fov: f32,

    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_radius: f32,
    pub max_radius: f32,

    pending_rotation: Vec2, // (theta, phi)
    pending_pan: Vec3,
    pending_scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            radius: 15.0,
            theta: 0.0,
            phi: PI / 2.0,
            damping: DEFAULT_DAMPING,
            rotate_speed: 1.0,
            fov: CAMERA_FOV_DEGREES.to_radians(),

            enable_pan: true,
            enable_zoom: true,
            min_polar: 0.0,
            max_polar: PI,
            min_radius: 2.0,
            max_radius: 60.0,

            pending_rotation: Vec2::ZERO,
            pending_pan: Vec3::ZERO,
            pending_scale: 1.0,
        }
    }
}

impl OrbitControls {
    // start from an existing camera placement
    pub fn from_position(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let radius = offset.length().max(f32::EPSILON);

        Self {
            target,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            ..default()
        }
    }

    pub fn with_settings(mut self, settings: &InteractionSettings) -> Self {
        self.enable_pan = settings.enable_pan;
        self.enable_zoom = settings.enable_zoom;
        self.damping = settings.damping;
        if let Some([min, max]) = settings.polar_clamp {
            self.min_polar = min;
            self.max_polar = max;
        }
        self
    }

    // calculate world position from spherical coordinates
    // https://en.wikipedia.org/wiki/Spherical_coordinate_system#Cartesian_coordinates
    pub fn calculate_position(&self) -> Vec3 {
        let x = self.radius * self.phi.sin() * self.theta.sin();
        let y = self.radius * self.phi.cos();
        let z = self.radius * self.phi.sin() * self.theta.cos();

        self.target + Vec3::new(x, y, z)
    }

    /// Drag in pixels, a full viewport height is one turn
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.pending_rotation.x -= TAU * delta.x / viewport_height * self.rotate_speed;
        self.pending_rotation.y -= TAU * delta.y / viewport_height * self.rotate_speed;
    }

    /// Wheel steps, positive zooms in
    pub fn zoom(&mut self, scroll: f32) {
        if !self.enable_zoom {
            return;
        }
        self.pending_scale *= 0.95_f32.powf(scroll);
    }

    /// Drag in pixels, moves the target in the screen plane
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32) {
        if !self.enable_pan || viewport_height <= 0.0 {
            return;
        }

        // world units per pixel at the target's depth
        let target_distance = self.radius * (self.fov / 2.0).tan();
        let scale = 2.0 * target_distance / viewport_height;

        let forward = (self.target - self.calculate_position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);

        self.pending_pan += (-right * delta.x + up * delta.y) * scale;
    }

    /// Advance one frame, returns the new camera position
    pub fn update(&mut self) -> Vec3 {
        self.theta += self.pending_rotation.x * self.damping;
        self.phi += self.pending_rotation.y * self.damping;
        self.phi = self
            .phi
            .clamp(self.min_polar, self.max_polar)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        self.radius = (self.radius * self.pending_scale).clamp(self.min_radius, self.max_radius);
        self.pending_scale = 1.0;

        self.target += self.pending_pan * self.damping;

        // exponential decay of whatever input is left
        self.pending_rotation *= 1.0 - self.damping;
        self.pending_pan *= 1.0 - self.damping;

        self.calculate_position()
    }
}

pub fn orbit_controls(
    mut camera_query: Query<(&mut Transform, &mut OrbitControls)>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut cursor_moves: EventReader<CursorMoved>,
    mut scroll_events: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let viewport_height = windows.single().map(|w| w.height()).unwrap_or(0.0);

    let drag: Vec2 = cursor_moves.read().filter_map(|motion| motion.delta).sum();
    let scroll: f32 = scroll_events.read().map(|scroll| scroll.y).sum();

    for (mut transform, mut controls) in camera_query.iter_mut() {
        if mouse_buttons.pressed(MouseButton::Left) {
            controls.rotate(drag, viewport_height);
        }
        if mouse_buttons.pressed(MouseButton::Right) {
            controls.pan(drag, viewport_height);
        }
        if scroll != 0.0 {
            controls.zoom(scroll);
        }

        // update camera position/orientation
        transform.translation = controls.update();
        transform.look_at(controls.target, Vec3::Y);
    }
}
