use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;
use chrono::{DateTime, Utc};

pub mod materials;

use materials::{EarthMaterial, LightUniform};
use crate::config::GlobeConfig;
use crate::constants::{EARTH_RADIUS, EARTH_SEGMENTS, LIGHT_ORBIT_HEIGHT, LIGHT_ORBIT_RADIUS, LIGHT_ORBIT_RATE};
use crate::systems::scene::GlobeScene;
use crate::systems::time::{AnimationClock, WallClock};

// globe tag
#[derive(Component)]
pub struct Earth;

// sun tag
#[derive(Component)]
pub struct Sun;

/// UV sphere laid out like the marker projection.
/// Bevy builds it with poles on Z and u = 0 on +X; turning the north pole onto +Y
/// and then half a turn about Y puts u = 0 on -X, where longitude -180 sits.
pub fn globe_mesh() -> Mesh {
    Sphere::new(EARTH_RADIUS)
        .mesh()
        .uv(EARTH_SEGMENTS, EARTH_SEGMENTS)
        .rotated_by(Quat::from_rotation_y(PI) * Quat::from_rotation_x(-FRAC_PI_2))
}

/// Spin of the globe after `elapsed` seconds of animation
pub fn globe_rotation(elapsed: f32, speed: f32, phase: f32) -> Quat {
    Quat::from_rotation_y(elapsed * speed + phase)
}

/// Sun position for a wall-clock instant, one slow circle in the XZ plane
pub fn light_position(now: DateTime<Utc>) -> Vec3 {
    let angle = now.timestamp_millis() as f64 * LIGHT_ORBIT_RATE;
    Vec3::new(
        angle.sin() as f32 * LIGHT_ORBIT_RADIUS,
        LIGHT_ORBIT_HEIGHT,
        angle.cos() as f32 * LIGHT_ORBIT_RADIUS,
    )
}

// rotate earth, markers follow as children
pub fn rotate_globe(
    clock: Res<AnimationClock>,
    config: Res<GlobeConfig>,
    mut scene: ResMut<GlobeScene>,
) {
    let scene = &mut *scene;
    scene.graph.local_mut(scene.globe).rotation = globe_rotation(
        clock.elapsed(),
        config.globe.rotation_speed,
        config.globe.rotation_phase,
    );
}

// move the sun along its orbit, always aimed at the globe
pub fn orbit_light(wall_clock: Res<WallClock>, mut scene: ResMut<GlobeScene>) {
    let scene = &mut *scene;
    let globe_center = scene.graph.world_position(scene.globe);
    let position = light_position(wall_clock.now());

    *scene.graph.local_mut(scene.light) =
        Transform::from_translation(position).looking_at(globe_center, Vec3::Y);
}

// update shaders
pub fn update_light_uniform(
    scene: Res<GlobeScene>,
    earth_query: Query<&MeshMaterial3d<EarthMaterial>, With<Earth>>,
    mut earth_materials: ResMut<Assets<EarthMaterial>>,
) {
    let light = scene.graph.world_position(scene.light);

    // update earth material uniforms
    if let Ok(earth_material_handle) = earth_query.single() {
        if let Some(earth_material) = earth_materials.get_mut(&earth_material_handle.0) {
            earth_material.light = LightUniform::new(light);
        }
    }
}
