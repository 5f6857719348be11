use bevy::prelude::*;

pub mod camera;
pub mod earth;
pub mod markers;
pub mod scene;
pub mod shaders;
pub mod time;
pub mod window;

use crate::config::report_config;
use earth::materials::EarthMaterial;
use markers::navigation::{log_selection, MarkerSelected};
use markers::picking::{picking_step, track_pointer, MarkerPicker, PointerState};
use markers::tooltip::{spawn_tooltip, update_cursor, update_tooltip};
use shaders::GlobeState;
use time::{AnimationClock, WallClock};

/// Per-frame order of the running globe
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameStep {
    Input,
    Animate,
    Visibility,
    Controls,
    Picking,
    Sync,
}

pub struct GlobePlugin;

impl Plugin for GlobePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<EarthMaterial>::default())
            .add_event::<MarkerSelected>()
            .init_resource::<MarkerPicker>()
            .init_resource::<PointerState>()
            .init_resource::<AnimationClock>()
            .init_resource::<WallClock>()
            .configure_sets(
                Update,
                (
                    FrameStep::Input,
                    FrameStep::Animate,
                    FrameStep::Visibility,
                    FrameStep::Controls,
                    FrameStep::Picking,
                    FrameStep::Sync,
                )
                    .chain()
                    .run_if(in_state(GlobeState::Running)),
            )
            .add_systems(Startup, report_config)
            .add_systems(Update, window::clamp_pixel_ratio)
            .add_systems(
                Update,
                (
                    track_pointer.in_set(FrameStep::Input),
                    (
                        time::tick_animation_clock,
                        earth::rotate_globe,
                        earth::orbit_light,
                        earth::update_light_uniform,
                    )
                        .chain()
                        .in_set(FrameStep::Animate),
                    markers::update_markers.in_set(FrameStep::Visibility),
                    camera::orbit_controls.in_set(FrameStep::Controls),
                    (picking_step, (update_tooltip, update_cursor, log_selection))
                        .chain()
                        .in_set(FrameStep::Picking),
                    (scene::sync_scene_transforms, markers::sync_marker_visibility)
                        .in_set(FrameStep::Sync),
                ),
            );
        add_scene_setup(app);
    }
}

/// The one-time scene build, gated on the shaders being in
pub fn add_scene_setup(app: &mut App) {
    app.add_systems(OnEnter(GlobeState::Running), (scene::build_scene, spawn_tooltip));
}
