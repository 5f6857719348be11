use std::collections::HashMap;

use bevy::prelude::*;

pub mod navigation;
pub mod picking;
pub mod tooltip;

use crate::constants::HOVER_SCALE;
use crate::geo::GeoCoord;
use crate::scene_graph::{NodeId, SceneGraph};
use crate::systems::camera::OrbitControls;
use crate::systems::scene::GlobeScene;

// marker sprite entity, points into the registry
#[derive(Component, Debug, Clone, Copy)]
pub struct MarkerSprite {
    pub index: usize,
}

/// One location pin on the globe
#[derive(Debug, Clone)]
pub struct Marker {
    pub id: String,
    pub ordinal: usize,
    pub coordinate: GeoCoord,
    pub position: Vec3, // local to the globe
    pub base_scale: Vec3,
    pub visible: bool,
    pub hovered: bool,
    pub node: NodeId,
}

impl Marker {
    // scale lives on the scene node so picking sees the enlarged hit area
    pub fn set_hovered(&mut self, graph: &mut SceneGraph, hovered: bool) {
        self.hovered = hovered;
        let factor = if hovered { HOVER_SCALE } else { 1.0 };
        graph.local_mut(self.node).scale = self.base_scale * factor;
    }
}

/// Markers in input order, with lookup by identifier
#[derive(Debug, Default, Clone)]
pub struct MarkerRegistry {
    markers: Vec<Marker>,
    by_id: HashMap<String, usize>,
}

impl MarkerRegistry {
    pub fn insert(&mut self, marker: Marker) -> usize {
        let index = self.markers.len();
        self.by_id.insert(marker.id.clone(), index);
        self.markers.push(marker);
        index
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Marker> {
        self.markers.get_mut(index)
    }

    pub fn by_id(&self, id: &str) -> Option<&Marker> {
        self.by_id.get(id).and_then(|&index| self.markers.get(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Marker> {
        self.markers.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Back-face rule: a marker shows only while its outward normal points at the camera.
/// Exactly edge-on counts as hidden.
pub fn is_front_facing(marker_world: Vec3, globe_center: Vec3, camera_position: Vec3) -> bool {
    let normal = (marker_world - globe_center).normalize_or_zero();
    let to_camera = (camera_position - marker_world).normalize_or_zero();
    normal.dot(to_camera) > 0.0
}

// billboard rotation: world rotation of the marker matches the camera's
pub fn billboard_rotation(parent_world_rotation: Quat, camera_rotation: Quat) -> Quat {
    parent_world_rotation.inverse() * camera_rotation
}

// recompute visibility and facing for every marker
pub fn update_markers(
    mut scene: ResMut<GlobeScene>,
    camera_query: Query<&Transform, With<OrbitControls>>,
) {
    let Ok(camera) = camera_query.single() else { return; };
    let scene = &mut *scene;

    let globe_center = scene.graph.world_position(scene.globe);
    let facing = billboard_rotation(scene.graph.world_rotation(scene.globe), camera.rotation);

    for marker in scene.markers.iter_mut() {
        let world = scene.graph.world_position(marker.node);
        marker.visible = is_front_facing(world, globe_center, camera.translation);
        scene.graph.local_mut(marker.node).rotation = facing;
    }
}

// push marker visibility onto the sprite entities
pub fn sync_marker_visibility(
    scene: Res<GlobeScene>,
    mut sprites: Query<(&MarkerSprite, &mut Visibility)>,
) {
    for (sprite, mut visibility) in sprites.iter_mut() {
        let Some(marker) = scene.markers.get(sprite.index) else { continue; };
        let wanted = if marker.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }
}
