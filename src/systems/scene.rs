//! scene.rs
//!
//! Builds the globe scene once the shaders are in, and mirrors the scene graph
//! arena onto the engine's transforms every frame.

use bevy::image::ImageLoaderSettings;
use bevy::prelude::*;
use bevy::render::camera::PerspectiveProjection;

use crate::config::GlobeConfig;
use crate::constants::*;
use crate::scene_graph::{NodeId, SceneGraph};
use crate::systems::camera::OrbitControls;
use crate::systems::earth::materials::{EarthMaterial, LightUniform};
use crate::systems::earth::{globe_mesh, Earth, Sun};
use crate::systems::markers::{Marker, MarkerRegistry, MarkerSprite};

/// Everything the frame systems mutate, in one place
#[derive(Resource, Debug)]
pub struct GlobeScene {
    pub graph: SceneGraph,
    pub globe: NodeId,
    pub light: NodeId,
    pub markers: MarkerRegistry,
}

// entity mirrors this arena node
#[derive(Component, Debug, Clone, Copy)]
pub struct SceneNodeRef(pub NodeId);

const INITIAL_LIGHT_POSITION: Vec3 = Vec3::new(10.0, 10.0, 10.0);

/// Arena part of the scene, no engine resources involved
pub fn build_graph(config: &GlobeConfig) -> GlobeScene {
    let mut graph = SceneGraph::new();
    let globe_position = config.globe.position();

    let globe = graph.add_root(Transform::from_translation(globe_position));
    let light = graph.add_root(
        Transform::from_translation(INITIAL_LIGHT_POSITION).looking_at(globe_position, Vec3::Y),
    );

    let base_scale = Vec3::new(MARKER_SIZE, MARKER_SIZE * MARKER_ASPECT_RATIO, 1.0);
    let mut markers = MarkerRegistry::default();

    for (ordinal, record) in config.markers.iter().enumerate() {
        let coordinate = record.coordinate();
        let position = coordinate.to_position(MARKER_RADIUS);
        let node = graph.add_child(globe, Transform::from_translation(position).with_scale(base_scale));

        markers.insert(Marker {
            id: record.id.clone(),
            ordinal,
            coordinate,
            position,
            base_scale,
            visible: true,
            hovered: false,
            node,
        });
    }

    GlobeScene {
        graph,
        globe,
        light,
        markers,
    }
}

// unlit, alpha blended, visible from both sides
fn icon_material(texture: Handle<Image>) -> StandardMaterial {
    StandardMaterial {
        base_color_texture: Some(texture),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        cull_mode: None,
        ..default()
    }
}

// scene setup here, runs once when the app enters Running
pub fn build_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut earth_materials: ResMut<Assets<EarthMaterial>>,
    mut standard_materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    config: Res<GlobeConfig>,
) {
    let scene = build_graph(&config);
    let assets = &config.assets;

    // load all textures
    let day_texture = asset_server.load(assets.day_texture.clone());
    let night_texture = asset_server.load(assets.night_texture.clone());
    // data texture, keep it linear
    let specular_clouds_texture = asset_server.load_with_settings(
        assets.specular_clouds_texture.clone(),
        |settings: &mut ImageLoaderSettings| settings.is_srgb = false,
    );

    let earth_material = earth_materials.add(EarthMaterial {
        day_texture,
        night_texture,
        specular_clouds_texture,
        light: LightUniform::new(scene.graph.world_position(scene.light)),
    });

    let globe_entity = commands
        .spawn((
            Earth,
            SceneNodeRef(scene.globe),
            Mesh3d(meshes.add(globe_mesh())),
            MeshMaterial3d(earth_material),
            *scene.graph.local(scene.globe),
        ))
        .id();

    // sun light
    commands.spawn((
        Sun,
        SceneNodeRef(scene.light),
        DirectionalLight {
            illuminance: LIGHT_ILLUMINANCE,
            ..default()
        },
        *scene.graph.local(scene.light),
    ));

    // marker sprites, one quad mesh and two icon materials shared by all
    if scene.markers.is_empty() {
        debug!("no markers configured, skipping marker sprites");
    } else {
        spawn_marker_sprites(
            &mut commands,
            &scene,
            globe_entity,
            meshes.add(Rectangle::new(1.0, 1.0)),
            standard_materials.add(icon_material(asset_server.load(assets.marker_texture.clone()))),
            standard_materials.add(icon_material(asset_server.load(assets.marker_inverted_texture.clone()))),
        );
    }

    // spawn camera
    let camera_position = config.camera.position();
    let controls = OrbitControls::from_position(camera_position, Vec3::ZERO).with_settings(&config.interaction);
    if !(controls.min_radius..=controls.max_radius).contains(&controls.radius) {
        warn!(
            "camera distance {:.2} is outside [{}, {}], it will be clamped",
            controls.radius, controls.min_radius, controls.max_radius
        );
    }
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            aspect_ratio: WINDOW_WIDTH / WINDOW_HEIGHT,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }),
        Transform::from_translation(camera_position).looking_at(Vec3::ZERO, Vec3::Y),
        controls,
    ));

    info!(
        "globe scene built with {} markers ({} nodes)",
        scene.markers.len(),
        scene.graph.len()
    );
    commands.insert_resource(scene);
}

fn spawn_marker_sprites(
    commands: &mut Commands,
    scene: &GlobeScene,
    globe_entity: Entity,
    quad: Handle<Mesh>,
    normal_icon: Handle<StandardMaterial>,
    inverted_icon: Handle<StandardMaterial>,
) {
    for (index, marker) in scene.markers.iter().enumerate() {
        let material = if marker.coordinate.is_southern() {
            inverted_icon.clone()
        } else {
            normal_icon.clone()
        };

        commands.spawn((
            MarkerSprite { index },
            SceneNodeRef(marker.node),
            Mesh3d(quad.clone()),
            MeshMaterial3d(material),
            *scene.graph.local(marker.node),
            Visibility::Inherited,
            ChildOf(globe_entity),
        ));
    }
}

// copy arena locals onto the engine transforms
pub fn sync_scene_transforms(
    scene: Res<GlobeScene>,
    mut nodes: Query<(&SceneNodeRef, &mut Transform)>,
) {
    for (node, mut transform) in nodes.iter_mut() {
        transform.set_if_neq(*scene.graph.local(node.0));
    }
}
