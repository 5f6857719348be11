//! picking.rs
//!
//! Pointer picking for marker sprites.
//! Input handlers only record what the pointer did; the hover state is
//! changed in exactly one place, `picking_step`, once per frame.

use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::render::camera::CameraProjection;
use bevy::window::{CursorLeft, PrimaryWindow};

use crate::systems::camera::OrbitControls;
use crate::systems::markers::MarkerRegistry;
use crate::systems::markers::navigation::MarkerSelected;
use crate::systems::scene::GlobeScene;

// max pointer travel between press and release that still counts as a click
const CLICK_SLOP_PX: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering(usize),
}

/// What changed on the last step, marker indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverChange {
    pub entered: Option<usize>,
    pub left: Option<usize>,
}

impl HoverChange {
    pub fn is_empty(&self) -> bool {
        self.entered.is_none() && self.left.is_none()
    }
}

#[derive(Resource, Debug, Default)]
pub struct MarkerPicker {
    state: HoverState,
    last_change: HoverChange,
}

impl MarkerPicker {
    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn hovered(&self) -> Option<usize> {
        match self.state {
            HoverState::Idle => None,
            HoverState::Hovering(index) => Some(index),
        }
    }

    pub fn last_change(&self) -> HoverChange {
        self.last_change
    }

    /// Feed the nearest hit for this frame and move the state machine
    pub fn step(&mut self, nearest: Option<usize>) -> HoverChange {
        let change = match (self.state, nearest) {
            (HoverState::Idle, None) => HoverChange::default(),
            (HoverState::Idle, Some(new)) => HoverChange {
                entered: Some(new),
                left: None,
            },
            (HoverState::Hovering(current), Some(new)) if current == new => HoverChange::default(),
            (HoverState::Hovering(current), Some(new)) => HoverChange {
                entered: Some(new),
                left: Some(current),
            },
            (HoverState::Hovering(current), None) => HoverChange {
                entered: None,
                left: Some(current),
            },
        };

        self.state = match nearest {
            Some(index) => HoverState::Hovering(index),
            None => HoverState::Idle,
        };
        self.last_change = change;
        change
    }

    /// Marker a click lands on, if any
    pub fn click(&self) -> Option<usize> {
        self.hovered()
    }
}

/// Pointer input captured from window events
#[derive(Resource, Debug, Default)]
pub struct PointerState {
    pub position: Option<Vec2>, // logical pixels, origin top-left
    pub ndc: Vec2,
    pub pressed_at: Option<Vec2>,
    pub clicked: bool,
}

/// Camera facing quad in world space
#[derive(Debug, Clone, Copy)]
pub struct Billboard {
    pub center: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub half_extents: Vec2,
}

// ray vs quad, returns distance along the ray
pub fn intersect_billboard(ray: &Ray3d, quad: &Billboard) -> Option<f32> {
    let normal = quad.right.cross(quad.up).normalize_or_zero();
    let denom = ray.direction.dot(normal);
    if denom.abs() < 1e-6 {
        return None; // ray parallel to the quad
    }

    let distance = (quad.center - ray.origin).dot(normal) / denom;
    if distance < 0.0 {
        return None; // behind the ray origin
    }

    let offset = ray.get_point(distance) - quad.center;
    let u = offset.dot(quad.right);
    let v = offset.dot(quad.up);

    (u.abs() <= quad.half_extents.x && v.abs() <= quad.half_extents.y).then_some(distance)
}

/// All hits sorted nearest first
pub fn pick(ray: &Ray3d, candidates: impl IntoIterator<Item = (usize, Billboard)>) -> Vec<(usize, f32)> {
    let mut hits: Vec<(usize, f32)> = candidates
        .into_iter()
        .filter_map(|(index, quad)| intersect_billboard(ray, &quad).map(|d| (index, d)))
        .collect();
    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    hits
}

pub fn screen_to_ndc(position: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(
        position.x / size.x * 2.0 - 1.0,
        -(position.y / size.y * 2.0 - 1.0), // Y is flipped
    )
}

// ray from the camera through a point in normalized device coordinates
pub fn ray_from_ndc(clip_from_view: Mat4, camera_transform: &Transform, ndc: Vec2) -> Option<Ray3d> {
    let world_from_ndc = camera_transform.compute_matrix() * clip_from_view.inverse();

    // reverse-z: 1 is the near plane, the far plane is at infinity
    let near = world_from_ndc.project_point3(ndc.extend(1.0));
    let far = world_from_ndc.project_point3(ndc.extend(0.5));
    if !near.is_finite() || !far.is_finite() {
        return None;
    }

    let direction = Dir3::new(far - near).ok()?;
    Some(Ray3d { origin: near, direction })
}

pub fn clip_from_view(projection: &Projection) -> Option<Mat4> {
    match projection {
        Projection::Perspective(perspective) => Some(perspective.get_clip_from_view()),
        Projection::Orthographic(orthographic) => Some(orthographic.get_clip_from_view()),
        _ => None,
    }
}

// record pointer movement and clicks, nothing else
pub fn track_pointer(
    mut pointer: ResMut<PointerState>,
    mut cursor_moves: EventReader<CursorMoved>,
    mut cursor_left: EventReader<CursorLeft>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(window) = windows.single() else { return; };
    let size = Vec2::new(window.width(), window.height());

    for moved in cursor_moves.read() {
        pointer.position = Some(moved.position);
        pointer.ndc = screen_to_ndc(moved.position, size);
    }
    if cursor_left.read().count() > 0 {
        pointer.position = None;
    }

    if mouse_buttons.just_pressed(MouseButton::Left) {
        pointer.pressed_at = pointer.position;
    }
    if mouse_buttons.just_released(MouseButton::Left) {
        if let (Some(pressed), Some(released)) = (pointer.pressed_at.take(), pointer.position) {
            // a drag that rotates the globe is not a click
            pointer.clicked = pressed.distance(released) <= CLICK_SLOP_PX;
        }
    }
}

/// Selection a click produces given the current hover state
pub fn selection_for_click(picker: &MarkerPicker, markers: &MarkerRegistry) -> Option<MarkerSelected> {
    let marker = picker.click().and_then(|index| markers.get(index))?;
    Some(MarkerSelected {
        ordinal: marker.ordinal,
        id: marker.id.clone(),
    })
}

// nearest visible marker under the pointer
fn nearest_marker(scene: &GlobeScene, clip_from_view: Mat4, camera_transform: &Transform, ndc: Vec2) -> Option<usize> {
    // the camera is a root, its local transform is already world space
    let ray = ray_from_ndc(clip_from_view, camera_transform, ndc)?;

    let right = camera_transform.rotation * Vec3::X;
    let up = camera_transform.rotation * Vec3::Y;

    let candidates = scene
        .markers
        .iter()
        .enumerate()
        .filter(|(_, marker)| marker.visible) // hidden markers can't be picked
        .map(|(index, marker)| {
            let world = scene.graph.world_transform(marker.node);
            let quad = Billboard {
                center: world.translation,
                right,
                up,
                half_extents: world.scale.truncate() * 0.5,
            };
            (index, quad)
        });

    pick(&ray, candidates).first().map(|&(index, _)| index)
}

// the single hover update of the frame
pub fn picking_step(
    mut scene: ResMut<GlobeScene>,
    mut picker: ResMut<MarkerPicker>,
    mut pointer: ResMut<PointerState>,
    camera_query: Query<(&Projection, &Transform), With<OrbitControls>>,
    mut selections: EventWriter<MarkerSelected>,
) {
    // clicks act on what was under the pointer when they happened
    if std::mem::take(&mut pointer.clicked) {
        if let Some(selection) = selection_for_click(&picker, &scene.markers) {
            selections.write(selection);
        }
    }

    let nearest = match (pointer.position, camera_query.single()) {
        (Some(_), Ok((projection, camera_transform))) => clip_from_view(projection)
            .and_then(|clip| nearest_marker(&scene, clip, camera_transform, pointer.ndc)),
        _ => None,
    };

    let change = picker.step(nearest);
    let scene = &mut *scene;

    if let Some(previous) = change.left.and_then(|index| scene.markers.get_mut(index)) {
        previous.set_hovered(&mut scene.graph, false);
    }
    if let Some(current) = change.entered.and_then(|index| scene.markers.get_mut(index)) {
        current.set_hovered(&mut scene.graph, true);
        debug!("hovering marker {}", current.id);
    } else if change.left.is_some() {
        debug!("hover cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray_down_z(x: f32, y: f32) -> Ray3d {
        Ray3d {
            origin: Vec3::new(x, y, 10.0),
            direction: Dir3::NEG_Z,
        }
    }

    fn quad_at(center: Vec3) -> Billboard {
        Billboard {
            center,
            right: Vec3::X,
            up: Vec3::Y,
            half_extents: Vec2::new(0.075, 0.11),
        }
    }

    #[test]
    fn idle_to_hovering_and_back() {
        let mut picker = MarkerPicker::default();
        assert_eq!(picker.state(), HoverState::Idle);

        let change = picker.step(Some(2));
        assert_eq!(picker.state(), HoverState::Hovering(2));
        assert_eq!(change, HoverChange { entered: Some(2), left: None });

        let change = picker.step(Some(2));
        assert!(change.is_empty());

        let change = picker.step(None);
        assert_eq!(picker.state(), HoverState::Idle);
        assert_eq!(change, HoverChange { entered: None, left: Some(2) });
        assert_eq!(picker.last_change(), change);
    }

    #[test]
    fn switching_markers_restores_previous() {
        let mut picker = MarkerPicker::default();
        picker.step(Some(0));
        let change = picker.step(Some(3));
        assert_eq!(change, HoverChange { entered: Some(3), left: Some(0) });
        assert_eq!(picker.hovered(), Some(3));
    }

    #[test]
    fn idle_with_no_hit_changes_nothing() {
        let mut picker = MarkerPicker::default();
        assert!(picker.step(None).is_empty());
        assert_eq!(picker.click(), None);
    }

    #[test]
    fn click_reports_hovered_marker_only() {
        let mut picker = MarkerPicker::default();
        assert_eq!(picker.click(), None);
        picker.step(Some(4));
        assert_eq!(picker.click(), Some(4));
        picker.step(None);
        assert_eq!(picker.click(), None);
    }

    #[test]
    fn ray_hits_quad_inside_bounds() {
        let quad = quad_at(Vec3::ZERO);
        assert_eq!(intersect_billboard(&ray_down_z(0.0, 0.0), &quad), Some(10.0));
        assert!(intersect_billboard(&ray_down_z(0.07, 0.1), &quad).is_some());
        assert!(intersect_billboard(&ray_down_z(0.08, 0.0), &quad).is_none());
        assert!(intersect_billboard(&ray_down_z(0.0, 0.12), &quad).is_none());
    }

    #[test]
    fn ray_ignores_quads_behind_it() {
        let quad = quad_at(Vec3::new(0.0, 0.0, 20.0));
        assert!(intersect_billboard(&ray_down_z(0.0, 0.0), &quad).is_none());
    }

    #[test]
    fn nearest_hit_wins() {
        let hits = pick(
            &ray_down_z(0.0, 0.0),
            [
                (0, quad_at(Vec3::new(0.0, 0.0, -1.0))),
                (1, quad_at(Vec3::new(0.0, 0.0, 2.0))),
                (2, quad_at(Vec3::new(5.0, 0.0, 3.0))), // off to the side
            ],
        );
        let order: Vec<usize> = hits.iter().map(|&(index, _)| index).collect();
        assert_eq!(order, [1, 0]);
    }

    #[test]
    fn no_candidates_no_hits() {
        assert!(pick(&ray_down_z(0.0, 0.0), Vec::new()).is_empty());
    }

    #[test]
    fn ndc_corners() {
        let size = Vec2::new(1500.0, 1024.0);
        assert_eq!(screen_to_ndc(Vec2::ZERO, size), Vec2::new(-1.0, 1.0));
        assert_eq!(screen_to_ndc(size, size), Vec2::new(1.0, -1.0));
        assert_eq!(screen_to_ndc(size * 0.5, size), Vec2::ZERO);
    }

    mod screen {
        use super::super::*;
        use crate::config::{GlobeConfig, SceneVariant};
        use crate::constants::*;
        use crate::systems::markers::is_front_facing;
        use crate::systems::scene::build_graph;
        use bevy::render::camera::PerspectiveProjection;

        fn connections_camera() -> (Mat4, Transform) {
            let config = GlobeConfig::preset(SceneVariant::Connections);
            let projection = Projection::from(PerspectiveProjection {
                fov: CAMERA_FOV_DEGREES.to_radians(),
                aspect_ratio: WINDOW_WIDTH / WINDOW_HEIGHT,
                near: CAMERA_NEAR,
                far: CAMERA_FAR,
            });
            let transform = Transform::from_translation(config.camera.position()).looking_at(Vec3::ZERO, Vec3::Y);
            (clip_from_view(&projection).unwrap(), transform)
        }

        fn to_ndc(clip: Mat4, camera: &Transform, world: Vec3) -> Vec2 {
            (clip * camera.compute_matrix().inverse()).project_point3(world).truncate()
        }

        fn connections_scene(camera: &Transform) -> GlobeScene {
            let mut scene = build_graph(&GlobeConfig::preset(SceneVariant::Connections));
            let center = scene.graph.world_position(scene.globe);
            for marker in scene.markers.iter_mut() {
                let world = scene.graph.world_position(marker.node);
                marker.visible = is_front_facing(world, center, camera.translation);
            }
            scene
        }

        #[test]
        fn centre_ray_leaves_the_camera_toward_the_globe() {
            let (clip, camera) = connections_camera();
            let ray = ray_from_ndc(clip, &camera, Vec2::ZERO).unwrap();

            let toward_globe = (Vec3::ZERO - camera.translation).normalize();
            assert!(ray.direction.dot(toward_globe) > 0.9999);
            // origin is on the near plane
            assert!((ray.origin.distance(camera.translation) - CAMERA_NEAR).abs() < 1e-3);
        }

        #[test]
        fn ray_passes_through_the_point_it_was_aimed_at() {
            let (clip, camera) = connections_camera();
            let world = Vec3::new(0.5, 1.0, -0.3);

            let ray = ray_from_ndc(clip, &camera, to_ndc(clip, &camera, world)).unwrap();
            let along = (world - ray.origin).dot(*ray.direction);
            assert!(along > 0.0);
            assert!(ray.get_point(along).distance(world) < 1e-3);
        }

        #[test]
        fn centre_ray_hits_marker_under_it() {
            let (clip, camera) = connections_camera();
            let mut scene = connections_scene(&camera);

            // move Japan to where the view axis meets the marker shell
            let japan = scene.markers.by_id("Japan").unwrap().node;
            scene.graph.local_mut(japan).translation = camera.translation.normalize() * MARKER_RADIUS;
            scene.markers.get_mut(1).unwrap().visible = true;
            assert_eq!(nearest_marker(&scene, clip, &camera, Vec2::ZERO), Some(1));

            // hidden by the back-face rule, so not pickable even dead centre
            scene.markers.get_mut(1).unwrap().visible = false;
            assert_eq!(nearest_marker(&scene, clip, &camera, Vec2::ZERO), None);
        }

        #[test]
        fn front_facing_markers_are_pickable_where_they_are_drawn() {
            let (clip, camera) = connections_camera();
            let scene = connections_scene(&camera);

            let mut front_facing = 0;
            for (index, marker) in scene.markers.iter().enumerate() {
                let ndc = to_ndc(clip, &camera, scene.graph.world_position(marker.node));
                let hit = nearest_marker(&scene, clip, &camera, ndc);
                if marker.visible {
                    front_facing += 1;
                    assert_eq!(hit, Some(index), "{} not picked", marker.id);
                } else {
                    assert_ne!(hit, Some(index), "{} is on the far side", marker.id);
                }
            }
            assert!(front_facing > 0);
        }

        #[test]
        fn pointer_in_empty_space_hits_nothing() {
            let (clip, camera) = connections_camera();
            let scene = connections_scene(&camera);
            assert_eq!(nearest_marker(&scene, clip, &camera, Vec2::new(0.95, 0.95)), None);
        }
    }

    mod pointer {
        use super::super::*;

        fn pointer_app() -> (App, Entity) {
            let mut app = App::new();
            app.add_plugins(MinimalPlugins)
                .add_event::<CursorMoved>()
                .add_event::<CursorLeft>()
                .init_resource::<ButtonInput<MouseButton>>()
                .init_resource::<PointerState>()
                .add_systems(Update, track_pointer);
            let window = app.world_mut().spawn((Window::default(), PrimaryWindow)).id();
            (app, window)
        }

        fn move_to(app: &mut App, window: Entity, position: Vec2) {
            app.world_mut().send_event(CursorMoved {
                window,
                position,
                delta: None,
            });
        }

        // press, move `travel` pixels, release; reports whether that was a click
        fn press_and_release(travel: f32) -> bool {
            let (mut app, window) = pointer_app();
            move_to(&mut app, window, Vec2::new(400.0, 300.0));
            app.world_mut()
                .resource_mut::<ButtonInput<MouseButton>>()
                .press(MouseButton::Left);
            app.update();

            move_to(&mut app, window, Vec2::new(400.0 + travel, 300.0));
            {
                let mut buttons = app.world_mut().resource_mut::<ButtonInput<MouseButton>>();
                buttons.clear();
                buttons.release(MouseButton::Left);
            }
            app.update();

            app.world().resource::<PointerState>().clicked
        }

        #[test]
        fn short_press_is_a_click() {
            assert!(press_and_release(0.0));
            assert!(press_and_release(2.0));
        }

        #[test]
        fn drag_is_not_a_click() {
            assert!(!press_and_release(20.0));
        }

        #[test]
        fn pointer_position_follows_cursor_and_clears_on_leave() {
            let (mut app, window) = pointer_app();

            // default window is 1280x720
            move_to(&mut app, window, Vec2::new(640.0, 360.0));
            app.update();
            let pointer = app.world().resource::<PointerState>();
            assert_eq!(pointer.position, Some(Vec2::new(640.0, 360.0)));
            assert_eq!(pointer.ndc, Vec2::ZERO);

            app.world_mut().send_event(CursorLeft { window });
            app.update();
            assert_eq!(app.world().resource::<PointerState>().position, None);
        }
    }

    mod app {
        use super::super::*;
        use crate::geo::GeoCoord;
        use crate::scene_graph::SceneGraph;
        use crate::systems::markers::Marker;

        fn scene() -> GlobeScene {
            let mut graph = SceneGraph::new();
            let globe = graph.add_root(Transform::default());
            let light = graph.add_root(Transform::from_xyz(10.0, 10.0, 10.0));
            let mut markers = MarkerRegistry::default();
            for (ordinal, (id, lat, lon)) in [("NZ", -40.9006, 174.886), ("Japan", 35.6762, 139.6503)]
                .into_iter()
                .enumerate()
            {
                let coordinate = GeoCoord::new(lat, lon);
                let position = coordinate.to_position(1.57);
                let base_scale = Vec3::new(0.15, 0.22, 1.0);
                let node = graph.add_child(globe, Transform::from_translation(position).with_scale(base_scale));
                markers.insert(Marker {
                    id: id.to_string(),
                    ordinal,
                    coordinate,
                    position,
                    base_scale,
                    visible: true,
                    hovered: false,
                    node,
                });
            }
            GlobeScene { graph, globe, light, markers }
        }

        fn test_app(hovered: Option<usize>) -> App {
            let mut picker = MarkerPicker::default();
            picker.step(hovered);

            let mut app = App::new();
            app.add_plugins(MinimalPlugins)
                .add_event::<MarkerSelected>()
                .insert_resource(scene())
                .insert_resource(picker)
                .insert_resource(PointerState {
                    clicked: true,
                    ..default()
                })
                .add_systems(Update, picking_step);
            app
        }

        fn selections(app: &App) -> Vec<MarkerSelected> {
            let events = app.world().resource::<Events<MarkerSelected>>();
            let mut cursor = events.get_cursor();
            cursor.read(events).cloned().collect()
        }

        #[test]
        fn click_while_hovering_selects_once() {
            let mut app = test_app(Some(1));
            app.update();

            assert_eq!(
                selections(&app),
                vec![MarkerSelected {
                    ordinal: 1,
                    id: "Japan".to_string(),
                }]
            );

            // pointer is gone, so the step also dropped the hover
            let picker = app.world().resource::<MarkerPicker>();
            assert_eq!(picker.state(), HoverState::Idle);
            let scene = app.world().resource::<GlobeScene>();
            let japan = scene.markers.by_id("Japan").unwrap();
            assert!(!japan.hovered);
            assert_eq!(scene.graph.local(japan.node).scale, japan.base_scale);

            app.update();
            assert_eq!(selections(&app).len(), 1); // click was consumed
        }

        #[test]
        fn click_while_idle_selects_nothing() {
            let mut app = test_app(None);
            app.update();
            assert!(selections(&app).is_empty());
            assert!(!app.world().resource::<PointerState>().clicked);
        }

        #[test]
        fn selection_carries_ordinal() {
            let scene = scene();
            let mut picker = MarkerPicker::default();
            assert_eq!(selection_for_click(&picker, &scene.markers), None);

            picker.step(Some(0));
            let selection = selection_for_click(&picker, &scene.markers).unwrap();
            assert_eq!(selection.ordinal, 0);
            assert_eq!(selection.id, "NZ");
        }
    }
}
