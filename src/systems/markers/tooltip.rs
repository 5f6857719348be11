use bevy::prelude::*;
use bevy::window::{PrimaryWindow, SystemCursorIcon};
use bevy::winit::cursor::CursorIcon;

use crate::constants::{TOOLTIP_FONT_SIZE, TOOLTIP_OFFSET};
use crate::systems::markers::picking::{HoverState, MarkerPicker, PointerState};
use crate::systems::scene::GlobeScene;

// floating tooltip shown next to the pointer
#[derive(Component)]
pub struct Tooltip;

/// What the tooltip should show this frame
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipView {
    Hidden,
    Shown { text: String, left: f32, top: f32 },
}

pub fn tooltip_view(hovered_id: Option<&str>, pointer: Option<Vec2>) -> TooltipView {
    match (hovered_id, pointer) {
        (Some(id), Some(pointer)) => TooltipView::Shown {
            text: id.to_string(),
            left: pointer.x + TOOLTIP_OFFSET.0,
            top: pointer.y + TOOLTIP_OFFSET.1,
        },
        _ => TooltipView::Hidden,
    }
}

// setup UI overlay
pub fn spawn_tooltip(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: TOOLTIP_FONT_SIZE,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            padding: UiRect::axes(Val::Px(6.0), Val::Px(3.0)),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)), // textbox background
        Visibility::Hidden,
        Tooltip,
    ));
}

pub fn update_tooltip(
    scene: Res<GlobeScene>,
    picker: Res<MarkerPicker>,
    pointer: Res<PointerState>,
    mut tooltip_query: Query<(&mut Text, &mut Node, &mut Visibility), With<Tooltip>>,
) {
    let Ok((mut text, mut node, mut visibility)) = tooltip_query.single_mut() else { return; };

    let hovered_id = picker
        .hovered()
        .and_then(|index| scene.markers.get(index))
        .map(|marker| marker.id.as_str());

    match tooltip_view(hovered_id, pointer.position) {
        TooltipView::Shown { text: label, left, top } => {
            if text.0 != label {
                text.0 = label;
            }
            node.left = Val::Px(left);
            node.top = Val::Px(top);
            visibility.set_if_neq(Visibility::Visible);
        }
        TooltipView::Hidden => {
            visibility.set_if_neq(Visibility::Hidden);
        }
    }
}

// pointer glyph while over a marker, default otherwise
pub fn update_cursor(
    mut commands: Commands,
    picker: Res<MarkerPicker>,
    windows: Query<Entity, With<PrimaryWindow>>,
) {
    let change = picker.last_change();
    if change.is_empty() {
        return;
    }
    let Ok(window) = windows.single() else { return; };

    commands
        .entity(window)
        .insert(CursorIcon::from(cursor_icon(picker.state())));
}

pub fn cursor_icon(state: HoverState) -> SystemCursorIcon {
    match state {
        HoverState::Hovering(_) => SystemCursorIcon::Pointer,
        HoverState::Idle => SystemCursorIcon::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_identifier_next_to_pointer() {
        let view = tooltip_view(Some("Japan"), Some(Vec2::new(100.0, 40.0)));
        assert_eq!(
            view,
            TooltipView::Shown {
                text: "Japan".to_string(),
                left: 100.0 + TOOLTIP_OFFSET.0,
                top: 40.0 + TOOLTIP_OFFSET.1,
            }
        );
    }

    #[test]
    fn hidden_when_idle_or_pointer_gone() {
        assert_eq!(tooltip_view(None, Some(Vec2::ZERO)), TooltipView::Hidden);
        assert_eq!(tooltip_view(Some("NZ"), None), TooltipView::Hidden);
    }

    #[test]
    fn single_hit_hovers_and_labels_marker() {
        use crate::systems::markers::picking::{pick, Billboard};

        let ids = ["NZ", "Japan"];
        let quads = [
            (0, Billboard {
                center: Vec3::new(3.0, 0.0, 0.0),
                right: Vec3::X,
                up: Vec3::Y,
                half_extents: Vec2::new(0.075, 0.11),
            }),
            (1, Billboard {
                center: Vec3::ZERO,
                right: Vec3::X,
                up: Vec3::Y,
                half_extents: Vec2::new(0.075, 0.11),
            }),
        ];
        let ray = Ray3d {
            origin: Vec3::new(0.0, 0.0, 10.0),
            direction: Dir3::NEG_Z,
        };
        let pointer = Some(Vec2::new(750.0, 512.0));

        let mut picker = MarkerPicker::default();
        let nearest = pick(&ray, quads).first().map(|&(index, _)| index);
        picker.step(nearest);
        assert_eq!(picker.state(), HoverState::Hovering(1));
        assert_eq!(cursor_icon(picker.state()), SystemCursorIcon::Pointer);
        let view = tooltip_view(picker.hovered().map(|i| ids[i]), pointer);
        assert!(matches!(view, TooltipView::Shown { ref text, .. } if text == "Japan"));

        // ray that misses everything
        let miss = Ray3d {
            origin: Vec3::new(0.0, 5.0, 10.0),
            direction: Dir3::NEG_Z,
        };
        let nearest = pick(&miss, quads).first().map(|&(index, _)| index);
        picker.step(nearest);
        assert_eq!(picker.state(), HoverState::Idle);
        assert_eq!(cursor_icon(picker.state()), SystemCursorIcon::Default);
        assert_eq!(tooltip_view(picker.hovered().map(|i| ids[i]), pointer), TooltipView::Hidden);
    }
}
