use bevy::prelude::*;

use crate::config::GlobeConfig;
use crate::systems::markers::MarkerRegistry;
use crate::systems::scene::GlobeScene;

/// Fired once per click on a hovered marker.
/// Whatever opens the location's info view listens for this.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct MarkerSelected {
    pub ordinal: usize,
    pub id: String,
}

pub fn resolve_link(template: &str, ordinal: usize) -> String {
    template.replace("{index}", &ordinal.to_string())
}

/// Log line for a selection, None when the id does not name the marker at that ordinal
pub fn describe_selection(
    selection: &MarkerSelected,
    markers: &MarkerRegistry,
    url_template: Option<&str>,
) -> Option<String> {
    let marker = markers
        .by_id(&selection.id)
        .filter(|marker| marker.ordinal == selection.ordinal)?;
    let label = format!("selected {} (#{})", marker.id, marker.ordinal);
    Some(match url_template {
        Some(template) => format!("{label} -> {}", resolve_link(template, marker.ordinal)),
        None => label,
    })
}

// default listener, reports the selection
pub fn log_selection(
    mut selections: EventReader<MarkerSelected>,
    scene: Res<GlobeScene>,
    config: Res<GlobeConfig>,
) {
    let template = config.navigation.url_template.as_deref();
    for selection in selections.read() {
        match describe_selection(selection, &scene.markers, template) {
            Some(line) => info!("{line}"),
            None => warn!(
                "selection {} (#{}) matches no marker",
                selection.id, selection.ordinal
            ),
        }
    }
}
