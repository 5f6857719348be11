use bevy::prelude::*;

use crate::constants::MAX_PIXEL_RATIO;

// override only dense displays, leave the rest at their native factor
pub fn capped_scale_factor(base: f32) -> Option<f32> {
    (base > MAX_PIXEL_RATIO).then_some(MAX_PIXEL_RATIO)
}

/// Keeps the render resolution at most twice the logical size.
///
/// On a display denser than 2x the window keeps its 1500 logical px but each
/// one is drawn with 2 physical px, so it covers fewer OS points (1000 at 3x)
/// and looks smaller on screen. Fill rate wins over on-screen size here.
pub fn clamp_pixel_ratio(mut windows: Query<&mut Window, Changed<Window>>) {
    for mut window in windows.iter_mut() {
        let wanted = capped_scale_factor(window.resolution.base_scale_factor());
        if window.resolution.scale_factor_override() != wanted {
            debug!("scale factor override set to {wanted:?}");
            window.resolution.set_scale_factor_override(wanted);
        }
    }
}
