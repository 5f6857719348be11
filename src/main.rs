use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;
use chrono::{DateTime, Utc};

mod cli;
mod config;
mod constants;
mod error;
mod geo;
mod scene_graph;
mod systems;

use constants::{WINDOW_HEIGHT, WINDOW_WIDTH};
use systems::shaders::ShaderLoaderPlugin;
use systems::time::WallClock;
use systems::GlobePlugin;

fn main() -> AppExit {
    let args = cli::parse();

    let config = match config::load(args.config.as_deref(), args.variant) {
        Ok(config) => config,
        Err(e) => {
            // no window yet, bring up just the logger to report it
            App::new().add_plugins(log_plugin(args.log_level));
            error!("could not load config: {e}");
            return AppExit::error();
        }
    };

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Earth".to_string(),
                        resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    file_path: config.assets.root.clone(),
                    ..default()
                })
                .set(log_plugin(args.log_level)),
        )
        .insert_resource(ClearColor(Color::srgb(0.0, 0.0, 0.0)))
        .insert_resource(config)
        .insert_resource(wall_clock(args.sun_time))
        .add_plugins(ShaderLoaderPlugin)
        .add_plugins(GlobePlugin)
        .run()
}

fn log_plugin(filter: Option<String>) -> LogPlugin {
    let mut plugin = LogPlugin::default();
    if let Some(filter) = filter {
        plugin.filter = filter;
    }
    plugin
}

fn wall_clock(sun_time: Option<DateTime<Utc>>) -> WallClock {
    sun_time.map_or(WallClock::System, WallClock::Fixed)
}
