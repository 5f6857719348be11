use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;

use crate::config::SceneVariant;

#[derive(Parser, Debug)]
#[command(name = "earthglobe", version, about = "Interactive Earth globe with clickable markers")]
pub struct Args {
    /// Which globe scene to show.
    #[arg(short, long, value_enum)]
    pub variant: Option<SceneVariant>,

    /// TOML file overriding the chosen scene.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "bevy_earthglobe=debug,wgpu=error".
    #[arg(long)]
    pub log_level: Option<String>,

    /// Freeze the sun at this RFC 3339 time instead of following the system clock.
    #[arg(long, value_name = "RFC3339")]
    pub sun_time: Option<DateTime<Utc>>,
}

pub fn parse() -> Args {
    Args::parse()
}
