//! config.rs
//!
//! Scene configuration. Every entry point of the globe (plain, with markers,
//! locked interactive view) is a preset of the same `GlobeConfig`; a TOML file
//! can override any part of the chosen preset.

use std::collections::HashSet;
use std::f32::consts::{FRAC_PI_2, PI};
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;
use crate::geo::GeoCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SceneVariant {
    /// bare globe, no markers
    Index,
    /// globe with clickable location markers
    #[default]
    Connections,
    /// markers plus a camera locked to a fixed tilt
    Interactive,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub variant: SceneVariant,
    pub assets: AssetPaths,
    pub globe: GlobeSettings,
    pub camera: CameraSettings,
    pub interaction: InteractionSettings,
    pub markers: Vec<MarkerRecord>,
    pub navigation: NavigationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub root: String,
    pub day_texture: String,
    pub night_texture: String,
    pub specular_clouds_texture: String,
    pub marker_texture: String,
    pub marker_inverted_texture: String,
    pub vertex_shader: String,
    pub fragment_shader: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeSettings {
    pub position: [f32; 3],
    pub rotation_speed: f32,
    pub rotation_phase: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub damping: f32,
    /// [min, max] polar angle in radians, measured from +Y
    pub polar_clamp: Option<[f32; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub id: String,
    pub lat: f32,
    pub lon: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    /// link opened for a selected marker, `{index}` is replaced by its ordinal
    pub url_template: Option<String>,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            root: ASSET_ROOT.to_string(),
            day_texture: EARTH_DAY_TEXTURE.to_string(),
            night_texture: EARTH_NIGHT_TEXTURE.to_string(),
            specular_clouds_texture: EARTH_SPECULAR_CLOUDS_TEXTURE.to_string(),
            marker_texture: MARKER_TEXTURE.to_string(),
            marker_inverted_texture: MARKER_INVERTED_TEXTURE.to_string(),
            vertex_shader: EARTH_VERTEX_SHADER.to_string(),
            fragment_shader: EARTH_FRAGMENT_SHADER.to_string(),
        }
    }
}

impl Default for GlobeSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation_speed: EARTH_ROTATION_SPEED,
            rotation_phase: 0.0,
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self { position: [12.0, -3.0, 4.0] }
    }
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            enable_pan: true,
            enable_zoom: true,
            damping: DEFAULT_DAMPING,
            polar_clamp: None,
        }
    }
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self::preset(SceneVariant::default())
    }
}

impl MarkerRecord {
    pub fn new(id: &str, lat: f32, lon: f32) -> Self {
        Self { id: id.to_string(), lat, lon }
    }

    pub fn coordinate(&self) -> GeoCoord {
        GeoCoord::new(self.lat, self.lon)
    }
}

impl GlobeSettings {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

impl CameraSettings {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

pub fn default_markers() -> Vec<MarkerRecord> {
    vec![
        MarkerRecord::new("NZ", -40.9006, 174.8860),
        MarkerRecord::new("Japan", 35.6762, 139.6503),
        MarkerRecord::new("Mexico", 23.6345, -102.5528),
        MarkerRecord::new("Scotland", 56.4907, -4.2026),
        MarkerRecord::new("China", 35.8617, 104.1954),
    ]
}

impl GlobeConfig {
    pub fn preset(variant: SceneVariant) -> Self {
        let base = Self {
            variant,
            assets: AssetPaths::default(),
            globe: GlobeSettings::default(),
            camera: CameraSettings::default(),
            interaction: InteractionSettings::default(),
            markers: Vec::new(),
            navigation: NavigationSettings::default(),
        };

        match variant {
            SceneVariant::Index => Self {
                globe: GlobeSettings {
                    position: [0.0, 0.7, 0.0],
                    ..base.globe
                },
                ..base
            },
            SceneVariant::Connections => Self {
                markers: default_markers(),
                ..base
            },
            SceneVariant::Interactive => Self {
                markers: default_markers(),
                globe: GlobeSettings {
                    rotation_phase: 3.5,
                    ..base.globe
                },
                camera: CameraSettings { position: [13.0, 0.0, 0.0] },
                interaction: InteractionSettings {
                    enable_pan: false,
                    enable_zoom: false,
                    polar_clamp: Some([FRAC_PI_2, FRAC_PI_2]),
                    ..base.interaction
                },
                ..base
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for marker in &self.markers {
            if !seen.insert(marker.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate marker id '{}'",
                    marker.id
                )));
            }
            if !(-90.0..=90.0).contains(&marker.lat) || !(-180.0..=180.0).contains(&marker.lon) {
                return Err(ConfigError::Validation(format!(
                    "marker '{}' has out of range coordinate ({}, {})",
                    marker.id, marker.lat, marker.lon
                )));
            }
        }

        let damping = self.interaction.damping;
        if !(damping > 0.0 && damping <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "damping must be in (0, 1], got {damping}"
            )));
        }

        if let Some([min, max]) = self.interaction.polar_clamp {
            if min > max || min < 0.0 || max > PI {
                return Err(ConfigError::Validation(format!(
                    "polar clamp [{min}, {max}] must be an ordered band within [0, pi]"
                )));
            }
        }

        Ok(())
    }
}

/// Build the config for a run.
///
/// Variant precedence is command line, then the file's `variant` key, then the
/// default. Keys in the file replace the matching keys of that variant's preset.
pub fn load(path: Option<&Path>, variant: Option<SceneVariant>) -> Result<GlobeConfig, ConfigError> {
    let config = match path {
        Some(path) => load_from_path(path, variant)?,
        None => GlobeConfig::preset(variant.unwrap_or_default()),
    };

    config.validate()?;
    Ok(config)
}

pub fn load_from_path(path: &Path, variant: Option<SceneVariant>) -> Result<GlobeConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    from_toml_str(&content, variant)
}

pub fn from_toml_str(content: &str, variant: Option<SceneVariant>) -> Result<GlobeConfig, ConfigError> {
    let overrides: toml::Table = toml::from_str(content)?;

    let file_variant = match overrides.get("variant") {
        Some(value) => Some(value.clone().try_into::<SceneVariant>()?),
        None => None,
    };
    let variant = variant.or(file_variant).unwrap_or_default();

    let preset = GlobeConfig::preset(variant);
    let mut merged = match toml::Value::try_from(&preset) {
        Ok(toml::Value::Table(table)) => table,
        Ok(_) => {
            return Err(ConfigError::Validation("preset is not a TOML table".into()));
        }
        Err(e) => {
            return Err(ConfigError::Validation(format!("preset not representable as TOML: {e}")));
        }
    };
    merge_tables(&mut merged, overrides);
    merged.remove("variant");

    let mut config: GlobeConfig = toml::Value::Table(merged).try_into()?;
    config.variant = variant;
    Ok(config)
}

// logging is only up once the app runs, so the summary is reported from here
pub fn report_config(config: Res<GlobeConfig>) {
    info!(
        "scene variant {:?} with {} markers",
        config.variant,
        config.markers.len()
    );
    if let Some(template) = &config.navigation.url_template {
        debug!("marker links follow {template}");
    }
}

// tables merge key by key, everything else (arrays included) is replaced
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
