// Globe measurements (scene units)
pub const EARTH_RADIUS: f32 = 1.5;
pub const EARTH_SEGMENTS: u32 = 64;
pub const MARKER_RADIUS: f32 = 1.57; // sits just above the surface

// Rotation speeds
pub const EARTH_ROTATION_SPEED: f32 = 0.04; // radians per second of animation time

// Sun orbit, driven by the wall clock
pub const LIGHT_ORBIT_RADIUS: f32 = 10.0;
pub const LIGHT_ORBIT_HEIGHT: f32 = 10.0;
pub const LIGHT_ORBIT_RATE: f64 = 0.00001; // radians per millisecond
pub const LIGHT_ILLUMINANCE: f32 = 1_500.0;

// Marker sprites
pub const MARKER_SIZE: f32 = 0.15;
pub const MARKER_ASPECT_RATIO: f32 = 52.0 / 35.0;
pub const HOVER_SCALE: f32 = 1.3;
pub const TOOLTIP_OFFSET: (f32, f32) = (12.0, 12.0);
pub const TOOLTIP_FONT_SIZE: f32 = 14.0;

// Camera
pub const CAMERA_FOV_DEGREES: f32 = 25.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 100.0;
pub const DEFAULT_DAMPING: f32 = 0.05;

// Output surface
pub const WINDOW_WIDTH: f32 = 1500.0;
pub const WINDOW_HEIGHT: f32 = 1024.0;
pub const MAX_PIXEL_RATIO: f32 = 2.0;

// Asset paths
pub const EARTH_DAY_TEXTURE: &str = "textures/earth/day.jpg";
pub const EARTH_NIGHT_TEXTURE: &str = "textures/earth/night.jpg";
pub const EARTH_SPECULAR_CLOUDS_TEXTURE: &str = "textures/earth/specularClouds.jpg";
pub const MARKER_TEXTURE: &str = "textures/markers/location-marker.png";
pub const MARKER_INVERTED_TEXTURE: &str = "textures/markers/location-marker-inverted.png";
pub const EARTH_VERTEX_SHADER: &str = "shaders/earth/vertex.wgsl";
pub const EARTH_FRAGMENT_SHADER: &str = "shaders/earth/fragment.wgsl";
pub const ASSET_ROOT: &str = "assets";
