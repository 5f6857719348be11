//! geo.rs
//!
//! Latitude/longitude helpers for placing things on the globe

use bevy::prelude::*;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoord {
    pub latitude: f32,
    pub longitude: f32,
}

impl GeoCoord {
    pub fn new(latitude: f32, longitude: f32) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_southern(&self) -> bool {
        self.latitude < 0.0
    }

    pub fn to_position(&self, radius: f32) -> Vec3 {
        lat_lon_to_vec3(self.latitude, self.longitude, radius)
    }
}

// convert latlon to cartesian
// longitude is offset by 180 so that the texture seam lines up with the sphere UVs
// https://en.wikipedia.org/wiki/Spherical_coordinate_system#Cartesian_coordinates
pub fn lat_lon_to_vec3(latitude: f32, longitude: f32, radius: f32) -> Vec3 {
    let phi = (90.0 - latitude).to_radians(); // colatitude
    let theta = (longitude + 180.0).to_radians();

    let x = -radius * phi.sin() * theta.cos();
    let y = radius * phi.cos();
    let z = radius * phi.sin() * theta.sin();

    Vec3::new(x, y, z)
}
