use bevy::prelude::*;
use bevy::render::render_resource::*;
use bevy::reflect::TypePath;
use bevy::asset::Asset;

use crate::systems::shaders::{EARTH_FRAGMENT_HANDLE, EARTH_VERTEX_HANDLE};

// light position data (needs to be in a struct)
// this is how to pass the sun vector3 data to the earth shader
// https://www.w3.org/TR/WGSL/#address-space-layout-constraints
#[derive(ShaderType, Clone, Copy, Debug, Default)]
#[repr(C)]
pub struct LightUniform {
    pub position: Vec3,
    pub _padding: f32, // ensures proper 16-byte GPU alignment
}

impl LightUniform {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            _padding: 0.0,
        }
    }
}

// earth material
// day/night blend plus cloud coverage and ocean specular from one packed texture
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct EarthMaterial {
    #[texture(0)]
    #[sampler(1)]
    pub day_texture: Handle<Image>,
    #[texture(2)]
    #[sampler(3)]
    pub night_texture: Handle<Image>,
    #[texture(4)]
    #[sampler(5)]
    pub specular_clouds_texture: Handle<Image>, // r: specular, g: clouds
    #[uniform(6)]
    pub light: LightUniform,
}

impl Material for EarthMaterial {
    fn vertex_shader() -> ShaderRef {
        EARTH_VERTEX_HANDLE.into()
    }

    fn fragment_shader() -> ShaderRef {
        EARTH_FRAGMENT_HANDLE.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add // clouds and glow add onto the background
    }
}
