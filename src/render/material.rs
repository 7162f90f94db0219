use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::shader::ShaderRef;
use bevy_render::render_resource::{AsBindGroup, ShaderType};

use crate::core::Color as ScopeColor;

pub const SCOPE_SHADER_PATH: &str = "embedded://radar_viewer/render/shaders/radar_scope.wgsl";

#[derive(ShaderType, Clone, Copy, Debug)]
pub struct ScopeUniform {
    pub tint: Vec4,
    pub time: f32,
    pub sweep_angle: f32,
}

/// Ground disc material running the radar scope fragment program.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct RadarScopeMaterial {
    #[uniform(0)]
    pub scope: ScopeUniform,
}

impl RadarScopeMaterial {
    pub fn new(tint: ScopeColor) -> Self {
        Self {
            scope: ScopeUniform {
                tint: Vec4::from_array(tint.to_array()),
                time: 0.0,
                sweep_angle: 0.0,
            },
        }
    }
}

impl Material for RadarScopeMaterial {
    fn fragment_shader() -> ShaderRef {
        SCOPE_SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Blend
    }
}
