use std::collections::HashMap;

use bevy::prelude::*;

use crate::sim::BlipId;
use crate::viewer::{FrameReport, ViewerState};

use super::material::RadarScopeMaterial;

#[derive(Resource)]
pub struct ViewerRes(pub ViewerState);

impl ViewerRes {
    pub fn new(state: ViewerState) -> Self {
        Self(state)
    }
}

/// Handles created while building the assembly, released on teardown.
#[derive(Resource, Default)]
pub struct SceneHandles {
    pub root: Option<Entity>,
    pub camera: Option<Entity>,
    pub lights: Vec<Entity>,
    pub scope_material: Option<Handle<RadarScopeMaterial>>,
    pub meshes: Vec<Handle<Mesh>>,
    pub materials: Vec<Handle<StandardMaterial>>,
    /// Meshes shared by every blip
    pub blip_marker_mesh: Option<Handle<Mesh>>,
    pub blip_ring_mesh: Option<Handle<Mesh>>,
    pub holo_materials: Vec<Handle<StandardMaterial>>,
}

/// Entities and per-blip assets of one simulated blip.
pub struct BlipVisualEntities {
    pub marker: Entity,
    pub ring: Entity,
    pub trail: Entity,
    pub marker_material: Handle<StandardMaterial>,
    pub ring_material: Handle<StandardMaterial>,
    pub trail_material: Handle<StandardMaterial>,
    pub trail_mesh: Handle<Mesh>,
}

#[derive(Resource, Default)]
pub struct BlipRegistry {
    pub by_blip: HashMap<BlipId, BlipVisualEntities>,
}

/// Pending mount retry after a zero-size first observation.
#[derive(Resource)]
pub struct MountRetry {
    pub timer: Timer,
}

/// Report of the most recent tick, read by the mirroring systems.
#[derive(Resource, Default)]
pub struct LastFrame(pub FrameReport);
