use bevy::prelude::*;

use crate::sim::BlipId;

/// Parent of the whole radar assembly; carries the drag rotation.
#[derive(Component)]
pub struct ViewerRoot;

#[derive(Component)]
pub struct ViewerCamera;

#[derive(Component)]
pub struct ScopeDisc;

#[derive(Component)]
pub struct SweepArm;

#[derive(Component)]
pub struct HoloRing {
    pub index: usize,
}

#[derive(Component)]
pub struct ParticleCloud;

#[derive(Component, Clone, Copy)]
pub enum BlipPart {
    Marker(BlipId),
    Ring(BlipId),
    Trail(BlipId),
}

#[derive(Component)]
pub struct LoadingOverlay;

#[derive(Component)]
pub struct HudText;

#[derive(Component)]
pub struct HudRoot;
