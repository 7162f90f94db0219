//! Builds the radar assembly, camera and lights for a mounted viewer.

use std::f32::consts::FRAC_PI_2;

use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_camera::{PerspectiveProjection, Projection};
use bevy_mesh::PrimitiveTopology;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::components::*;
use super::material::RadarScopeMaterial;
use super::resources::SceneHandles;
use crate::core::{Color as ScopeColor, ViewerConfig};
use crate::geometry::{self, OVERLAY_HEIGHT, ProjectionParams};
use crate::{Result, ViewerError};
use error_stack::report;

const PARTICLE_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Flat on the ground, facing up: local +y becomes world -z.
fn flat() -> Quat {
    Quat::from_rotation_x(-FRAC_PI_2)
}

fn glow(color: ScopeColor, alpha: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: color.with_a(alpha).into(),
        emissive: Color::from(color).to_linear() * 0.4,
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        double_sided: true,
        cull_mode: None,
        ..default()
    }
}

pub fn line_mesh(points: Vec<Vec3>, topology: PrimitiveTopology) -> Mesh {
    let mut mesh = Mesh::new(topology, RenderAssetUsages::default());
    let positions: Vec<[f32; 3]> = points.into_iter().map(|p| p.to_array()).collect();
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh
}

pub struct SceneAssets<'a> {
    pub meshes: &'a mut Assets<Mesh>,
    pub materials: &'a mut Assets<StandardMaterial>,
    pub scope_materials: &'a mut Assets<RadarScopeMaterial>,
}

impl SceneAssets<'_> {
    fn mesh(&mut self, handles: &mut SceneHandles, mesh: impl Into<Mesh>) -> Handle<Mesh> {
        let h = self.meshes.add(mesh.into());
        handles.meshes.push(h.clone());
        h
    }

    fn material(&mut self, handles: &mut SceneHandles, m: StandardMaterial) -> Handle<StandardMaterial> {
        let h = self.materials.add(m);
        handles.materials.push(h.clone());
        h
    }
}

/// Spawn the assembly under a fresh [`ViewerRoot`] plus camera and lights.
///
/// Fails before spawning anything if the assembly would be degenerate.
pub fn build_scene(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    config: &ViewerConfig,
    seed: u64,
    projection: Option<ProjectionParams>,
) -> Result<SceneHandles> {
    let scene = &config.scene;
    if !(scene.ground_radius > 0.0) {
        return Err(report!(ViewerError).attach(format!(
            "ground radius must be positive, got {}",
            scene.ground_radius
        )));
    }
    if scene.ring_segments < 3 {
        return Err(report!(ViewerError).attach("ring_segments must be at least 3"));
    }
    let accent = scene.accent;
    let mut handles = SceneHandles::default();

    let root = commands
        .spawn((ViewerRoot, Transform::IDENTITY, Visibility::default()))
        .id();
    handles.root = Some(root);

    // Ground disc with the scope shader
    let disc_mesh = assets.mesh(
        &mut handles,
        Circle::new(scene.ground_radius).mesh().resolution(scene.ring_segments as u32),
    );
    let scope = assets.scope_materials.add(RadarScopeMaterial::new(accent));
    handles.scope_material = Some(scope.clone());
    let disc = commands
        .spawn((
            Mesh3d(disc_mesh),
            MeshMaterial3d(scope),
            Transform::from_rotation(flat()),
            ScopeDisc,
        ))
        .id();
    commands.entity(root).add_child(disc);

    // Bezel
    let bezel_mesh = assets.mesh(
        &mut handles,
        Annulus::new(scene.ground_radius, scene.ground_radius + scene.bezel_width)
            .mesh()
            .resolution(scene.ring_segments as u32),
    );
    let bezel_mat = assets.material(&mut handles, glow(accent, 0.55));
    let bezel = commands
        .spawn((
            Mesh3d(bezel_mesh),
            MeshMaterial3d(bezel_mat),
            Transform::from_xyz(0.0, 0.002, 0.0).with_rotation(flat()),
        ))
        .id();
    commands.entity(root).add_child(bezel);

    // Azimuth ticks, unit-height cuboids scaled per tick
    let tick_mesh = assets.mesh(&mut handles, Cuboid::new(0.025, 1.0, 0.025));
    let tick_mat = assets.material(&mut handles, glow(accent, 0.6));
    let cardinal_mat = assets.material(&mut handles, glow(accent, 0.95));
    for tick in geometry::azimuth_ticks(scene) {
        let material = if tick.cardinal {
            cardinal_mat.clone()
        } else {
            tick_mat.clone()
        };
        let entity = commands
            .spawn((
                Mesh3d(tick_mesh.clone()),
                MeshMaterial3d(material),
                Transform::from_translation(tick.base + Vec3::Y * tick.height * 0.5)
                    .with_rotation(Quat::from_rotation_y(tick.angle))
                    .with_scale(Vec3::new(1.0, tick.height, 1.0)),
            ))
            .id();
        commands.entity(root).add_child(entity);
    }

    // Range rings
    let ring_mat = assets.material(&mut handles, glow(accent, 0.35));
    for radius in geometry::range_ring_radii(scene) {
        let points = geometry::ring_polyline(radius, scene.ring_segments, OVERLAY_HEIGHT);
        let mesh = assets.mesh(&mut handles, line_mesh(points, PrimitiveTopology::LineStrip));
        let entity = commands
            .spawn((Mesh3d(mesh), MeshMaterial3d(ring_mat.clone()), Transform::IDENTITY))
            .id();
        commands.entity(root).add_child(entity);
    }

    // Sweep arm: a pivot rotated by the sweep angle with the blade along +X
    let arm_mesh = assets.mesh(&mut handles, Cuboid::new(scene.ground_radius, 0.015, 0.03));
    let arm_mat = assets.material(&mut handles, glow(accent, 0.9));
    let arm = commands
        .spawn((SweepArm, Transform::IDENTITY, Visibility::default()))
        .id();
    let blade = commands
        .spawn((
            Mesh3d(arm_mesh),
            MeshMaterial3d(arm_mat),
            Transform::from_xyz(scene.ground_radius * 0.5, 0.02, 0.0),
        ))
        .id();
    commands.entity(arm).add_child(blade);
    commands.entity(root).add_child(arm);

    // Hub
    let hub_mesh = assets.mesh(&mut handles, Cylinder::new(0.12, 0.1));
    let hub_mat = assets.material(
        &mut handles,
        StandardMaterial {
            base_color: accent.into(),
            emissive: Color::from(accent).to_linear() * 1.5,
            ..default()
        },
    );
    let hub = commands
        .spawn((Mesh3d(hub_mesh), MeshMaterial3d(hub_mat), Transform::from_xyz(0.0, 0.05, 0.0)))
        .id();
    commands.entity(root).add_child(hub);

    // Holographic rings; each gets its own material so opacity can pulse
    for index in 0..scene.holo_rings {
        let radius = geometry::holo_ring_radius(index, scene.holo_rings, scene.ground_radius);
        let mesh = assets.mesh(&mut handles, Torus::new(radius - 0.012, radius + 0.012));
        let material = assets.materials.add(glow(accent, 0.2));
        handles.holo_materials.push(material.clone());
        let pose = geometry::holo_ring_pose(index, scene.holo_rings, scene.ground_radius, 0.0);
        let entity = commands
            .spawn((
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::from_xyz(0.0, pose.height, 0.0).with_rotation(pose.rotation),
                HoloRing { index },
            ))
            .id();
        commands.entity(root).add_child(entity);
    }

    // Ambient particles
    let mut rng = SmallRng::seed_from_u64(seed ^ PARTICLE_SEED_SALT);
    let points = geometry::sample_particles(&mut rng, scene);
    let particle_mesh = assets.mesh(&mut handles, line_mesh(points, PrimitiveTopology::PointList));
    let particle_mat = assets.material(&mut handles, glow(accent, 0.5));
    let cloud = commands
        .spawn((
            Mesh3d(particle_mesh),
            MeshMaterial3d(particle_mat),
            Transform::IDENTITY,
            ParticleCloud,
        ))
        .id();
    commands.entity(root).add_child(cloud);

    // Blip meshes shared by every blip
    let marker_mesh = assets.mesh(&mut handles, Sphere::new(0.06));
    let ring_mesh = assets.mesh(&mut handles, Annulus::new(0.09, 0.11));
    handles.blip_marker_mesh = Some(marker_mesh);
    handles.blip_ring_mesh = Some(ring_mesh);

    handles.camera = Some(spawn_camera(commands, config, projection));

    for position in [Vec3::new(5.0, 5.0, 5.0), Vec3::new(-5.0, -5.0, 5.0)] {
        let light = commands
            .spawn((
                PointLight {
                    color: accent.into(),
                    intensity: 400_000.0,
                    range: 30.0,
                    ..default()
                },
                Transform::from_translation(position),
            ))
            .id();
        handles.lights.push(light);
    }

    Ok(handles)
}

fn spawn_camera(
    commands: &mut Commands,
    config: &ViewerConfig,
    projection: Option<ProjectionParams>,
) -> Entity {
    let mut perspective = PerspectiveProjection {
        fov: config.camera.fov_degrees.to_radians(),
        near: config.camera.near,
        far: config.camera.far,
        ..default()
    };
    if let Some(p) = projection {
        perspective.aspect_ratio = p.aspect;
    }
    let position = Vec3::from_array(config.camera.position);

    commands
        .spawn((
            Camera3d::default(),
            Projection::Perspective(perspective),
            Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y),
            DistanceFog {
                color: config.scene.background.into(),
                falloff: FogFalloff::Linear {
                    start: config.scene.fog_start,
                    end: config.scene.fog_end,
                },
                ..default()
            },
            ViewerCamera,
        ))
        .id()
}
