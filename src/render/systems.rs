use bevy::input::mouse::MouseMotion;
use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::{MonitorSelection, PrimaryWindow, WindowMode, WindowResized};
use bevy_camera::Projection;

use super::components::*;
use super::material::RadarScopeMaterial;
use super::resources::*;
use super::scene::line_mesh;
use crate::core::Color as ScopeColor;
use crate::geometry::{self, BLIP_HEIGHT, OVERLAY_HEIGHT};
use crate::sim::{Blip, BlipId, ViewerIntent};
use bevy_mesh::PrimitiveTopology;

const TRAIL_OPACITY: f32 = 0.4;

pub fn viewer_running(viewer: Option<Res<ViewerRes>>) -> bool {
    viewer.is_some_and(|v| v.0.is_running())
}

/// Mouse drag: press starts, motion while held moves, release ends.
pub fn collect_pointer_input(
    viewer: Res<ViewerRes>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: MessageReader<MouseMotion>,
) {
    let intents = &viewer.0.handle().intents;
    if mouse.just_pressed(MouseButton::Left) {
        intents.push(ViewerIntent::DragStart);
    }

    let mut delta = Vec2::ZERO;
    for event in motion.read() {
        delta += event.delta;
    }
    if mouse.pressed(MouseButton::Left) && delta != Vec2::ZERO {
        intents.push(ViewerIntent::DragMove {
            dx: delta.x,
            dy: delta.y,
        });
    }

    if mouse.just_released(MouseButton::Left) {
        intents.push(ViewerIntent::DragEnd);
    }
}

/// Single-finger drag. Extra fingers are ignored until the first lifts.
pub fn collect_touch_input(
    viewer: Res<ViewerRes>,
    mut touches: MessageReader<TouchInput>,
    mut active: Local<Option<u64>>,
) {
    let intents = &viewer.0.handle().intents;
    for touch in touches.read() {
        let (x, y) = (touch.position.x, touch.position.y);
        match touch.phase {
            TouchPhase::Started if active.is_none() => {
                *active = Some(touch.id);
                intents.push(ViewerIntent::TouchStart { x, y });
            }
            TouchPhase::Moved if *active == Some(touch.id) => {
                intents.push(ViewerIntent::TouchMove { x, y });
            }
            TouchPhase::Ended | TouchPhase::Canceled if *active == Some(touch.id) => {
                *active = None;
                intents.push(ViewerIntent::TouchEnd);
            }
            _ => {}
        }
    }
}

pub fn collect_keyboard_input(viewer: Res<ViewerRes>, keys: Res<ButtonInput<KeyCode>>) {
    let handle = viewer.0.handle();
    if keys.just_pressed(KeyCode::Space) {
        handle.toggle_pause();
    }
    if keys.just_pressed(KeyCode::KeyR) {
        handle.reset_rotation();
    }
    if keys.just_pressed(KeyCode::KeyF) {
        handle.toggle_fullscreen();
    }
    if keys.just_pressed(KeyCode::Escape) {
        handle.unmount();
    }
}

pub fn collect_resize(
    viewer: Res<ViewerRes>,
    mut resized: MessageReader<WindowResized>,
    primary: Query<Entity, With<PrimaryWindow>>,
) {
    let Ok(primary) = primary.single() else {
        return;
    };
    if let Some(last) = resized.read().filter(|e| e.window == primary).last() {
        viewer.0.handle().intents.push(ViewerIntent::Resize {
            width: last.width,
            height: last.height,
        });
    }
}

pub fn advance_viewer(mut viewer: ResMut<ViewerRes>, mut last: ResMut<LastFrame>) {
    last.0 = viewer.0.tick();
}

pub fn sync_scope_uniforms(
    viewer: Res<ViewerRes>,
    last: Res<LastFrame>,
    handles: Res<SceneHandles>,
    mut scope_materials: ResMut<Assets<RadarScopeMaterial>>,
) {
    if !last.0.advanced {
        return;
    }
    let Some(handle) = &handles.scope_material else {
        return;
    };
    if let Some(material) = scope_materials.get_mut(handle) {
        material.scope.time = viewer.0.time();
        material.scope.sweep_angle = viewer.0.sweep_angle();
    }
}

pub fn sync_root_rotation(viewer: Res<ViewerRes>, mut roots: Query<&mut Transform, With<ViewerRoot>>) {
    let rotation = viewer.0.scene_rotation();
    for mut transform in roots.iter_mut() {
        if transform.rotation != rotation {
            transform.rotation = rotation;
        }
    }
}

pub fn sync_sweep_arm(
    viewer: Res<ViewerRes>,
    last: Res<LastFrame>,
    mut arms: Query<&mut Transform, With<SweepArm>>,
) {
    if !last.0.advanced {
        return;
    }
    let rotation = geometry::sweep_arm_rotation(viewer.0.sweep_angle());
    for mut transform in arms.iter_mut() {
        transform.rotation = rotation;
    }
}

pub fn animate_holo_rings(
    viewer: Res<ViewerRes>,
    last: Res<LastFrame>,
    mut rings: Query<(&HoloRing, &mut Transform, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !last.0.advanced {
        return;
    }
    let scene = &viewer.0.config().scene;
    let time = viewer.0.time();
    for (ring, mut transform, material) in rings.iter_mut() {
        let pose = geometry::holo_ring_pose(ring.index, scene.holo_rings, scene.ground_radius, time);
        transform.translation.y = pose.height;
        transform.rotation = pose.rotation;
        set_opacity(&mut materials, &material.0, pose.opacity);
    }
}

pub fn spin_particles(
    viewer: Res<ViewerRes>,
    last: Res<LastFrame>,
    mut clouds: Query<&mut Transform, With<ParticleCloud>>,
) {
    if !last.0.advanced {
        return;
    }
    let rotation = geometry::particle_spin(viewer.0.time());
    for mut transform in clouds.iter_mut() {
        transform.rotation = rotation;
    }
}

pub fn sway_camera(
    viewer: Res<ViewerRes>,
    last: Res<LastFrame>,
    mut cameras: Query<&mut Transform, With<ViewerCamera>>,
) {
    if !last.0.advanced {
        return;
    }
    let position = viewer.0.camera_position();
    for mut transform in cameras.iter_mut() {
        *transform = Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y);
    }
}

/// Recompute the aspect ratio after a resize; the scene itself is untouched.
pub fn apply_projection(last: Res<LastFrame>, mut cameras: Query<&mut Projection, With<ViewerCamera>>) {
    let Some(params) = last.0.projection else {
        return;
    };
    // The camera may already be gone if teardown raced the resize.
    for mut projection in cameras.iter_mut() {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = params.aspect;
            perspective.fov = params.fov;
        }
    }
}

pub fn apply_fullscreen(
    last: Res<LastFrame>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Some(fullscreen) = last.0.fullscreen else {
        return;
    };
    let Ok(mut window) = windows.single_mut() else {
        return;
    };
    window.mode = if fullscreen {
        WindowMode::BorderlessFullscreen(MonitorSelection::Current)
    } else {
        WindowMode::Windowed
    };
    debug!("fullscreen {}", if fullscreen { "on" } else { "off" });
}

/// Keep the viewer's notion of fullscreen in step with the window.
pub fn observe_window_mode(
    mut viewer: ResMut<ViewerRes>,
    windows: Query<&Window, (With<PrimaryWindow>, Changed<Window>)>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let fullscreen = !matches!(window.mode, WindowMode::Windowed);
    if viewer.0.is_fullscreen() != fullscreen {
        viewer.0.sync_fullscreen(fullscreen);
    }
}

/// Diff simulated blips against spawned visuals by id.
pub fn sync_blips(
    mut commands: Commands,
    viewer: Res<ViewerRes>,
    last: Res<LastFrame>,
    handles: Res<SceneHandles>,
    mut registry: ResMut<BlipRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut transforms: Query<&mut Transform>,
) {
    let (Some(root), Some(marker_mesh), Some(ring_mesh)) = (
        handles.root,
        handles.blip_marker_mesh.clone(),
        handles.blip_ring_mesh.clone(),
    ) else {
        return;
    };
    let state = &viewer.0;

    let retired: Vec<BlipId> = registry
        .by_blip
        .keys()
        .filter(|id| !state.blips().contains(**id))
        .copied()
        .collect();
    for id in retired {
        if let Some(visuals) = registry.by_blip.remove(&id) {
            despawn_blip(&mut commands, &mut meshes, &mut materials, visuals);
        }
    }

    let accent = state.config().scene.accent;
    for blip in state.blips().iter() {
        if !registry.by_blip.contains_key(&blip.id) {
            let visuals = spawn_blip(
                &mut commands,
                root,
                &marker_mesh,
                &ring_mesh,
                &mut meshes,
                &mut materials,
                accent,
                blip,
            );
            registry.by_blip.insert(blip.id, visuals);
            continue;
        }
        if !last.0.advanced {
            continue;
        }
        let Some(visuals) = registry.by_blip.get(&blip.id) else {
            continue;
        };

        let position = geometry::plane_to_world(blip.position, BLIP_HEIGHT);
        if let Ok(mut t) = transforms.get_mut(visuals.marker) {
            t.translation = position;
        }
        if let Ok(mut t) = transforms.get_mut(visuals.ring) {
            t.translation = position.with_y(OVERLAY_HEIGHT * 2.0);
            t.scale = Vec3::splat(blip.visual.ring_scale);
        }
        set_opacity(&mut materials, &visuals.marker_material, blip.visual.marker_opacity);
        set_opacity(&mut materials, &visuals.ring_material, blip.visual.ring_opacity);
        set_opacity(
            &mut materials,
            &visuals.trail_material,
            TRAIL_OPACITY * blip.visual.fade,
        );
        if let Some(mesh) = meshes.get_mut(&visuals.trail_mesh) {
            let positions: Vec<[f32; 3]> = geometry::trail_polyline(&blip.trail)
                .into_iter()
                .map(|p| p.to_array())
                .collect();
            mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        }
    }
}

fn blip_material(color: ScopeColor, alpha: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: color.with_a(alpha).into(),
        emissive: Color::from(color).to_linear() * 0.8,
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        double_sided: true,
        cull_mode: None,
        ..default()
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_blip(
    commands: &mut Commands,
    root: Entity,
    marker_mesh: &Handle<Mesh>,
    ring_mesh: &Handle<Mesh>,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    accent: ScopeColor,
    blip: &Blip,
) -> BlipVisualEntities {
    let position = geometry::plane_to_world(blip.position, BLIP_HEIGHT);
    let marker_material = materials.add(blip_material(accent, blip.visual.marker_opacity));
    let ring_material = materials.add(blip_material(accent, blip.visual.ring_opacity));
    let trail_material = materials.add(blip_material(accent, TRAIL_OPACITY * blip.visual.fade));
    let trail_mesh = meshes.add(line_mesh(
        geometry::trail_polyline(&blip.trail),
        PrimitiveTopology::LineStrip,
    ));

    let marker = commands
        .spawn((
            Mesh3d(marker_mesh.clone()),
            MeshMaterial3d(marker_material.clone()),
            Transform::from_translation(position),
            BlipPart::Marker(blip.id),
        ))
        .id();
    let ring = commands
        .spawn((
            Mesh3d(ring_mesh.clone()),
            MeshMaterial3d(ring_material.clone()),
            Transform::from_translation(position.with_y(OVERLAY_HEIGHT * 2.0))
                .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2))
                .with_scale(Vec3::splat(blip.visual.ring_scale)),
            BlipPart::Ring(blip.id),
        ))
        .id();
    let trail = commands
        .spawn((
            Mesh3d(trail_mesh.clone()),
            MeshMaterial3d(trail_material.clone()),
            Transform::IDENTITY,
            BlipPart::Trail(blip.id),
        ))
        .id();
    commands.entity(root).add_children(&[marker, ring, trail]);

    BlipVisualEntities {
        marker,
        ring,
        trail,
        marker_material,
        ring_material,
        trail_material,
        trail_mesh,
    }
}

pub fn despawn_blip(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    visuals: BlipVisualEntities,
) {
    for entity in [visuals.marker, visuals.ring, visuals.trail] {
        if let Ok(mut e) = commands.get_entity(entity) {
            e.despawn();
        }
    }
    materials.remove(&visuals.marker_material);
    materials.remove(&visuals.ring_material);
    materials.remove(&visuals.trail_material);
    meshes.remove(&visuals.trail_mesh);
}

fn set_opacity(materials: &mut Assets<StandardMaterial>, handle: &Handle<StandardMaterial>, alpha: f32) {
    if let Some(material) = materials.get_mut(handle) {
        material.base_color.set_alpha(alpha.clamp(0.0, 1.0));
    }
}
