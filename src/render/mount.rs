//! Mounting the viewer into the primary window and tearing it down again.

use std::time::Duration;

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use super::components::{HudRoot, LoadingOverlay};
use super::material::RadarScopeMaterial;
use super::resources::*;
use super::scene::{SceneAssets, build_scene};
use super::systems::despawn_blip;
use crate::lifecycle::{MountDecision, TeardownHooks};
use crate::viewer::ViewerState;

/// Present while input is wired to the viewer.
#[derive(Resource)]
pub struct InputListeners;

/// What detaching the surface does beyond despawning the camera.
#[derive(Resource, Clone, Copy, Default)]
pub struct UnmountBehavior {
    pub exit_app: bool,
}

fn window_size(windows: &Query<&Window, With<PrimaryWindow>>) -> (f32, f32) {
    windows
        .single()
        .map(|w| (w.width(), w.height()))
        .unwrap_or((0.0, 0.0))
}

fn observe_and_build(
    commands: &mut Commands,
    state: &mut ViewerState,
    assets: &mut SceneAssets,
    (width, height): (f32, f32),
) -> MountDecision {
    let decision = state.mount(width, height);
    match decision {
        MountDecision::Build => {
            match build_scene(commands, assets, state.config(), state.seed(), state.projection()) {
                Ok(handles) => {
                    commands.insert_resource(handles);
                    commands.insert_resource(InputListeners);
                }
                Err(report) => {
                    error!("radar scene construction failed: {report:?}");
                    state.fail("scene construction failed");
                }
            }
        }
        MountDecision::Defer => {
            let delay = Duration::from_millis(state.config().mount.retry_delay_ms);
            commands.insert_resource(MountRetry {
                timer: Timer::new(delay, TimerMode::Once),
            });
        }
        MountDecision::Abort | MountDecision::Skip => {}
    }
    decision
}

pub fn begin_mount(
    mut commands: Commands,
    viewer: Option<ResMut<ViewerRes>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut scope_materials: ResMut<Assets<RadarScopeMaterial>>,
) {
    let Some(mut viewer) = viewer else {
        warn!("RadarViewerPlugin has no ViewerRes to mount");
        return;
    };
    let mut assets = SceneAssets {
        meshes: &mut meshes,
        materials: &mut materials,
        scope_materials: &mut scope_materials,
    };
    observe_and_build(&mut commands, &mut viewer.0, &mut assets, window_size(&windows));
}

/// Second and last mount attempt: on the first real layout, or when the timer runs out.
#[allow(clippy::too_many_arguments)]
pub fn retry_mount(
    mut commands: Commands,
    mut viewer: ResMut<ViewerRes>,
    mut retry: ResMut<MountRetry>,
    time: Res<Time>,
    mut resized: MessageReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut scope_materials: ResMut<Assets<RadarScopeMaterial>>,
) {
    let laid_out = resized.read().any(|e| e.width > 0.0 && e.height > 0.0);
    retry.timer.tick(time.delta());
    if !laid_out && !retry.timer.just_finished() {
        return;
    }
    commands.remove_resource::<MountRetry>();

    let mut assets = SceneAssets {
        meshes: &mut meshes,
        materials: &mut materials,
        scope_materials: &mut scope_materials,
    };
    let decision = observe_and_build(&mut commands, &mut viewer.0, &mut assets, window_size(&windows));
    debug!("mount retry ({}): {decision:?}", if laid_out { "layout" } else { "timer" });
}

/// Releases the Bevy side of a viewer in the order [`TeardownHooks`] prescribes.
struct SceneTeardown<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    last: &'a mut LastFrame,
    handles: &'a mut SceneHandles,
    registry: &'a mut BlipRegistry,
    meshes: &'a mut Assets<Mesh>,
    materials: &'a mut Assets<StandardMaterial>,
    scope_materials: &'a mut Assets<RadarScopeMaterial>,
    surface: Vec<Entity>,
}

impl TeardownHooks for SceneTeardown<'_, '_, '_> {
    fn cancel_frame_loop(&mut self) {
        // The loop stops through the `viewer_running` run condition once the
        // lifecycle leaves Running. Dropping the last report keeps its resize,
        // fullscreen and population changes from reaching the scene.
        self.last.0 = Default::default();
    }

    fn remove_listeners(&mut self) {
        self.commands.remove_resource::<InputListeners>();
        self.commands.remove_resource::<MountRetry>();
    }

    fn dispose_resources(&mut self) {
        for (_, visuals) in self.registry.by_blip.drain() {
            despawn_blip(self.commands, self.meshes, self.materials, visuals);
        }
        let handles = std::mem::take(self.handles);
        for entity in handles.root.into_iter().chain(handles.lights) {
            if let Ok(mut e) = self.commands.get_entity(entity) {
                e.despawn();
            }
        }
        for mesh in handles
            .meshes
            .iter()
            .chain(handles.blip_marker_mesh.iter())
            .chain(handles.blip_ring_mesh.iter())
        {
            self.meshes.remove(mesh);
        }
        for material in handles.materials.iter().chain(handles.holo_materials.iter()) {
            self.materials.remove(material);
        }
        if let Some(scope) = &handles.scope_material {
            self.scope_materials.remove(scope);
        }
        // Camera belongs to the surface and goes last.
        *self.handles = SceneHandles {
            camera: handles.camera,
            ..Default::default()
        };
    }

    fn detach_surface(&mut self) {
        let camera = self.handles.camera.take();
        for entity in camera.into_iter().chain(self.surface.drain(..)) {
            if let Ok(mut e) = self.commands.get_entity(entity) {
                e.despawn();
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn teardown_viewer(
    mut commands: Commands,
    mut viewer: ResMut<ViewerRes>,
    mut last: ResMut<LastFrame>,
    mut handles: ResMut<SceneHandles>,
    mut registry: ResMut<BlipRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut scope_materials: ResMut<Assets<RadarScopeMaterial>>,
    surface: Query<Entity, Or<(With<HudRoot>, With<LoadingOverlay>)>>,
    mut exits: MessageReader<AppExit>,
) {
    let exiting = exits.read().count() > 0;
    if !(last.0.unmount_requested || exiting) || viewer.0.lifecycle().is_disposed() {
        return;
    }

    let mut hooks = SceneTeardown {
        commands: &mut commands,
        last: &mut last,
        handles: &mut handles,
        registry: &mut registry,
        meshes: &mut meshes,
        materials: &mut materials,
        scope_materials: &mut scope_materials,
        surface: surface.iter().collect(),
    };
    viewer.0.teardown(&mut hooks);
}

pub fn exit_after_unmount(
    viewer: Res<ViewerRes>,
    behavior: Res<UnmountBehavior>,
    mut exit: MessageWriter<AppExit>,
    mut sent: Local<bool>,
) {
    if behavior.exit_app && !*sent && viewer.0.lifecycle().is_disposed() {
        exit.write(AppExit::Success);
        *sent = true;
    }
}
