pub mod components;
pub mod hud;
pub mod material;
pub mod mount;
pub mod resources;
pub mod scene;
pub mod systems;


use hud::*;
use mount::*;
pub use material::RadarScopeMaterial;
pub use mount::UnmountBehavior;
pub use resources::*;
use systems::*;

use bevy::asset::embedded_asset;
use bevy::prelude::*;

/// Renders a [`ViewerRes`] inserted by the host app.
///
/// The plugin mounts on startup, drives the viewer once per frame and tears it
/// down on an unmount request or when the app exits.
#[derive(Default)]
pub struct RadarViewerPlugin {
    /// Exit the app once the viewer has been unmounted
    pub exit_on_unmount: bool,
}

impl Plugin for RadarViewerPlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "shaders/radar_scope.wgsl");

        app.add_plugins(MaterialPlugin::<RadarScopeMaterial>::default())
            .init_resource::<SceneHandles>()
            .init_resource::<BlipRegistry>()
            .init_resource::<LastFrame>()
            .insert_resource(UnmountBehavior {
                exit_app: self.exit_on_unmount,
            })
            .add_systems(Startup, (spawn_hud, begin_mount).chain())
            .add_systems(
                Update,
                retry_mount.run_if(resource_exists::<MountRetry>.and(resource_exists::<ViewerRes>)),
            )
            .add_systems(
                Update,
                (
                    (
                        collect_pointer_input,
                        collect_touch_input,
                        collect_keyboard_input,
                        collect_resize,
                    )
                        .run_if(resource_exists::<InputListeners>.and(viewer_running)),
                    advance_viewer,
                    (
                        sync_scope_uniforms,
                        sync_root_rotation,
                        sync_sweep_arm,
                        animate_holo_rings,
                        spin_particles,
                        sway_camera,
                        sync_blips,
                        apply_projection,
                        apply_fullscreen,
                    )
                        .run_if(viewer_running),
                    (observe_window_mode, update_hud, clear_loading),
                )
                    .chain()
                    .run_if(resource_exists::<ViewerRes>),
            )
            .add_systems(
                Last,
                (teardown_viewer, exit_after_unmount)
                    .chain()
                    .run_if(resource_exists::<ViewerRes>),
            );
    }
}
