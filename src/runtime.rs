use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;
use error_stack::report;

use crate::core::ViewerConfig;
use crate::render::{RadarViewerPlugin, ViewerRes};
use crate::sim::ViewerHandle;
use crate::viewer::ViewerState;
use crate::{Result, ViewerError};

/// Who installs the global `tracing` subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogSetup {
    /// Bevy's `LogPlugin` does it
    #[default]
    Bevy,
    /// The host already did; `LogPlugin` is disabled
    External,
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug)]
pub struct NativeOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub log: LogSetup,
    /// Shared control surface; a fresh one is created when `None`
    pub handle: Option<ViewerHandle>,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for NativeOptions {
    fn default() -> Self {
        Self {
            title: "Radar".to_string(),
            width: 1280,
            height: 720,
            log: LogSetup::Bevy,
            handle: None,
        }
    }
}

/// winit runs one event loop per process, and a browser page is one process.
/// Once a viewer has started it, no other viewer can mount, even after unmount.
struct EventLoopSlot(AtomicBool);

impl EventLoopSlot {
    const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    fn claim(&self) -> Result<()> {
        if self.0.swap(true, Ordering::AcqRel) {
            return Err(report!(ViewerError)
                .attach("the event loop is already taken; only one radar viewer can mount per page or process"));
        }
        Ok(())
    }
}

static EVENT_LOOP: EventLoopSlot = EventLoopSlot::new();

fn base_app(state: ViewerState) -> App {
    let bg = state.config().scene.background;
    let mut app = App::new();
    app.insert_resource(ClearColor(bg.into()))
        .insert_resource(ViewerRes::new(state));
    app
}

fn exit_result(exit: AppExit) -> Result<()> {
    match exit {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => {
            Err(report!(ViewerError).attach(format!("viewer exited with code {code}")))
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn run_viewer(config: ViewerConfig, log: LogSetup) -> Result<()> {
    run_native(
        config,
        NativeOptions {
            log,
            ..Default::default()
        },
    )
}

/// Open a native window and block until the viewer exits.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_native(config: ViewerConfig, options: NativeOptions) -> Result<()> {
    use bevy::log::LogPlugin;

    let handle = options.handle.unwrap_or_default();
    let state = ViewerState::with_handle(config, handle)?;
    EVENT_LOOP.claim()?;

    let mut window = Window {
        title: options.title,
        ..default()
    };
    window.resolution.set(options.width as f32, options.height as f32);
    let window_plugin = WindowPlugin {
        primary_window: Some(window),
        ..default()
    };

    let mut app = base_app(state);
    match options.log {
        LogSetup::Bevy => app.add_plugins(DefaultPlugins.set(window_plugin)),
        LogSetup::External => {
            app.add_plugins(DefaultPlugins.set(window_plugin).disable::<LogPlugin>())
        }
    };
    app.add_plugins(RadarViewerPlugin {
        exit_on_unmount: true,
    });
    exit_result(app.run())
}

#[cfg(target_arch = "wasm32")]
pub fn run_viewer(config: ViewerConfig, canvas_id: &str) -> Result<()> {
    run_in_canvas(config, canvas_id, ViewerHandle::default())
}

/// Start the viewer on an existing `<canvas id=...>`. Returns once the
/// browser event loop has taken over. Fails if a viewer already started on
/// this page.
#[cfg(target_arch = "wasm32")]
pub fn run_in_canvas(config: ViewerConfig, canvas_id: &str, handle: ViewerHandle) -> Result<()> {
    let state = ViewerState::with_handle(config, handle)?;
    EVENT_LOOP.claim()?;
    let mut app = base_app(state);
    app.add_plugins((
        DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                canvas: Some(format!("#{}", canvas_id)),
                fit_canvas_to_parent: true,
                ..default()
            }),
            ..default()
        }),
        RadarViewerPlugin::default(),
    ));
    exit_result(app.run())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_loop_is_claimed_once() {
        let slot = EventLoopSlot::new();
        assert!(slot.claim().is_ok());
        let err = slot.claim().expect_err("second claim");
        assert!(format!("{err:?}").contains("only one radar viewer"));
    }
}
