//! The per-viewer state and its frame step.
//!
//! [`ViewerState`] owns everything one mounted viewer needs: config, clock,
//! rotation, blips, lifecycle and the shared host handle. It has no engine
//! dependency; the render plugin holds it as a resource and mirrors it into
//! the scene after each [`ViewerState::tick`].

use bevy::log::{debug, info, warn};
use bevy_math::{Quat, Vec2, Vec3};

use crate::Result;
use crate::core::ViewerConfig;
use crate::geometry::{self, ProjectionParams};
use crate::lifecycle::{Lifecycle, MountDecision, MountPhase, TeardownHooks};
use crate::sim::{
    BlipField, DragController, PopulationChange, RotationState, SimClock, ViewerHandle,
    ViewerIntent,
};

/// What one tick changed, for the render side to mirror.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Simulation moved forward this tick (false while paused or stopped)
    pub advanced: bool,
    pub population: PopulationChange,
    /// New projection after a resize
    pub projection: Option<ProjectionParams>,
    /// Requested fullscreen state after a toggle
    pub fullscreen: Option<bool>,
    pub unmount_requested: bool,
}

pub struct ViewerState {
    config: ViewerConfig,
    clock: SimClock,
    rotation: RotationState,
    drag: DragController,
    blips: BlipField,
    handle: ViewerHandle,
    lifecycle: Lifecycle,
    projection: Option<ProjectionParams>,
    fullscreen: bool,
    seed: u64,
}

impl ViewerState {
    pub fn new(config: ViewerConfig) -> Result<Self> {
        Self::with_handle(config, ViewerHandle::default())
    }

    /// Build a viewer that reports through (and listens on) an existing handle.
    pub fn with_handle(config: ViewerConfig, handle: ViewerHandle) -> Result<Self> {
        config.validate()?;
        let seed = config.sim.seed.unwrap_or_else(host_seed);
        let mut clock = SimClock::new(&config.frame);
        clock.set_paused(config.start_paused);

        handle.outputs.publish_loading(true);
        handle.outputs.publish_paused(config.start_paused);
        handle.outputs.publish_live_count(0);

        Ok(Self {
            blips: BlipField::new(config.sim.clone(), seed),
            drag: DragController::new(config.interaction),
            rotation: RotationState::default(),
            lifecycle: Lifecycle::new(),
            projection: None,
            fullscreen: false,
            clock,
            handle,
            config,
            seed,
        })
    }

    /// Observe the host surface size; on success seed the initial blips.
    pub fn mount(&mut self, width: f32, height: f32) -> MountDecision {
        let decision = self.lifecycle.observe_container(width, height);
        match decision {
            MountDecision::Build => {
                self.projection = ProjectionParams::for_size(&self.config.camera, width, height);
                let seeded = self.blips.seed_initial(self.clock.time());
                self.lifecycle.mark_running();
                info!(
                    "radar viewer mounted at {width}x{height}, {} blips, seed {}",
                    seeded.len(),
                    self.seed
                );
            }
            MountDecision::Defer => {
                debug!("surface not laid out yet ({width}x{height}), deferring mount");
            }
            MountDecision::Abort => {
                warn!("surface still zero-sized after retry, viewer stays empty");
            }
            MountDecision::Skip => {}
        }
        self.publish();
        decision
    }

    /// Abandon the mount after a build failure.
    pub fn fail(&mut self, reason: &str) {
        warn!("radar viewer failed to initialise: {reason}");
        self.lifecycle.fail();
        self.blips.clear();
        self.publish();
    }

    /// Run one frame: apply queued input, ease rotation, advance the simulation.
    pub fn tick(&mut self) -> FrameReport {
        let mut report = FrameReport::default();
        match self.lifecycle.phase() {
            MountPhase::Running => {}
            // Input waits for the mount, but an unmount cancels it.
            MountPhase::Idle | MountPhase::AwaitingLayout | MountPhase::Building => {
                if self.handle.intents.contains(ViewerIntent::Unmount) {
                    self.handle.intents.clear();
                    self.lifecycle.request_stop();
                    report.unmount_requested = true;
                    self.publish();
                }
                return report;
            }
            MountPhase::Stopping | MountPhase::Failed | MountPhase::Disposed => {
                self.handle.intents.clear();
                return report;
            }
        }

        for intent in self.handle.intents.drain() {
            if intent == ViewerIntent::Unmount {
                report.unmount_requested = true;
                break;
            }
            self.apply(intent, &mut report);
        }
        if report.unmount_requested {
            self.lifecycle.request_stop();
            self.publish();
            return report;
        }

        self.drag.ease(&mut self.rotation);
        if self.clock.tick() {
            report.population = self.blips.advance(self.clock.dt() as f32, self.clock.time());
            report.advanced = true;
        }

        self.publish();
        report
    }

    fn apply(&mut self, intent: ViewerIntent, report: &mut FrameReport) {
        match intent {
            ViewerIntent::DragStart => self.drag.drag_start(),
            ViewerIntent::DragMove { dx, dy } => self.drag.drag_move(dx, dy, &mut self.rotation),
            ViewerIntent::DragEnd => self.drag.drag_end(),
            ViewerIntent::TouchStart { x, y } => self.drag.touch_start(Vec2::new(x, y)),
            ViewerIntent::TouchMove { x, y } => {
                self.drag.touch_move(Vec2::new(x, y), &mut self.rotation)
            }
            ViewerIntent::TouchEnd => self.drag.touch_end(),
            ViewerIntent::ResetRotation => self.drag.reset(&mut self.rotation),
            ViewerIntent::TogglePause => {
                let paused = self.clock.toggle_pause();
                info!("radar viewer {}", if paused { "paused" } else { "resumed" });
            }
            ViewerIntent::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                report.fullscreen = Some(self.fullscreen);
            }
            ViewerIntent::Resize { width, height } => {
                match ProjectionParams::for_size(&self.config.camera, width, height) {
                    Some(p) => {
                        self.projection = Some(p);
                        report.projection = Some(p);
                    }
                    None => debug!("ignoring zero-size resize"),
                }
            }
            // handled by the caller
            ViewerIntent::Unmount => {}
        }
    }

    /// Clear the loading state once something has been presented.
    pub fn first_frame_rendered(&mut self) {
        if self.lifecycle.first_frame_rendered() {
            debug!("first radar frame presented");
            self.publish();
        }
    }

    /// Release the viewer. Safe to call more than once.
    pub fn teardown<H: TeardownHooks + ?Sized>(&mut self, hooks: &mut H) -> bool {
        let released = self.lifecycle.teardown(hooks);
        if released {
            self.blips.clear();
            self.handle.intents.clear();
            self.publish();
            info!("radar viewer unmounted");
        }
        released
    }

    /// The host reports the real fullscreen state (e.g. the user left it).
    pub fn sync_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    fn publish(&self) {
        let outputs = &self.handle.outputs;
        outputs.publish_live_count(self.blips.live_count());
        outputs.publish_paused(self.clock.is_paused());
        outputs.publish_loading(self.lifecycle.is_loading());
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn handle(&self) -> &ViewerHandle {
        &self.handle
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn blips(&self) -> &BlipField {
        &self.blips
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn projection(&self) -> Option<ProjectionParams> {
        self.projection
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn live_count(&self) -> usize {
        self.blips.live_count()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shader `time` uniform.
    pub fn time(&self) -> f32 {
        self.clock.time() as f32
    }

    /// Shader `sweep_angle` uniform, in `[0, 2π)`.
    pub fn sweep_angle(&self) -> f32 {
        self.clock.sweep_angle() as f32
    }

    pub fn scene_rotation(&self) -> Quat {
        geometry::scene_rotation(&self.rotation)
    }

    pub fn camera_position(&self) -> Vec3 {
        geometry::camera_sway(
            Vec3::from_array(self.config.camera.position),
            self.time(),
            self.config.frame.sway,
        )
    }
}

fn host_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5eed)
    }
}
