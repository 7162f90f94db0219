//! Mount and teardown state machine.
//!
//! A viewer builds its scene only once the host surface reports a non-zero
//! size. The first zero-size observation defers once; a second one aborts.
//! Teardown runs the [`TeardownHooks`] in a fixed order exactly once.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountPhase {
    Idle,
    /// Surface was zero-sized once; waiting for layout or the retry timer
    AwaitingLayout,
    Building,
    Running,
    /// Unmount requested; no further frames advance
    Stopping,
    Failed,
    Disposed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountDecision {
    Build,
    Defer,
    Abort,
    /// Mount already settled; the observation is ignored
    Skip,
}

/// Release steps, invoked by [`Lifecycle::teardown`] in declaration order.
pub trait TeardownHooks {
    fn cancel_frame_loop(&mut self);
    fn remove_listeners(&mut self);
    fn dispose_resources(&mut self);
    fn detach_surface(&mut self);
}

/// Hooks for a viewer with no render surface attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct Detached;

impl TeardownHooks for Detached {
    fn cancel_frame_loop(&mut self) {}
    fn remove_listeners(&mut self) {}
    fn dispose_resources(&mut self) {}
    fn detach_surface(&mut self) {}
}

#[derive(Clone, Debug)]
pub struct Lifecycle {
    phase: MountPhase,
    loading: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: MountPhase::Idle,
            loading: true,
        }
    }

    pub fn phase(&self) -> MountPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_running(&self) -> bool {
        self.phase == MountPhase::Running
    }

    pub fn is_disposed(&self) -> bool {
        self.phase == MountPhase::Disposed
    }

    /// Feed the current container size into the mount state machine.
    pub fn observe_container(&mut self, width: f32, height: f32) -> MountDecision {
        let sized = width > 0.0 && height > 0.0;
        match (self.phase, sized) {
            (MountPhase::Idle | MountPhase::AwaitingLayout, true) => {
                self.phase = MountPhase::Building;
                MountDecision::Build
            }
            (MountPhase::Idle, false) => {
                self.phase = MountPhase::AwaitingLayout;
                MountDecision::Defer
            }
            (MountPhase::AwaitingLayout, false) => {
                self.fail();
                MountDecision::Abort
            }
            _ => MountDecision::Skip,
        }
    }

    pub fn mark_running(&mut self) {
        if self.phase == MountPhase::Building {
            self.phase = MountPhase::Running;
        }
    }

    /// Clear the loading state after the first presented frame.
    /// Returns `true` only on the transition.
    pub fn first_frame_rendered(&mut self) -> bool {
        let was = self.loading;
        if self.phase == MountPhase::Running {
            self.loading = false;
        }
        was && !self.loading
    }

    /// Give up on mounting; the view stays empty.
    pub fn fail(&mut self) {
        if matches!(
            self.phase,
            MountPhase::Idle | MountPhase::AwaitingLayout | MountPhase::Building
        ) {
            self.phase = MountPhase::Failed;
        }
        self.loading = false;
    }

    pub fn request_stop(&mut self) {
        if self.phase != MountPhase::Disposed {
            self.phase = MountPhase::Stopping;
        }
    }

    /// Release everything in order. A second call does nothing and returns `false`.
    pub fn teardown<H: TeardownHooks + ?Sized>(&mut self, hooks: &mut H) -> bool {
        if self.phase == MountPhase::Disposed {
            return false;
        }
        self.phase = MountPhase::Stopping;
        hooks.cancel_frame_loop();
        hooks.remove_listeners();
        hooks.dispose_resources();
        hooks.detach_surface();
        self.phase = MountPhase::Disposed;
        self.loading = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<&'static str>);

    impl TeardownHooks for Recorder {
        fn cancel_frame_loop(&mut self) {
            self.0.push("cancel");
        }
        fn remove_listeners(&mut self) {
            self.0.push("listeners");
        }
        fn dispose_resources(&mut self) {
            self.0.push("dispose");
        }
        fn detach_surface(&mut self) {
            self.0.push("detach");
        }
    }

    #[test]
    fn sized_container_builds_immediately() {
        let mut life = Lifecycle::new();
        assert_eq!(life.observe_container(800.0, 600.0), MountDecision::Build);
        life.mark_running();
        assert!(life.is_running());
        assert!(life.is_loading());
        assert!(life.first_frame_rendered());
        assert!(!life.first_frame_rendered());
        assert_eq!(life.observe_container(800.0, 600.0), MountDecision::Skip);
    }

    #[test]
    fn zero_size_retries_once_then_aborts() {
        let mut life = Lifecycle::new();
        assert_eq!(life.observe_container(0.0, 600.0), MountDecision::Defer);
        assert_eq!(life.observe_container(0.0, 0.0), MountDecision::Abort);
        assert_eq!(life.phase(), MountPhase::Failed);
        assert!(!life.is_loading());
    }

    #[test]
    fn deferred_mount_recovers_on_layout() {
        let mut life = Lifecycle::new();
        assert_eq!(life.observe_container(0.0, 0.0), MountDecision::Defer);
        assert_eq!(life.observe_container(640.0, 480.0), MountDecision::Build);
    }

    #[test]
    fn teardown_runs_in_order_once() {
        let mut life = Lifecycle::new();
        life.observe_container(10.0, 10.0);
        life.mark_running();
        let mut rec = Recorder::default();
        assert!(life.teardown(&mut rec));
        assert_eq!(rec.0, vec!["cancel", "listeners", "dispose", "detach"]);
        assert!(!life.teardown(&mut rec));
        assert_eq!(rec.0.len(), 4);
        assert!(life.is_disposed());
    }
}
