use crate::core::{Color, ViewerConfig};
use crate::Result;

pub fn viewer() -> ViewerBuilder {
    ViewerBuilder {
        config: ViewerConfig::default(),
    }
}

pub struct ViewerBuilder {
    config: ViewerConfig,
}

impl ViewerBuilder {
    /// Start from an existing configuration instead of the defaults.
    pub fn from_config(config: ViewerConfig) -> Self {
        Self { config }
    }

    pub fn background_color(mut self, c: Color) -> Self {
        self.config.scene.background = c;
        self
    }

    pub fn accent_color(mut self, c: Color) -> Self {
        self.config.scene.accent = c;
        self
    }

    pub fn initial_blips(mut self, n: usize) -> Self {
        self.config.sim.initial_blips = n;
        self
    }

    /// Hard cap on live blips
    pub fn max_blips(mut self, n: usize) -> Self {
        self.config.sim.max_blips = n;
        self
    }

    pub fn spawn_interval(mut self, seconds: f32) -> Self {
        self.config.sim.spawn_interval = seconds;
        self
    }

    pub fn fade_window(mut self, seconds: f32) -> Self {
        self.config.sim.fade_window = seconds;
        self
    }

    pub fn lifetime(mut self, min: f32, max: f32) -> Self {
        self.config.sim.lifetime_min = min;
        self.config.sim.lifetime_max = max;
        self
    }

    /// Fix the RNG seed so blip spawns and particles are reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.sim.seed = Some(seed);
        self
    }

    pub fn particles(mut self, count: usize) -> Self {
        self.config.scene.particle_count = count;
        self
    }

    pub fn sensitivity(mut self, radians_per_pixel: f32) -> Self {
        self.config.interaction.sensitivity = radians_per_pixel;
        self
    }

    pub fn rotation_limit(mut self, radians: f32) -> Self {
        self.config.interaction.limit = radians;
        self
    }

    pub fn smoothing(mut self, fraction: f32) -> Self {
        self.config.interaction.smoothing = fraction;
        self
    }

    pub fn frame_steps(mut self, time_step: f64, sweep_step: f64) -> Self {
        self.config.frame.time_step = time_step;
        self.config.frame.sweep_step = sweep_step;
        self
    }

    pub fn fov_degrees(mut self, fov: f32) -> Self {
        self.config.camera.fov_degrees = fov;
        self
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.config.start_paused = paused;
        self
    }

    /// Validate and return the configuration without running it.
    pub fn build(self) -> Result<ViewerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Open a native window and run the viewer until it is closed.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run_local(self) -> Result<()> {
        let config = self.build()?;
        crate::runtime::run_viewer(config, crate::runtime::LogSetup::Bevy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = viewer()
            .max_blips(20)
            .initial_blips(3)
            .seed(42)
            .paused(true)
            .build()
            .expect("valid config");
        assert_eq!(config.sim.max_blips, 20);
        assert_eq!(config.sim.initial_blips, 3);
        assert_eq!(config.sim.seed, Some(42));
        assert!(config.start_paused);
        assert_eq!(config.interaction.limit, 0.6);
    }

    #[test]
    fn builder_rejects_invalid_population() {
        assert!(viewer().initial_blips(13).build().is_err());
        assert!(viewer().max_blips(0).initial_blips(0).build().is_err());
    }
}
