use error_stack::report;
use serde::{Deserialize, Serialize};

use crate::{Result, ViewerError};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
    pub const fn with_a(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Build an opaque color from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
        )
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Scope phosphor green (`#4ade80`).
    pub const SCOPE_GREEN: Self = Self::hex(0x4ade80);
    /// Near-black backdrop (`#09090b`).
    pub const BACKDROP: Self = Self::hex(0x09090b);

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for bevy::prelude::Color {
    #[inline]
    fn from(c: Color) -> Self {
        bevy::prelude::Color::srgba(c.r, c.g, c.b, c.a)
    }
}

/// Static radar assembly parameters (built once per mount).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Radius of the shaded ground disc; the shader's unit circle maps onto it
    pub ground_radius: f32,
    pub bezel_width: f32,
    pub tick_count: usize,
    /// Every n-th tick is a taller cardinal tick
    pub cardinal_every: usize,
    pub tick_height: f32,
    pub cardinal_tick_height: f32,
    pub range_rings: usize,
    pub ring_segments: usize,
    pub holo_rings: usize,
    pub particle_count: usize,
    pub particle_inner_radius: f32,
    pub particle_outer_radius: f32,
    pub particle_max_height: f32,
    pub background: Color,
    pub accent: Color,
    pub fog_start: f32,
    pub fog_end: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            ground_radius: 4.0,
            bezel_width: 0.15,
            tick_count: 36,
            cardinal_every: 9,
            tick_height: 0.08,
            cardinal_tick_height: 0.22,
            range_rings: 5,
            ring_segments: 128,
            holo_rings: 3,
            particle_count: 300,
            particle_inner_radius: 4.6,
            particle_outer_radius: 7.5,
            particle_max_height: 2.5,
            background: Color::BACKDROP,
            accent: Color::SCOPE_GREEN,
            fog_start: 10.0,
            fog_end: 15.0,
        }
    }
}

/// Blip population rules.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub initial_blips: usize,
    pub max_blips: usize,
    /// Minimum simulated seconds between two cadence spawns
    pub spawn_interval: f32,
    /// Seconds an expiring blip takes to fade to zero opacity
    pub fade_window: f32,
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    pub spawn_distance_min: f32,
    pub spawn_distance_max: f32,
    /// Blips farther than this from the origin start fading out
    pub scene_radius: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub trail_len: usize,
    /// Fixed RNG seed; `None` seeds from the host clock
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_blips: 6,
            max_blips: 12,
            spawn_interval: 1.5,
            fade_window: 1.5,
            lifetime_min: 6.0,
            lifetime_max: 11.0,
            spawn_distance_min: 0.5,
            spawn_distance_max: 3.5,
            scene_radius: 3.5,
            speed_min: 0.05,
            speed_max: 0.25,
            trail_len: 20,
            seed: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Radians of target rotation per pixel of drag
    pub sensitivity: f32,
    /// Symmetric clamp for both target axes, in radians
    pub limit: f32,
    /// Fraction of the remaining distance covered each frame
    pub smoothing: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.004,
            limit: 0.6,
            smoothing: 0.15,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Simulated seconds added per rendered frame
    pub time_step: f64,
    /// Radians the sweep advances per rendered frame
    pub sweep_step: f64,
    /// Amplitude of the idle camera dolly/sway
    pub sway: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            time_step: 0.016,
            sweep_step: 0.02,
            sway: 0.25,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 4.8, 5.6],
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Fallback delay before the single mount retry, in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self { retry_delay_ms: 50 }
    }
}

/// Full viewer configuration. Every field has a default, so partial JSON is accepted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub scene: SceneConfig,
    pub sim: SimConfig,
    pub interaction: InteractionConfig,
    pub frame: FrameConfig,
    pub camera: CameraConfig,
    pub mount: MountConfig,
    /// Start with the simulation frozen
    pub start_paused: bool,
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| report!(ViewerError).attach(format!("invalid viewer config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| report!(ViewerError).attach(format!("failed to serialize config: {e}")))
    }

    /// Reject configurations the simulator or builder cannot honour.
    pub fn validate(&self) -> Result<()> {
        let sim = &self.sim;
        let scene = &self.scene;

        let checks: [(bool, &str); 14] = [
            (sim.max_blips > 0, "sim.max_blips must be at least 1"),
            (
                sim.initial_blips <= sim.max_blips,
                "sim.initial_blips must not exceed sim.max_blips",
            ),
            (sim.spawn_interval > 0.0, "sim.spawn_interval must be positive"),
            (sim.fade_window > 0.0, "sim.fade_window must be positive"),
            (
                sim.lifetime_min > 0.0 && sim.lifetime_min <= sim.lifetime_max,
                "sim.lifetime_min must be positive and <= sim.lifetime_max",
            ),
            (
                sim.spawn_distance_min >= 0.0 && sim.spawn_distance_min <= sim.spawn_distance_max,
                "sim spawn distance range is empty",
            ),
            (
                sim.spawn_distance_max <= sim.scene_radius,
                "sim.spawn_distance_max must lie inside sim.scene_radius",
            ),
            (
                sim.speed_min >= 0.0 && sim.speed_min <= sim.speed_max,
                "sim speed range is empty",
            ),
            (sim.trail_len > 0, "sim.trail_len must be at least 1"),
            (
                self.frame.time_step > 0.0 && self.frame.sweep_step > 0.0,
                "frame steps must be positive",
            ),
            (
                self.interaction.limit >= 0.0,
                "interaction.limit must be non-negative",
            ),
            (
                self.interaction.smoothing > 0.0 && self.interaction.smoothing <= 1.0,
                "interaction.smoothing must lie in (0, 1]",
            ),
            (
                scene.cardinal_every > 0 && scene.tick_count > 0,
                "scene tick layout needs tick_count > 0 and cardinal_every > 0",
            ),
            (
                scene.particle_inner_radius <= scene.particle_outer_radius,
                "scene particle annulus is inverted",
            ),
        ];

        for (ok, message) in checks {
            if !ok {
                return Err(report!(ViewerError).attach(message));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_decode() {
        let c = Color::hex(0x4ade80);
        assert!((c.r - 74.0 / 255.0).abs() < 1e-6);
        assert!((c.g - 222.0 / 255.0).abs() < 1e-6);
        assert!((c.b - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = ViewerConfig::from_json(r#"{ "sim": { "max_blips": 8, "seed": 7 } }"#)
            .expect("partial config parses");
        assert_eq!(config.sim.max_blips, 8);
        assert_eq!(config.sim.seed, Some(7));
        assert_eq!(config.sim.initial_blips, 6);
        assert_eq!(config.scene.tick_count, 36);
    }

    #[test]
    fn rejects_initial_above_cap() {
        let json = r#"{ "sim": { "initial_blips": 20, "max_blips": 12 } }"#;
        assert!(ViewerConfig::from_json(json).is_err());
    }

    #[test]
    fn rejects_garbage_json() {
        assert!(ViewerConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn json_round_trip_keeps_values() {
        let mut config = ViewerConfig::default();
        config.sim.seed = Some(42);
        config.start_paused = true;
        let json = config.to_json().expect("serializes");
        let back = ViewerConfig::from_json(&json).expect("parses");
        assert_eq!(back.sim.seed, Some(42));
        assert!(back.start_paused);
    }
}
