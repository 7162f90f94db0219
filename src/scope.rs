//! CPU reference of the radar scope fragment program.
//!
//! `render/shaders/radar_scope.wgsl` is the GPU version; both evaluate the
//! same layers in the same order. Keep them in sync when tuning constants.
//!
//! `uv` follows Bevy's circle mesh convention: `u` grows with +x and `v`
//! grows toward -y, so the centered point is `((u - 0.5) * 2, (0.5 - v) * 2)`.

use std::f32::consts::TAU;

use bevy_math::{Vec2, Vec3, Vec4};

pub const RING_COUNT: u32 = 5;
pub const RING_SPACING: f32 = 0.2;
const RING_SHARPNESS: f32 = 120.0;
const RING_GAIN: f32 = 0.35;
const GRID_CELLS: f32 = 5.0;
const GRID_SHARPNESS: f32 = 40.0;
const GRID_GAIN: f32 = 0.08;
const CROSS_SHARPNESS: f32 = 150.0;
const CROSS_GAIN: f32 = 0.3;
/// Angular width of the leading beam, radians
pub const BEAM_WIDTH: f32 = 0.06;
const BEAM_GAIN: f32 = 0.9;
/// Angular width of the trail behind the beam, radians
pub const TRAIL_WIDTH: f32 = 1.2;
const TRAIL_GAIN: f32 = 0.35;
pub const CLUTTER_GAIN: f32 = 0.05;
const EDGE_GAIN: f32 = 0.3;
const CENTER_GAIN: f32 = 0.8;
const SCANLINE_FREQ: f32 = 300.0;
const BASE: Vec3 = Vec3::new(0.008, 0.02, 0.012);

/// GLSL/WGSL `smoothstep`, also defined for reversed edges.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// GLSL/WGSL `step`: 1 when `x >= edge`.
pub fn step(edge: f32, x: f32) -> f32 {
    if x >= edge { 1.0 } else { 0.0 }
}

/// Wrap an angle difference into `(-π, π]`.
pub fn wrap_angle(d: f32) -> f32 {
    d.sin().atan2(d.cos())
}

fn hash(p: Vec2) -> f32 {
    let h = (p.dot(Vec2::new(12.9898, 78.233))).sin() * 43758.5453;
    h - h.floor()
}

/// Map a polar point of the centered scope to mesh uv.
pub fn uv_from_polar(r: f32, angle: f32) -> Vec2 {
    let p = Vec2::from_angle(angle) * r;
    Vec2::new(p.x * 0.5 + 0.5, 0.5 - p.y * 0.5)
}

/// Every additive contribution of one fragment, before compositing.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScopeLayers {
    pub r: f32,
    pub angle: f32,
    /// Wrapped `angle - sweep`; positive is ahead of the sweep
    pub sweep_delta: f32,
    pub rings: f32,
    pub grid: f32,
    pub crosshair: f32,
    pub beam: f32,
    pub trail: f32,
    pub clutter: f32,
    pub edge: f32,
    pub center: f32,
    pub scanline: f32,
}

impl ScopeLayers {
    pub fn evaluate(uv: Vec2, time: f32, sweep_angle: f32) -> Self {
        let p = Vec2::new(uv.x - 0.5, 0.5 - uv.y) * 2.0;
        let r = p.length();
        let angle = p.y.atan2(p.x);

        let mut rings = 0.0;
        for i in 1..=RING_COUNT {
            let d = (r - i as f32 * RING_SPACING) * RING_SHARPNESS;
            rings += (-d * d).exp() * RING_GAIN;
        }

        let q = p * GRID_CELLS + 0.5;
        let g = q - q.floor() - 0.5;
        let gx = g.x * GRID_SHARPNESS;
        let gy = g.y * GRID_SHARPNESS;
        let grid = ((-gx * gx).exp() + (-gy * gy).exp()) * GRID_GAIN * (1.0 - r);

        let cx = p.x * CROSS_SHARPNESS;
        let cy = p.y * CROSS_SHARPNESS;
        let crosshair =
            ((-cx * cx).exp() + (-cy * cy).exp()) * CROSS_GAIN * smoothstep(0.08, 0.15, r);

        let delta = wrap_angle(angle - sweep_angle);
        let beam = (1.0 - smoothstep(0.0, BEAM_WIDTH, delta))
            * step(0.0, delta)
            * (1.0 - 0.4 * r)
            * BEAM_GAIN;
        let trail = smoothstep(-TRAIL_WIDTH, 0.0, delta)
            * (1.0 - step(0.0, delta))
            * (1.0 - 0.6 * r)
            * TRAIL_GAIN;

        let cell = (uv * 180.0).floor() + Vec2::splat((time * 12.0).floor());
        let clutter = hash(cell) * CLUTTER_GAIN * r * (0.6 + 0.4 * (time * 1.7).sin());

        let edge = smoothstep(0.88, 1.0, r) * EDGE_GAIN;
        let center = (-r * r * 900.0).exp() * CENTER_GAIN;
        let scanline = 0.9 + 0.1 * (uv.y * SCANLINE_FREQ).sin();

        Self {
            r,
            angle,
            sweep_delta: delta,
            rings,
            grid,
            crosshair,
            beam,
            trail,
            clutter,
            edge,
            center,
            scanline,
        }
    }

    /// Sum of the additive layers, in shader order.
    pub fn intensity(&self) -> f32 {
        self.rings
            + self.grid
            + self.crosshair
            + self.beam
            + self.trail
            + self.clutter
            + self.edge
            + self.center
    }

    pub fn vignette(&self) -> f32 {
        1.0 - smoothstep(0.7, 1.0, self.r)
    }

    pub fn alpha(&self) -> f32 {
        1.0 - smoothstep(0.95, 1.0, self.r)
    }

    pub fn composite(&self, tint: Vec3) -> Vec4 {
        let color = (BASE + tint * self.intensity()) * self.scanline * self.vignette();
        color.extend(self.alpha())
    }
}

/// Color and alpha of the scope at `uv`.
pub fn shade(uv: Vec2, time: f32, sweep_angle: f32, tint: Vec3) -> Vec4 {
    ScopeLayers::evaluate(uv, time, sweep_angle).composite(tint)
}

/// Sweep angle normalised into `[0, 2π)` as the shader expects it.
pub fn normalize_sweep(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: Vec3 = Vec3::new(0.29, 0.87, 0.5);

    fn at(r: f32, angle: f32, sweep: f32) -> ScopeLayers {
        ScopeLayers::evaluate(uv_from_polar(r, angle), 3.0, sweep)
    }

    #[test]
    fn polar_mapping_round_trips() {
        let l = at(0.6, 1.1, 0.0);
        assert!((l.r - 0.6).abs() < 1e-5);
        assert!((l.angle - 1.1).abs() < 1e-5);
    }

    #[test]
    fn disc_is_cut_off_at_unit_radius() {
        assert_eq!(at(0.5, 0.3, 0.0).alpha(), 1.0);
        assert_eq!(at(0.94, 0.3, 0.0).alpha(), 1.0);
        assert_eq!(at(1.01, 0.3, 0.0).alpha(), 0.0);
        let mid = at(0.975, 0.3, 0.0).alpha();
        assert!(mid > 0.0 && mid < 1.0);
        assert_eq!(shade(Vec2::new(0.0, 0.0), 1.0, 0.0, GREEN).w, 0.0);
    }

    #[test]
    fn range_rings_peak_on_fifths() {
        for i in 1..=4 {
            let on = at(i as f32 * RING_SPACING, 0.7, 4.0).rings;
            assert!(on > 0.3, "ring {i} too faint: {on}");
        }
        let between = at(0.5, 0.7, 4.0).rings;
        assert!(between < 1e-3);
    }

    #[test]
    fn crosshair_is_hidden_at_the_center() {
        // Points on the vertical axis sit in the crosshair band.
        let near = at(0.05, std::f32::consts::FRAC_PI_2, 4.0).crosshair;
        let far = at(0.5, std::f32::consts::FRAC_PI_2, 4.0).crosshair;
        assert_eq!(near, 0.0);
        assert!(far > 0.2);
    }

    #[test]
    fn grid_fades_toward_the_rim() {
        let uv_inner = Vec2::new(0.2 * 0.5 + 0.5, 0.5 - 0.1 * 0.5);
        let uv_outer = Vec2::new(0.8 * 0.5 + 0.5, 0.5 - 0.1 * 0.5);
        let inner = ScopeLayers::evaluate(uv_inner, 0.0, 4.0).grid;
        let outer = ScopeLayers::evaluate(uv_outer, 0.0, 4.0).grid;
        assert!(inner > outer);
        assert!(outer > 0.0);
    }

    #[test]
    fn beam_leads_and_trail_follows() {
        let sweep = 2.0;
        let ahead = at(0.5, sweep + 0.02, sweep);
        let behind = at(0.5, sweep - 0.02, sweep);
        assert!(ahead.beam > 0.3);
        assert_eq!(ahead.trail, 0.0);
        assert_eq!(behind.beam, 0.0);
        assert!(behind.trail > 0.2);

        let far_ahead = at(0.5, sweep + 0.5, sweep);
        let far_behind = at(0.5, sweep - 0.5, sweep);
        assert_eq!(far_ahead.beam + far_ahead.trail, 0.0);
        assert!(far_behind.trail > 0.0);
    }

    #[test]
    fn sweep_difference_wraps_across_zero() {
        let sweep = TAU - 0.01;
        let l = at(0.5, 0.01, sweep);
        assert!((l.sweep_delta - 0.02).abs() < 1e-4);
        assert!(l.beam > 0.3);
    }

    #[test]
    fn beam_dims_with_radius() {
        let sweep = 1.0;
        assert!(at(0.2, sweep + 0.01, sweep).beam > at(0.9, sweep + 0.01, sweep).beam);
    }

    #[test]
    fn clutter_stays_low() {
        for k in 0..50 {
            let l = ScopeLayers::evaluate(uv_from_polar(0.9, k as f32 * 0.1), k as f32 * 0.37, 0.0);
            assert!(l.clutter >= 0.0 && l.clutter <= CLUTTER_GAIN * 0.9 + 1e-6);
        }
    }

    #[test]
    fn scope_reads_green() {
        let c = shade(uv_from_polar(0.4, 2.0), 1.0, 2.0, GREEN);
        assert!(c.y > c.x && c.y > c.z);
        assert_eq!(c.w, 1.0);
    }

    #[test]
    fn wrap_angle_range() {
        for k in -40..40 {
            let w = wrap_angle(k as f32 * 0.5);
            assert!(w > -std::f32::consts::PI - 1e-6 && w <= std::f32::consts::PI + 1e-6);
        }
    }

    #[test]
    fn gpu_program_uses_the_same_constants() {
        let wgsl = include_str!("render/shaders/radar_scope.wgsl");
        for needle in [
            "RING_SPACING: f32 = 0.2",
            "BEAM_WIDTH: f32 = 0.06",
            "TRAIL_WIDTH: f32 = 1.2",
            "* 120.0",
            "* 40.0",
            "* 150.0",
            "smoothstep(0.08, 0.15, r)",
            "floor(uv * 180.0)",
            "sin(uv.y * 300.0)",
            "1.0 - smoothstep(0.7, 1.0, r)",
            "1.0 - smoothstep(0.95, 1.0, r)",
        ] {
            assert!(wgsl.contains(needle), "shader drifted from CPU reference: {needle}");
        }
    }
}
