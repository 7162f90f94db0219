//! Parametric layout of the radar assembly.
//!
//! The radar plane `(x, y)` sits on the world ground as `(x, h, -y)`. With that
//! mapping a rotation about world +Y by `θ` carries the +X axis onto radar
//! angle `θ`, which is what the sweep arm and the shader both assume.

use std::f32::consts::TAU;

use bevy_math::{EulerRot, Quat, Vec2, Vec3};
use rand::Rng;

use crate::core::{CameraConfig, SceneConfig};
use crate::sim::RotationState;

/// Height of blip markers above the ground disc
pub const BLIP_HEIGHT: f32 = 0.03;
/// Height of range rings and trails, just above the shaded disc
pub const OVERLAY_HEIGHT: f32 = 0.01;

pub fn plane_to_world(p: Vec2, height: f32) -> Vec3 {
    Vec3::new(p.x, height, -p.y)
}

pub fn world_to_plane(p: Vec3) -> Vec2 {
    Vec2::new(p.x, -p.z)
}

/// Radii of the range rings, evenly spaced out to the ground radius.
pub fn range_ring_radii(scene: &SceneConfig) -> Vec<f32> {
    let n = scene.range_rings.max(1) as f32;
    (1..=scene.range_rings)
        .map(|i| scene.ground_radius * i as f32 / n)
        .collect()
}

/// Closed polyline around the origin; the last point repeats the first.
pub fn ring_polyline(radius: f32, segments: usize, height: f32) -> Vec<Vec3> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            let a = i as f32 / segments as f32 * TAU;
            plane_to_world(Vec2::from_angle(a) * radius, height)
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AzimuthTick {
    /// Radar angle of the tick, radians
    pub angle: f32,
    /// Base of the tick on the bezel
    pub base: Vec3,
    pub height: f32,
    pub cardinal: bool,
}

pub fn azimuth_ticks(scene: &SceneConfig) -> Vec<AzimuthTick> {
    let radius = scene.ground_radius + scene.bezel_width * 0.5;
    let count = scene.tick_count.max(1);
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * TAU;
            let cardinal = i % scene.cardinal_every.max(1) == 0;
            AzimuthTick {
                angle,
                base: plane_to_world(Vec2::from_angle(angle) * radius, 0.0),
                height: if cardinal {
                    scene.cardinal_tick_height
                } else {
                    scene.tick_height
                },
                cardinal,
            }
        })
        .collect()
}

/// Scatter particles through an annulus around the scope.
///
/// Radius is area-uniform between `inner` and `outer`; height is uniform in
/// `[0, max_height]`.
pub fn sample_particles<R: Rng>(rng: &mut R, scene: &SceneConfig) -> Vec<Vec3> {
    let inner2 = scene.particle_inner_radius * scene.particle_inner_radius;
    let outer2 = scene.particle_outer_radius * scene.particle_outer_radius;
    (0..scene.particle_count)
        .map(|_| {
            let angle = rng.random_range(0.0..TAU);
            let r = if outer2 > inner2 {
                rng.random_range(inner2..outer2).sqrt()
            } else {
                scene.particle_inner_radius
            };
            let h = if scene.particle_max_height > 0.0 {
                rng.random_range(0.0..=scene.particle_max_height)
            } else {
                0.0
            };
            plane_to_world(Vec2::from_angle(angle) * r, h)
        })
        .collect()
}

/// Animated placement of one holographic torus ring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoloRingPose {
    pub radius: f32,
    pub height: f32,
    pub rotation: Quat,
    pub opacity: f32,
}

pub fn holo_ring_radius(index: usize, count: usize, ground_radius: f32) -> f32 {
    ground_radius * (0.45 + 0.35 * index as f32 / count.max(1) as f32)
}

pub fn holo_ring_pose(index: usize, count: usize, ground_radius: f32, time: f32) -> HoloRingPose {
    let i = index as f32;
    let direction = if index % 2 == 0 { 1.0 } else { -1.0 };
    let spin = direction * time * (0.3 + 0.15 * i);
    let tilt = 0.08 * (time * 0.6 + i * 2.1).sin();
    HoloRingPose {
        radius: holo_ring_radius(index, count, ground_radius),
        height: 1.0 + 0.35 * i + 0.08 * (time * 0.8 + i).sin(),
        rotation: Quat::from_euler(EulerRot::YXZ, spin, tilt, 0.0),
        opacity: 0.18 + 0.1 * (time * 1.5 + i * 1.3).sin(),
    }
}

/// Slow yaw of the particle cloud.
pub fn particle_spin(time: f32) -> Quat {
    Quat::from_rotation_y(time * 0.05)
}

pub fn sweep_arm_rotation(sweep_angle: f32) -> Quat {
    Quat::from_rotation_y(sweep_angle)
}

/// Whole-assembly rotation: yaw from `x`, tilt from `y`.
pub fn scene_rotation(rotation: &RotationState) -> Quat {
    Quat::from_euler(EulerRot::YXZ, rotation.x, rotation.y, 0.0)
}

/// Idle camera dolly around the configured base position.
pub fn camera_sway(base: Vec3, time: f32, amplitude: f32) -> Vec3 {
    base + Vec3::new(
        (time * 0.3).sin() * amplitude,
        (time * 0.5).sin() * amplitude * 0.3,
        (time * 0.2).cos() * amplitude * 0.4,
    )
}

/// Perspective parameters for a viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionParams {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl ProjectionParams {
    /// `None` for a degenerate viewport.
    pub fn for_size(camera: &CameraConfig, width: f32, height: f32) -> Option<Self> {
        if !(width > 0.0 && height > 0.0) {
            return None;
        }
        Some(Self {
            fov: camera.fov_degrees.to_radians(),
            aspect: width / height,
            near: camera.near,
            far: camera.far,
        })
    }
}

/// World-space trail polyline, oldest point first.
pub fn trail_polyline<'a>(trail: impl IntoIterator<Item = &'a Vec2>) -> Vec<Vec3> {
    trail
        .into_iter()
        .map(|p| plane_to_world(*p, OVERLAY_HEIGHT))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn sweep_arm_points_at_radar_angle() {
        for k in 0..12 {
            let a = k as f32 * 0.5;
            let tip = sweep_arm_rotation(a) * Vec3::X;
            let expected = plane_to_world(Vec2::from_angle(a), 0.0);
            assert!((tip - expected).length() < 1e-5, "angle {a}");
        }
    }

    #[test]
    fn range_rings_match_shader_bands() {
        let scene = SceneConfig::default();
        let radii = range_ring_radii(&scene);
        assert_eq!(radii.len(), 5);
        for (i, r) in radii.iter().enumerate() {
            let normalized = r / scene.ground_radius;
            assert!((normalized - (i + 1) as f32 * crate::scope::RING_SPACING).abs() < 1e-6);
        }
    }

    #[test]
    fn ring_polyline_is_closed() {
        let pts = ring_polyline(2.0, 64, 0.0);
        assert_eq!(pts.len(), 65);
        assert!((pts[0] - pts[64]).length() < 1e-5);
        assert!(pts.iter().all(|p| (p.length() - 2.0).abs() < 1e-5));
    }

    #[test]
    fn every_ninth_tick_is_cardinal() {
        let scene = SceneConfig::default();
        let ticks = azimuth_ticks(&scene);
        assert_eq!(ticks.len(), 36);
        let cardinals: Vec<usize> = ticks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.cardinal)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(cardinals, vec![0, 9, 18, 27]);
        assert!(ticks[0].height > ticks[1].height);
    }

    #[test]
    fn particles_stay_in_envelope() {
        let scene = SceneConfig::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let pts = sample_particles(&mut rng, &scene);
        assert_eq!(pts.len(), 300);
        for p in pts {
            let r = world_to_plane(p).length();
            assert!(r >= scene.particle_inner_radius - 1e-4);
            assert!(r <= scene.particle_outer_radius + 1e-4);
            assert!((0.0..=scene.particle_max_height).contains(&p.y));
        }
    }

    #[test]
    fn holo_rings_stay_visible() {
        for i in 0..3 {
            for k in 0..100 {
                let pose = holo_ring_pose(i, 3, 4.0, k as f32 * 0.1);
                assert!(pose.opacity > 0.0 && pose.opacity < 0.3);
                assert!(pose.height > 0.5);
            }
        }
    }

    #[test]
    fn zero_sized_viewport_has_no_projection() {
        let cam = CameraConfig::default();
        assert!(ProjectionParams::for_size(&cam, 0.0, 600.0).is_none());
        assert!(ProjectionParams::for_size(&cam, 800.0, 0.0).is_none());
        let p = ProjectionParams::for_size(&cam, 800.0, 400.0).expect("valid");
        assert_eq!(p.aspect, 2.0);
    }
}
