//! Blip population: spawn cadence, motion, trails and fade-out.
//!
//! Blips live in a flat arena keyed by [`BlipId`]. Nothing outside this module
//! holds references into it; the renderer diffs ids each frame instead.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use bevy_math::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::core::SimConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlipId(pub u64);

/// Angular rate of the marker pulse (rad/s)
const PULSE_RATE: f32 = 4.0;
/// Angular rate of the expanding ring (rad/s)
const RING_RATE: f32 = 2.5;
/// How far the ring indicator grows beyond the marker, as a scale factor
const RING_GROWTH: f32 = 0.8;

/// Derived per-frame visual state of a blip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlipVisual {
    /// Fade multiplier in `[0, 1]`; below 1 only once the blip is expiring
    pub fade: f32,
    pub marker_opacity: f32,
    pub ring_scale: f32,
    pub ring_opacity: f32,
}

impl Default for BlipVisual {
    fn default() -> Self {
        Self {
            fade: 1.0,
            marker_opacity: 1.0,
            ring_scale: 1.0,
            ring_opacity: 0.0,
        }
    }
}

/// Initial parameters for a blip.
#[derive(Clone, Copy, Debug)]
pub struct BlipSpawn {
    pub position: Vec2,
    pub velocity: Vec2,
    pub phase: f32,
    pub max_lifetime: f32,
}

#[derive(Clone, Debug)]
pub struct Blip {
    pub id: BlipId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub phase: f32,
    pub age: f32,
    pub max_lifetime: f32,
    /// Oldest first; bounded by `SimConfig::trail_len`
    pub trail: VecDeque<Vec2>,
    pub visual: BlipVisual,
    fade_started_at: Option<f32>,
}

impl Blip {
    fn new(id: BlipId, spawn: BlipSpawn, trail_len: usize) -> Self {
        let mut trail = VecDeque::with_capacity(trail_len);
        trail.push_back(spawn.position);
        Self {
            id,
            position: spawn.position,
            velocity: spawn.velocity,
            phase: spawn.phase,
            age: 0.0,
            max_lifetime: spawn.max_lifetime,
            trail,
            visual: BlipVisual::default(),
            fade_started_at: None,
        }
    }

    pub fn is_fading(&self) -> bool {
        self.fade_started_at.is_some()
    }

    /// Age at which the fade began, if it has.
    pub fn fade_started_at(&self) -> Option<f32> {
        self.fade_started_at
    }

    fn step(&mut self, dt: f32, time: f32, config: &SimConfig) {
        self.position += self.velocity * dt;
        self.age += dt;

        self.trail.push_back(self.position);
        while self.trail.len() > config.trail_len {
            self.trail.pop_front();
        }

        // Same fade law for both triggers: it starts the first frame either holds.
        let expired =
            self.age > self.max_lifetime || self.position.length() > config.scene_radius;
        if expired && self.fade_started_at.is_none() {
            self.fade_started_at = Some(self.age);
        }

        let fade = match self.fade_started_at {
            Some(start) => (1.0 - (self.age - start) / config.fade_window).max(0.0),
            None => 1.0,
        };

        let pulse = 0.65 + 0.35 * (time * PULSE_RATE + self.phase).sin();
        let grow = 0.5 + 0.5 * (time * RING_RATE + self.phase).cos();
        self.visual = BlipVisual {
            fade,
            marker_opacity: pulse * fade,
            ring_scale: 1.0 + RING_GROWTH * grow,
            ring_opacity: 0.6 * (1.0 - grow) * fade,
        };
    }
}

/// Ids that entered or left the population during one `advance`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PopulationChange {
    pub spawned: Vec<BlipId>,
    pub retired: Vec<BlipId>,
}

impl PopulationChange {
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.retired.is_empty()
    }
}

/// Arena of live blips plus the spawn bookkeeping.
pub struct BlipField {
    config: SimConfig,
    blips: Vec<Blip>,
    rng: SmallRng,
    next_id: u64,
    last_spawn: f64,
}

impl BlipField {
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let capacity = config.max_blips;
        Self {
            config,
            blips: Vec::with_capacity(capacity),
            rng: SmallRng::seed_from_u64(seed),
            next_id: 0,
            last_spawn: 0.0,
        }
    }

    /// Spawn the initial population and restart the spawn cadence at `time`.
    pub fn seed_initial(&mut self, time: f64) -> Vec<BlipId> {
        let spawned = (0..self.config.initial_blips)
            .filter_map(|_| self.spawn_random())
            .collect();
        self.last_spawn = time;
        spawned
    }

    /// Advance every blip by `dt`, retire faded ones, then top up if due.
    pub fn advance(&mut self, dt: f32, time: f64) -> PopulationChange {
        let mut change = PopulationChange::default();
        let t = time as f32;

        for blip in &mut self.blips {
            blip.step(dt, t, &self.config);
        }

        self.blips.retain(|blip| {
            let gone = blip.visual.fade <= 0.0;
            if gone {
                change.retired.push(blip.id);
            }
            !gone
        });

        if time - self.last_spawn > f64::from(self.config.spawn_interval)
            && self.blips.len() < self.config.max_blips
        {
            if let Some(id) = self.spawn_random() {
                change.spawned.push(id);
                self.last_spawn = time;
            }
        }

        change
    }

    /// Insert a blip with explicit parameters. Returns `None` at the cap.
    pub fn insert(&mut self, spawn: BlipSpawn) -> Option<BlipId> {
        if self.blips.len() >= self.config.max_blips {
            return None;
        }
        let id = BlipId(self.next_id);
        self.next_id += 1;
        self.blips.push(Blip::new(id, spawn, self.config.trail_len));
        Some(id)
    }

    fn spawn_random(&mut self) -> Option<BlipId> {
        let spawn = self.random_spawn();
        self.insert(spawn)
    }

    fn random_spawn(&mut self) -> BlipSpawn {
        let c = &self.config;
        let angle = self.rng.random_range(0.0..TAU);
        let distance = self
            .rng
            .random_range(c.spawn_distance_min..=c.spawn_distance_max);
        let heading = self.rng.random_range(0.0..TAU);
        let speed = self.rng.random_range(c.speed_min..=c.speed_max);

        BlipSpawn {
            position: Vec2::from_angle(angle) * distance,
            velocity: Vec2::from_angle(heading) * speed,
            phase: self.rng.random_range(0.0..TAU),
            max_lifetime: self.rng.random_range(c.lifetime_min..=c.lifetime_max),
        }
    }

    pub fn live_count(&self) -> usize {
        self.blips.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Blip> {
        self.blips.iter()
    }

    pub fn get(&self, id: BlipId) -> Option<&Blip> {
        self.blips.iter().find(|b| b.id == id)
    }

    pub fn contains(&self, id: BlipId) -> bool {
        self.blips.iter().any(|b| b.id == id)
    }

    pub fn last_spawn(&self) -> f64 {
        self.last_spawn
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clear(&mut self) {
        self.blips.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> SimConfig {
        SimConfig {
            initial_blips: 0,
            spawn_interval: 1.0e6,
            ..SimConfig::default()
        }
    }

    #[test]
    fn random_spawns_stay_in_declared_ranges() {
        let config = SimConfig::default();
        let mut field = BlipField::new(config.clone(), 0xBEEF);
        for _ in 0..config.max_blips {
            field.spawn_random();
        }
        for blip in field.iter() {
            let d = blip.position.length();
            assert!(d >= config.spawn_distance_min - 1e-4 && d <= config.spawn_distance_max + 1e-4);
            let speed = blip.velocity.length();
            assert!(speed >= config.speed_min - 1e-4 && speed <= config.speed_max + 1e-4);
            assert!((config.lifetime_min..=config.lifetime_max).contains(&blip.max_lifetime));
        }
    }

    #[test]
    fn insert_respects_cap() {
        let config = SimConfig {
            max_blips: 2,
            ..quiet_config()
        };
        let mut field = BlipField::new(config, 1);
        let spawn = BlipSpawn {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            phase: 0.0,
            max_lifetime: 5.0,
        };
        assert!(field.insert(spawn).is_some());
        assert!(field.insert(spawn).is_some());
        assert!(field.insert(spawn).is_none());
        assert_eq!(field.live_count(), 2);
    }

    #[test]
    fn trail_is_bounded_and_ordered() {
        let mut field = BlipField::new(quiet_config(), 2);
        let id = field
            .insert(BlipSpawn {
                position: Vec2::ZERO,
                velocity: Vec2::new(0.1, 0.0),
                phase: 0.0,
                max_lifetime: 100.0,
            })
            .expect("room for one");

        for frame in 1..=50 {
            field.advance(0.016, frame as f64 * 0.016);
        }

        let blip = field.get(id).expect("still alive");
        assert_eq!(blip.trail.len(), 20);
        let xs: Vec<f32> = blip.trail.iter().map(|p| p.x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(blip.trail.back().copied(), Some(blip.position));
    }

    #[test]
    fn ring_and_marker_stay_in_range() {
        let mut field = BlipField::new(SimConfig::default(), 3);
        field.seed_initial(0.0);
        for frame in 1..=300 {
            field.advance(0.016, frame as f64 * 0.016);
            for blip in field.iter() {
                let v = blip.visual;
                assert!((0.0..=1.0).contains(&v.marker_opacity));
                assert!((0.0..=1.0).contains(&v.ring_opacity));
                assert!((1.0..=1.0 + RING_GROWTH + 1e-5).contains(&v.ring_scale));
            }
        }
    }
}
