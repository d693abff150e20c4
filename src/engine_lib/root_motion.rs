// src/engine_lib/root_motion.rs
use glam::Vec3;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::engine_lib::scene_types::{NodeHandle, SceneHost};
use crate::error::{Result, ScatterError};

/// Drift of a placed object's root across the placement area, in its own plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootMotionConfig {
    /// Units per second before variation.
    pub speed: f32,
    /// Multiplier redrawn every time a new target is picked.
    pub speed_variation: Distribution,
    /// Spread of target x around the area's center.
    pub horizontal_std_dev: f32,
    /// Spread of target y around the area's center.
    pub vertical_std_dev: f32,
    /// Pause taken on arrival, in seconds.
    pub pause: Distribution,
    /// Closer than this counts as arrived.
    pub arrival_distance: f32,
}

impl Default for RootMotionConfig {
    fn default() -> Self {
        Self {
            speed: 1.8,
            speed_variation: Distribution::truncated_normal(1.0, 1.0, 0.1, 1.5),
            horizontal_std_dev: 1.0,
            vertical_std_dev: 2.0,
            pause: Distribution::uniform(0.1, 2.0),
            arrival_distance: 1.0,
        }
    }
}

impl RootMotionConfig {
    pub fn validate(&self) -> Result<()> {
        let scalars = [self.speed, self.horizontal_std_dev, self.vertical_std_dev, self.arrival_distance];
        if scalars.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ScatterError::InvalidPlacement(
                "root motion speed, spreads and arrival distance must be finite and non-negative".to_string(),
            ));
        }
        if !self.speed_variation.is_finite() || !self.pause.is_finite() {
            return Err(ScatterError::InvalidPlacement(
                "root motion distributions must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RootMotionOutcome {
    Paused,
    /// Arrived; a new target was drawn and a pause armed.
    Retargeted,
    Moved(Vec3),
    Skipped,
}

/// Walks one object root toward randomly drawn targets, pausing at each.
pub struct RootMotionController {
    node: NodeHandle,
    config: RootMotionConfig,
    horizontal: Distribution,
    vertical: Distribution,
    speed: f32,
    target: Vec3,
    cooldown: f32,
    rng: ChaCha8Rng,
}

impl RootMotionController {
    /// `half_extents` bound the targets; `start` is where the root was placed.
    pub fn new(
        node: NodeHandle,
        config: RootMotionConfig,
        half_extents: (f32, f32),
        start: Vec3,
        mut rng: ChaCha8Rng,
    ) -> Self {
        let (half_w, half_h) = half_extents;
        let horizontal = Distribution::truncated_normal(0.0, config.horizontal_std_dev, -half_w, half_w);
        let vertical = Distribution::truncated_normal(0.0, config.vertical_std_dev, -half_h, half_h);
        let speed = config.speed * config.speed_variation.sample(&mut rng);
        let target = Vec3::new(horizontal.sample(&mut rng), vertical.sample(&mut rng), start.z);
        Self { node, config, horizontal, vertical, speed, target, cooldown: 0.0, rng }
    }

    pub fn node(&self) -> NodeHandle {
        self.node
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn tick<H: SceneHost + ?Sized>(&mut self, host: &mut H, dt: f32) -> RootMotionOutcome {
        if !dt.is_finite() || dt < 0.0 {
            return RootMotionOutcome::Skipped;
        }
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return RootMotionOutcome::Paused;
        }

        let position = host.local_position(self.node);
        let offset = self.target - position;
        if offset.length() < self.config.arrival_distance {
            self.cooldown = self.config.pause.sample(&mut self.rng);
            self.target = Vec3::new(
                self.horizontal.sample(&mut self.rng),
                self.vertical.sample(&mut self.rng),
                position.z,
            );
            self.speed = self.config.speed * self.config.speed_variation.sample(&mut self.rng);
            return RootMotionOutcome::Retargeted;
        }

        let mut step = offset.normalize_or_zero() * self.speed * dt;
        step.z = 0.0;
        host.set_local_position(self.node, position + step);
        RootMotionOutcome::Moved(step)
    }
}
