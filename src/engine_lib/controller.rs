// src/engine_lib/controller.rs

use std::sync::Arc;

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::engine_lib::catalog::JointConstraintSpec;
use crate::engine_lib::scene_types::{NodeHandle, SceneHost};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerPhase {
    /// Paused by a cooldown.
    Idle,
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    Idle,
    /// Outside the `(delay, max_duration)` window.
    Dormant,
    Rotated(f32),
    /// The step would have left the bounds; direction reversed, nothing applied.
    Reflected,
    /// Bad Δt or zero axis.
    Skipped,
}

/// Bounded back-and-forth rotation of one joint, advanced once per frame.
pub struct JointRotationController {
    spec: Arc<JointConstraintSpec>,
    node: NodeHandle,
    axis: Vec3,
    min_angle: f32,
    max_angle: f32,
    base_speed: f32,
    velocity: f32,
    current_angle: f32,
    duration: f32,
    cooldown: f32,
    rng: ChaCha8Rng,
}

impl JointRotationController {
    /// `initial_angle` is the offset already applied to the node; `bounds` are
    /// the effective limits, which for tips are narrower than the catalog entry's.
    pub fn new(
        spec: Arc<JointConstraintSpec>,
        node: NodeHandle,
        initial_angle: f32,
        bounds: (f32, f32),
        forward: bool,
        mut rng: ChaCha8Rng,
    ) -> Self {
        let base_speed = spec.speed.sample(&mut rng);
        let direction = if forward { 1.0 } else { -1.0 };
        let velocity = direction * base_speed * spec.speed_variation.sample(&mut rng);
        Self {
            axis: spec.axis,
            spec,
            node,
            min_angle: bounds.0,
            max_angle: bounds.1,
            base_speed,
            velocity,
            current_angle: initial_angle,
            duration: 0.0,
            cooldown: 0.0,
            rng,
        }
    }

    pub fn node(&self) -> NodeHandle {
        self.node
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn current_angle(&self) -> f32 {
        self.current_angle
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.min_angle, self.max_angle)
    }

    pub fn phase(&self) -> ControllerPhase {
        if self.cooldown > 0.0 {
            ControllerPhase::Idle
        } else {
            ControllerPhase::Active
        }
    }

    pub fn tick<H: SceneHost + ?Sized>(&mut self, host: &mut H, dt: f32) -> TickOutcome {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("joint '{}': ignoring invalid frame delta {dt}", self.spec.name);
            return TickOutcome::Skipped;
        }
        if self.axis == Vec3::ZERO {
            return TickOutcome::Skipped;
        }

        self.duration += dt;
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return TickOutcome::Idle;
        }

        if self.rng.gen::<f32>() < self.spec.cooldown_probability {
            self.cooldown = self.spec.cooldown_duration.sample(&mut self.rng);
            if self.rng.gen::<f32>() < self.spec.flip_probability {
                self.reverse();
            }
        }

        if self.duration <= self.spec.delay || self.duration >= self.spec.max_duration {
            return TickOutcome::Dormant;
        }

        let angle = self.velocity * dt;
        let next_angle = self.current_angle + angle;
        if next_angle > self.max_angle || next_angle < self.min_angle {
            self.reverse();
            self.cooldown = self.spec.cooldown_duration.sample(&mut self.rng);
            log::trace!(
                "joint '{}' bounced at {:.2} (limits {:.2}..{:.2})",
                self.spec.name,
                self.current_angle,
                self.min_angle,
                self.max_angle
            );
            return TickOutcome::Reflected;
        }

        host.rotate(self.node, self.axis, angle);
        self.current_angle = next_angle;
        TickOutcome::Rotated(angle)
    }

    fn reverse(&mut self) {
        // signum(0.0) is 1.0, so a stalled joint still picks a direction.
        self.velocity = -self.velocity.signum() * self.base_speed * self.spec.speed_variation.sample(&mut self.rng);
    }
}
