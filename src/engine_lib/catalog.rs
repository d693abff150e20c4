// src/engine_lib/catalog.rs
use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::error::{Result, ScatterError};

fn default_max_duration() -> f32 {
    1000.0
}

/// Rotation limits and animation parameters for one named joint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointConstraintSpec {
    pub name: String,
    pub axis: Vec3,
    /// Degrees.
    pub min_angle: f32,
    /// Degrees.
    pub max_angle: f32,
    /// Base speed in degrees per second, drawn once per iteration.
    pub speed: Distribution,
    /// Multiplier drawn each time the velocity is (re)set.
    pub speed_variation: Distribution,
    /// Chance per tick to pause.
    pub cooldown_probability: f32,
    /// Chance to reverse direction when a pause starts.
    pub flip_probability: f32,
    /// Pause length in seconds; also used after bouncing off a limit.
    pub cooldown_duration: Distribution,
    #[serde(default)]
    pub is_tip1: bool,
    #[serde(default)]
    pub is_tip2: bool,
    #[serde(default)]
    pub delay: f32,
    #[serde(default = "default_max_duration")]
    pub max_duration: f32,
}

impl JointConstraintSpec {
    pub fn new(name: impl Into<String>, axis: Vec3, min_angle: f32, max_angle: f32) -> Self {
        Self {
            name: name.into(),
            axis,
            min_angle,
            max_angle,
            speed: Distribution::constant(25.0),
            speed_variation: Distribution::truncated_normal(1.0, 0.5, 0.1, 1.5),
            cooldown_probability: 0.005,
            flip_probability: 0.5,
            cooldown_duration: Distribution::uniform(0.0, 2.0),
            is_tip1: false,
            is_tip2: false,
            delay: 0.0,
            max_duration: default_max_duration(),
        }
    }

    pub fn with_speed(mut self, speed: Distribution, variation: Distribution) -> Self {
        self.speed = speed;
        self.speed_variation = variation;
        self
    }

    pub fn with_cooldown(mut self, probability: f32, flip_probability: f32, duration: Distribution) -> Self {
        self.cooldown_probability = probability;
        self.flip_probability = flip_probability;
        self.cooldown_duration = duration;
        self
    }

    pub fn tip1(mut self) -> Self {
        self.is_tip1 = true;
        self
    }

    pub fn tip2(mut self) -> Self {
        self.is_tip2 = true;
        self
    }

    fn validate(&mut self) -> Result<()> {
        let fail = |reason: String| ScatterError::InvalidConstraint { name: self.name.clone(), reason };

        if !self.min_angle.is_finite() || !self.max_angle.is_finite() {
            return Err(fail("rotation bounds must be finite".to_string()));
        }
        if self.min_angle > self.max_angle {
            return Err(fail(format!("min {} exceeds max {}", self.min_angle, self.max_angle)));
        }
        for (label, p) in [("cooldown", self.cooldown_probability), ("flip", self.flip_probability)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(fail(format!("{label} probability {p} is outside [0, 1]")));
            }
        }
        if self.is_tip1 && self.is_tip2 {
            return Err(fail("a joint cannot be both tip1 and tip2".to_string()));
        }
        if !self.axis.is_finite() {
            return Err(fail("axis must be finite".to_string()));
        }
        if ![self.speed, self.speed_variation, self.cooldown_duration].iter().all(Distribution::is_finite) {
            return Err(fail("distribution parameters must be finite".to_string()));
        }
        if !self.delay.is_finite() || !self.max_duration.is_finite() {
            return Err(fail("active window must be finite".to_string()));
        }
        // A zero axis stays zero; the controller treats it as a no-op.
        self.axis = self.axis.normalize_or_zero();
        Ok(())
    }
}

/// Read-only lookup from node name to its constraint, built once per run.
#[derive(Clone, Debug, Default)]
pub struct ConstraintCatalog {
    by_name: HashMap<String, Arc<JointConstraintSpec>>,
    tip1: Option<String>,
    tip2: Option<String>,
}

impl ConstraintCatalog {
    pub fn new(specs: Vec<JointConstraintSpec>) -> Result<Self> {
        let mut catalog = Self::default();

        for mut spec in specs {
            spec.validate()?;
            if catalog.by_name.contains_key(&spec.name) {
                return Err(ScatterError::InvalidConstraint {
                    name: spec.name,
                    reason: "duplicate joint name".to_string(),
                });
            }
            if spec.is_tip1 {
                Self::claim_role(&mut catalog.tip1, "tip1", &spec.name)?;
            }
            if spec.is_tip2 {
                Self::claim_role(&mut catalog.tip2, "tip2", &spec.name)?;
            }
            catalog.by_name.insert(spec.name.clone(), Arc::new(spec));
        }

        match (&catalog.tip1, &catalog.tip2) {
            (Some(tip1), None) => Err(ScatterError::MissingConstraint(format!(
                "tip1 joint '{tip1}' has no tip2 partner"
            ))),
            (None, Some(tip2)) => Err(ScatterError::MissingConstraint(format!(
                "tip2 joint '{tip2}' has no tip1 partner"
            ))),
            _ => Ok(catalog),
        }
    }

    fn claim_role(slot: &mut Option<String>, role: &str, name: &str) -> Result<()> {
        if let Some(existing) = slot {
            return Err(ScatterError::MissingConstraint(format!(
                "both '{existing}' and '{name}' claim the {role} role; expected exactly one pair"
            )));
        }
        *slot = Some(name.to_string());
        Ok(())
    }

    /// Exact name match; `None` just means the node is not animated.
    pub fn get(&self, name: &str) -> Option<&Arc<JointConstraintSpec>> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn tip_pair(&self) -> Option<(&str, &str)> {
        match (&self.tip1, &self.tip2) {
            (Some(a), Some(b)) => Some((a.as_str(), b.as_str())),
            _ => None,
        }
    }
}
