// src/placement.rs

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::engine_lib::root_motion::RootMotionConfig;
use crate::error::{Result, ScatterError};
use crate::generator::DEFAULT_ATTEMPTS_PER_POINT;
use crate::geometry::Point2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// Leftmost sample goes to slot 0, rightmost to slot 1.
    ExtremalPair,
    /// Shuffled samples, random count, random slot per object.
    General,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRange {
    pub min: usize,
    pub max: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub mode: PlacementMode,
    pub width: f32,
    pub height: f32,
    pub separation_distance: f32,
    pub max_attempts_per_point: u32,
    pub object_range: ObjectRange,
    pub negative_sample_probability: f32,
    /// Z of the first layer before jitter.
    pub depth: f32,
    /// Per-iteration jitter, pushed away from the camera (subtracted from depth).
    pub depth_jitter: Distribution,
    pub layer_count: usize,
    /// Z gap between layers; defaults to the separation distance.
    pub layer_spacing: Option<f32>,
    /// When set, every placed root drifts around the area while its joints animate.
    pub root_motion: Option<RootMotionConfig>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            mode: PlacementMode::ExtremalPair,
            width: 10.0,
            height: 10.0,
            separation_distance: 2.0,
            max_attempts_per_point: DEFAULT_ATTEMPTS_PER_POINT,
            object_range: ObjectRange { min: 2, max: 2 },
            negative_sample_probability: 0.0,
            depth: 0.0,
            depth_jitter: Distribution::constant(0.0),
            layer_count: 1,
            layer_spacing: None,
            root_motion: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementBinding {
    pub slot: usize,
    pub position: Point2,
    pub depth: f32,
    pub layer: usize,
}

pub struct PlacementSelector {
    mode: PlacementMode,
    object_range: ObjectRange,
    negative_sample_probability: f32,
    layer_spacing: f32,
}

impl PlacementSelector {
    pub fn new(config: &PlacementConfig) -> Result<Self> {
        if config.object_range.min > config.object_range.max {
            return Err(ScatterError::InvalidPlacement(format!(
                "object range min {} exceeds max {}",
                config.object_range.min, config.object_range.max
            )));
        }
        let p = config.negative_sample_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ScatterError::InvalidPlacement(format!(
                "negative sample probability {p} is outside [0, 1]"
            )));
        }
        if config.layer_count == 0 {
            return Err(ScatterError::InvalidPlacement("layer_count must be at least 1".to_string()));
        }
        if let Some(motion) = &config.root_motion {
            motion.validate()?;
        }
        let layer_spacing = config.layer_spacing.unwrap_or(config.separation_distance);
        if !layer_spacing.is_finite() {
            return Err(ScatterError::InvalidPlacement(format!("layer spacing {layer_spacing} is not finite")));
        }

        Ok(Self {
            mode: config.mode,
            object_range: config.object_range,
            negative_sample_probability: p,
            layer_spacing,
        })
    }

    /// Turns sampled layers into slot bindings. `depth` is the already-jittered
    /// Z of layer 0. Fails before producing anything, so callers can bail out
    /// without having touched the scene.
    pub fn select<R: Rng + ?Sized>(
        &self,
        layers: Vec<Vec<Point2>>,
        slot_count: usize,
        depth: f32,
        rng: &mut R,
    ) -> Result<Vec<PlacementBinding>> {
        if self.mode == PlacementMode::ExtremalPair && slot_count != 2 {
            return Err(ScatterError::UnsupportedSlotCount(slot_count));
        }

        if self.is_negative_sample(rng) {
            log::debug!("negative sample: no objects placed this iteration");
            return Ok(Vec::new());
        }

        match self.mode {
            PlacementMode::ExtremalPair => {
                let points = layers.first().map(Vec::as_slice).unwrap_or(&[]);
                let (left, right) = Self::extremal_pair(points)?;
                Ok(vec![
                    PlacementBinding { slot: 0, position: left, depth, layer: 0 },
                    PlacementBinding { slot: 1, position: right, depth, layer: 0 },
                ])
            }
            PlacementMode::General => self.select_general(layers, slot_count, depth, rng),
        }
    }

    /// Leftmost and rightmost samples; the first one wins on ties.
    pub fn extremal_pair(points: &[Point2]) -> Result<(Point2, Point2)> {
        if points.len() < 2 {
            return Err(ScatterError::InsufficientSamples { required: 2, available: points.len() });
        }
        let mut left = points[0];
        let mut right = points[0];
        for p in &points[1..] {
            if p.x < left.x {
                left = *p;
            }
            if p.x > right.x {
                right = *p;
            }
        }
        Ok((left, right))
    }

    fn is_negative_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        self.object_range.min == 0
            && self.negative_sample_probability > 0.0
            && rng.gen::<f32>() < self.negative_sample_probability
    }

    fn select_general<R: Rng + ?Sized>(
        &self,
        layers: Vec<Vec<Point2>>,
        slot_count: usize,
        depth: f32,
        rng: &mut R,
    ) -> Result<Vec<PlacementBinding>> {
        let available: usize = layers.iter().map(Vec::len).sum();
        let upper = self.object_range.max.min(available);
        let lower = self.object_range.min.min(upper);
        let count = rng.gen_range(lower..=upper);
        if count == 0 {
            return Ok(Vec::new());
        }
        if slot_count == 0 {
            return Err(ScatterError::InvalidPlacement("no object categories to place".to_string()));
        }

        let mut bindings = Vec::with_capacity(count);
        for (layer, mut points) in layers.into_iter().enumerate() {
            points.shuffle(rng);
            let layer_depth = depth + self.layer_spacing * layer as f32;
            for position in points {
                if bindings.len() == count {
                    return Ok(bindings);
                }
                bindings.push(PlacementBinding {
                    slot: rng.gen_range(0..slot_count),
                    position,
                    depth: layer_depth,
                    layer,
                });
            }
        }
        Ok(bindings)
    }
}
