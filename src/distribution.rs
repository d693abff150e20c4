// src/distribution.rs

use rand::Rng;
use rand_distr::{Distribution as _, Normal};
use serde::{Deserialize, Serialize};

/// A scalar distribution that can be described in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    Constant { value: f32 },
    Uniform { min: f32, max: f32 },
    /// Normal draw clamped into `[min, max]`.
    Normal { mean: f32, std_dev: f32, min: f32, max: f32 },
}

impl Distribution {
    pub fn constant(value: f32) -> Self {
        Distribution::Constant { value }
    }

    pub fn uniform(min: f32, max: f32) -> Self {
        Distribution::Uniform { min, max }
    }

    pub fn truncated_normal(mean: f32, std_dev: f32, min: f32, max: f32) -> Self {
        Distribution::Normal { mean, std_dev, min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match *self {
            Distribution::Constant { value } => value,
            Distribution::Uniform { min, max } => uniform_between(rng, min, max),
            Distribution::Normal { mean, std_dev, min, max } => {
                let (lo, hi) = ordered(min, max);
                let draw = match Normal::new(mean, std_dev.abs()) {
                    Ok(normal) => normal.sample(rng),
                    Err(_) => mean,
                };
                if draw.is_finite() { draw.clamp(lo, hi) } else { lo }
            }
        }
    }

    pub fn is_finite(&self) -> bool {
        match *self {
            Distribution::Constant { value } => value.is_finite(),
            Distribution::Uniform { min, max } => min.is_finite() && max.is_finite(),
            Distribution::Normal { mean, std_dev, min, max } => {
                mean.is_finite() && std_dev.is_finite() && min.is_finite() && max.is_finite()
            }
        }
    }
}

/// Uniform draw in `[a, b]`; degenerate or reversed ranges are tolerated.
pub fn uniform_between<R: Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    let (lo, hi) = ordered(a, b);
    if lo == hi {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}
