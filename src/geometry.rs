// src/geometry.rs

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScatterError};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Point2) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// Raw byte view of a point sequence, used to compare sampler output exactly.
pub fn points_as_bytes(points: &[Point2]) -> &[u8] {
    bytemuck::cast_slice(points)
}

/// Rectangular sampling area centered on the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub width: f32,
    pub height: f32,
    pub min_separation: f32,
    pub seed: u64,
}

impl Domain {
    pub fn new(width: f32, height: f32, min_separation: f32, seed: u64) -> Result<Self> {
        let domain = Self { width, height, min_separation, seed };
        domain.validate()?;
        Ok(domain)
    }

    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("width", self.width),
            ("height", self.height),
            ("min_separation", self.min_separation),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScatterError::InvalidDomain(format!(
                    "{label} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn half_extents(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }

    pub fn contains(&self, point: &Point2) -> bool {
        let (hw, hh) = self.half_extents();
        point.x >= -hw && point.x <= hw && point.y >= -hh && point.y <= hh
    }
}
