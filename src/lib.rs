// src/lib.rs

pub mod config;
pub mod demo_scene;
pub mod distribution;
pub mod engine_lib;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod placement;

pub use config::ScenarioConfig;
pub use error::{Result, ScatterError};
pub use geometry::{Domain, Point2};
pub use generator::PoissonDiskSampler;
pub use placement::{PlacementBinding, PlacementConfig, PlacementMode, PlacementSelector};
