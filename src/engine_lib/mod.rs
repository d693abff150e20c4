// src/engine_lib/mod.rs
pub mod scene_types; // host-facing types only
pub mod catalog;
pub mod controller;
pub mod root_motion;
pub mod scene_logic;
pub mod orchestrator;

pub use scene_types::{JointReading, NodeHandle, RevertRecord, SceneHost};
pub use catalog::{ConstraintCatalog, JointConstraintSpec};
pub use controller::{ControllerPhase, JointRotationController, TickOutcome};
pub use root_motion::{RootMotionConfig, RootMotionController, RootMotionOutcome};
pub use orchestrator::{IterationOrchestrator, IterationSummary, PlacedObject};
