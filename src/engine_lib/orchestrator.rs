// src/engine_lib/orchestrator.rs
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::ScenarioConfig;
use crate::engine_lib::catalog::ConstraintCatalog;
use crate::engine_lib::controller::JointRotationController;
use crate::engine_lib::root_motion::RootMotionController;
use crate::engine_lib::scene_logic::{plan_object_joints, PlannedJoint};
use crate::engine_lib::scene_types::{JointReading, NodeHandle, RevertRecord, SceneHost};
use crate::error::{Result, ScatterError};
use crate::generator::PoissonDiskSampler;
use crate::geometry::Domain;
use crate::placement::{PlacementBinding, PlacementConfig, PlacementMode, PlacementSelector};

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedObject {
    pub root: NodeHandle,
    pub slot: usize,
    pub category: String,
    pub position: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IterationSummary {
    pub iteration: u64,
    pub seed: u64,
    pub samples: usize,
    pub placed: usize,
    pub animated_joints: usize,
}

struct AnimatedJoint {
    controller: JointRotationController,
    object: NodeHandle,
    slot: usize,
}

/// Owns one run: places objects each iteration, animates their joints frame
/// by frame, and puts every touched transform back when the iteration ends.
pub struct IterationOrchestrator {
    categories: Vec<String>,
    placement: PlacementConfig,
    selector: PlacementSelector,
    catalog: ConstraintCatalog,
    rng: ChaCha8Rng,
    iteration: u64,
    active: bool,
    joints: Vec<AnimatedJoint>,
    movers: Vec<RootMotionController>,
    revert_records: Vec<RevertRecord>,
    placed: Vec<PlacedObject>,
}

impl IterationOrchestrator {
    pub fn new(config: ScenarioConfig) -> Result<Self> {
        let catalog = ConstraintCatalog::new(config.constraints)?;
        Self::with_catalog(config.seed, config.categories, config.placement, catalog)
    }

    pub fn with_catalog(
        seed: u64,
        categories: Vec<String>,
        placement: PlacementConfig,
        catalog: ConstraintCatalog,
    ) -> Result<Self> {
        // Fail at setup rather than on the first iteration.
        Domain::new(placement.width, placement.height, placement.separation_distance, seed)?;
        if placement.max_attempts_per_point == 0 {
            return Err(ScatterError::InvalidDomain("max_attempts_per_point must be at least 1".to_string()));
        }
        if placement.mode == PlacementMode::ExtremalPair && categories.len() != 2 {
            return Err(ScatterError::UnsupportedSlotCount(categories.len()));
        }
        if !placement.depth.is_finite() || !placement.depth_jitter.is_finite() {
            return Err(ScatterError::InvalidPlacement("depth settings must be finite".to_string()));
        }
        let selector = PlacementSelector::new(&placement)?;

        log::info!(
            "orchestrator ready: {:?} placement, {} categories, {} joint constraints",
            placement.mode,
            categories.len(),
            catalog.len()
        );
        Ok(Self {
            categories,
            placement,
            selector,
            catalog,
            rng: ChaCha8Rng::seed_from_u64(seed),
            iteration: 0,
            active: false,
            joints: Vec::new(),
            movers: Vec::new(),
            revert_records: Vec::new(),
            placed: Vec::new(),
        })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn placed_objects(&self) -> &[PlacedObject] {
        &self.placed
    }

    pub fn controllers(&self) -> impl Iterator<Item = &JointRotationController> {
        self.joints.iter().map(|j| &j.controller)
    }

    pub fn root_movers(&self) -> &[RootMotionController] {
        &self.movers
    }

    pub fn revert_records(&self) -> &[RevertRecord] {
        &self.revert_records
    }

    pub fn on_iteration_start<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> Result<IterationSummary> {
        if self.active {
            return Err(ScatterError::IterationInProgress(self.iteration));
        }
        let iteration = self.iteration + 1;
        let seed: u64 = self.rng.gen();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let layer_count = match self.placement.mode {
            PlacementMode::ExtremalPair => 1,
            PlacementMode::General => self.placement.layer_count,
        };
        let mut layers = Vec::with_capacity(layer_count);
        for _ in 0..layer_count {
            let domain = Domain::new(
                self.placement.width,
                self.placement.height,
                self.placement.separation_distance,
                rng.gen(),
            )?;
            layers.push(PoissonDiskSampler::generate_in(&domain, self.placement.max_attempts_per_point)?);
        }
        let samples: usize = layers.iter().map(Vec::len).sum();

        let jitter = self.placement.depth_jitter.sample(&mut rng);
        let depth = self.placement.depth - jitter;
        let bindings = self.selector.select(layers, self.categories.len(), depth, &mut rng)?;

        let plans = match self.plan(host, &bindings, &mut rng) {
            Ok(plans) => plans,
            Err(err) => {
                host.release_all();
                log::warn!("iteration {iteration} aborted before touching the scene: {err}");
                return Err(err);
            }
        };

        for (binding, root, joints) in plans {
            self.revert_records.push(RevertRecord::capture_root(&*host, root));
            let position = Vec3::new(binding.position.x, binding.position.y, binding.depth);
            host.set_local_position(root, position);

            for planned in joints {
                self.revert_records.push(RevertRecord::capture_rotation(&*host, planned.node));
                if planned.spec.axis != Vec3::ZERO {
                    host.rotate(planned.node, planned.spec.axis, planned.offset);
                }
                log::debug!(
                    "slot {} joint '{}': offset {:.2} within {:.2}..{:.2}",
                    binding.slot,
                    planned.spec.name,
                    planned.offset,
                    planned.bounds.0,
                    planned.bounds.1
                );
                let forward = rng.gen_bool(0.5);
                let controller_rng = ChaCha8Rng::seed_from_u64(rng.gen());
                let controller = JointRotationController::new(
                    planned.spec,
                    planned.node,
                    planned.offset,
                    planned.bounds,
                    forward,
                    controller_rng,
                );
                self.joints.push(AnimatedJoint { controller, object: root, slot: binding.slot });
            }

            if let Some(motion) = self.placement.root_motion {
                let half_extents = (self.placement.width / 2.0, self.placement.height / 2.0);
                let mover_rng = ChaCha8Rng::seed_from_u64(rng.gen());
                self.movers.push(RootMotionController::new(root, motion, half_extents, position, mover_rng));
            }

            self.placed.push(PlacedObject {
                root,
                slot: binding.slot,
                category: self.categories[binding.slot].clone(),
                position,
            });
        }

        self.iteration = iteration;
        self.active = true;
        let summary = IterationSummary {
            iteration,
            seed,
            samples,
            placed: self.placed.len(),
            animated_joints: self.joints.len(),
        };
        log::info!(
            "iteration {} started: seed {:#x}, {} samples, {} objects, {} animated joints",
            summary.iteration,
            summary.seed,
            summary.samples,
            summary.placed,
            summary.animated_joints
        );
        Ok(summary)
    }

    /// Acquires pooled objects and resolves every joint without mutating any
    /// transform, so a failure here leaves nothing to undo.
    fn plan<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        bindings: &[PlacementBinding],
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<(PlacementBinding, NodeHandle, Vec<PlannedJoint>)>> {
        let mut plans = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let category = self.categories.get(binding.slot).ok_or_else(|| {
                ScatterError::InvalidPlacement(format!("slot {} has no category", binding.slot))
            })?;
            let root = host.acquire_or_create(category);
            let joints = plan_object_joints(&*host, root, &self.catalog, rng)?;
            plans.push((*binding, root, joints));
        }
        Ok(plans)
    }

    /// Advances every controller by one frame.
    pub fn tick<H: SceneHost + ?Sized>(&mut self, host: &mut H, dt: f32) {
        if !self.active {
            return;
        }
        for joint in &mut self.joints {
            joint.controller.tick(host, dt);
        }
        for mover in &mut self.movers {
            mover.tick(host, dt);
        }
    }

    pub fn on_iteration_end<H: SceneHost + ?Sized>(&mut self, host: &mut H) {
        if !self.active {
            return;
        }
        self.joints.clear();
        self.movers.clear();
        // Records are absolute snapshots, so order does not matter.
        for record in self.revert_records.drain(..) {
            record.restore(host);
        }
        host.release_all();
        let placed = self.placed.len();
        self.placed.clear();
        self.active = false;
        log::info!("iteration {} ended: {} objects returned to the pool", self.iteration, placed);
    }

    pub fn joint_readings<H: SceneHost + ?Sized>(&self, host: &H) -> Vec<JointReading> {
        self.joints.iter().map(|j| Self::reading(host, j)).collect()
    }

    /// First tracked joint with this name, if any object carries it.
    pub fn joint_reading<H: SceneHost + ?Sized>(&self, host: &H, name: &str) -> Option<JointReading> {
        self.joints
            .iter()
            .find(|j| j.controller.name() == name)
            .map(|j| Self::reading(host, j))
    }

    fn reading<H: SceneHost + ?Sized>(host: &H, joint: &AnimatedJoint) -> JointReading {
        JointReading {
            object: joint.object,
            slot: joint.slot,
            joint: joint.controller.name().to_string(),
            angle: joint.controller.current_angle(),
            local_rotation: host.local_rotation(joint.controller.node()),
        }
    }
}
