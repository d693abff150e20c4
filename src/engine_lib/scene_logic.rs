// src/engine_lib/scene_logic.rs
use std::sync::Arc;

use rand::Rng;

use crate::distribution::uniform_between;
use crate::engine_lib::catalog::{ConstraintCatalog, JointConstraintSpec};
use crate::engine_lib::scene_types::{NodeHandle, SceneHost};
use crate::error::{Result, ScatterError};

/// Initial offsets and animation limits for a pair of gripper tips.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TipResolution {
    pub tip1_offset: f32,
    pub tip2_offset: f32,
    pub centerpoint: f32,
    pub tip1_bounds: (f32, f32),
    pub tip2_bounds: (f32, f32),
}

/// Samples tip1 within its limits, then tip2 within `[tip2.min, -tip1]`, and
/// splits the gap between them at the centerpoint so neither blade animates
/// past the other's starting pose.
pub fn resolve_tip_pair<R: Rng + ?Sized>(
    tip1: &JointConstraintSpec,
    tip2: &JointConstraintSpec,
    rng: &mut R,
) -> TipResolution {
    let a = uniform_between(rng, tip1.min_angle, tip1.max_angle);
    // -a can fall outside tip2's own limits; stay inside them.
    let upper = (-a).clamp(tip2.min_angle, tip2.max_angle);
    let b = uniform_between(rng, tip2.min_angle, upper);
    let centerpoint = (a - b) / 2.0;

    TipResolution {
        tip1_offset: a,
        tip2_offset: b,
        centerpoint,
        tip1_bounds: (tip1.min_angle, centerpoint.min(tip1.max_angle).max(a)),
        tip2_bounds: (tip2.min_angle, (-centerpoint).min(tip2.max_angle).max(b)),
    }
}

/// One joint of a placed object, resolved but not yet applied.
#[derive(Clone, Debug)]
pub struct PlannedJoint {
    pub node: NodeHandle,
    pub spec: Arc<JointConstraintSpec>,
    pub offset: f32,
    pub bounds: (f32, f32),
}

/// Walks everything below `root`, keeps the nodes named in the catalog and
/// samples their starting offsets. Read-only on the scene.
pub fn plan_object_joints<H: SceneHost + ?Sized, R: Rng + ?Sized>(
    host: &H,
    root: NodeHandle,
    catalog: &ConstraintCatalog,
    rng: &mut R,
) -> Result<Vec<PlannedJoint>> {
    let matched: Vec<(NodeHandle, Arc<JointConstraintSpec>)> = host
        .descendants(root)
        .into_iter()
        .filter_map(|node| {
            let name = host.node_name(node)?;
            catalog.get(name).map(|spec| (node, Arc::clone(spec)))
        })
        .collect();

    let tip1 = matched.iter().position(|(_, spec)| spec.is_tip1);
    let tip2 = matched.iter().position(|(_, spec)| spec.is_tip2);
    let tips = match (tip1, tip2) {
        (Some(i), Some(j)) => Some((i, j, resolve_tip_pair(&matched[i].1, &matched[j].1, rng))),
        (None, None) => None,
        (Some(i), None) | (None, Some(i)) => {
            let present = &matched[i].1.name;
            let partner = catalog
                .tip_pair()
                .map(|(a, b)| if a == present { b } else { a })
                .unwrap_or("<unknown>");
            return Err(ScatterError::MissingConstraint(format!(
                "joint '{present}' needs its partner '{partner}' in the same hierarchy"
            )));
        }
    };

    let planned = matched
        .into_iter()
        .enumerate()
        .map(|(index, (node, spec))| {
            let (offset, bounds) = match tips {
                Some((i, _, tips)) if i == index => (tips.tip1_offset, tips.tip1_bounds),
                Some((_, j, tips)) if j == index => (tips.tip2_offset, tips.tip2_bounds),
                _ => (
                    uniform_between(rng, spec.min_angle, spec.max_angle),
                    (spec.min_angle, spec.max_angle),
                ),
            };
            PlannedJoint { node, spec, offset, bounds }
        })
        .collect();
    Ok(planned)
}
