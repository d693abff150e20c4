// src/demo_scene.rs

use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::config::ScenarioConfig;
use crate::distribution::Distribution;
use crate::engine_lib::catalog::{ConstraintCatalog, JointConstraintSpec};
use crate::engine_lib::scene_types::{NodeHandle, SceneHost};
use crate::error::Result;
use crate::placement::{ObjectRange, PlacementConfig, PlacementMode};

pub const INSTRUMENT_PREFAB: &str = "ORSI_LND_04";
pub const HINGE_01_PATH: &str = "B_Root/B_Stick_01/B_Hinge_01";

#[derive(Clone, Debug)]
pub struct PrefabNode {
    pub name: String,
    pub children: Vec<PrefabNode>,
}

impl PrefabNode {
    pub fn new(name: &str, children: Vec<PrefabNode>) -> Self {
        Self { name: name.to_string(), children }
    }

    pub fn leaf(name: &str) -> Self {
        Self::new(name, Vec::new())
    }
}

#[derive(Clone, Debug)]
struct SceneNode {
    name: String,
    children: Vec<NodeHandle>,
    local_rotation: Quat,
    local_position: Vec3,
}

#[derive(Clone, Copy, Debug)]
struct PooledInstance {
    root: NodeHandle,
    in_use: bool,
}

/// Flat in-memory scene graph with a per-category object pool.
#[derive(Default)]
pub struct DemoScene {
    nodes: Vec<SceneNode>,
    prefabs: HashMap<String, PrefabNode>,
    pool: HashMap<String, Vec<PooledInstance>>,
}

impl DemoScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every category is backed by the laparoscopic needle driver hierarchy.
    pub fn with_instrument_categories(categories: &[&str]) -> Self {
        let mut scene = Self::new();
        for category in categories {
            scene.register_prefab(category, instrument_prefab());
        }
        scene
    }

    pub fn register_prefab(&mut self, category: &str, prefab: PrefabNode) {
        self.prefabs.insert(category.to_string(), prefab);
    }

    pub fn add_node(&mut self, name: &str, parent: Option<NodeHandle>) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(SceneNode {
            name: name.to_string(),
            children: Vec::new(),
            local_rotation: Quat::IDENTITY,
            local_position: Vec3::ZERO,
        });
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p.0 as usize)) {
            parent.children.push(handle);
        }
        handle
    }

    fn instantiate(&mut self, prefab: &PrefabNode, parent: Option<NodeHandle>) -> NodeHandle {
        let handle = self.add_node(&prefab.name, parent);
        for child in &prefab.children {
            self.instantiate(child, Some(handle));
        }
        handle
    }

    pub fn active_objects(&self) -> usize {
        self.pool.values().flatten().filter(|i| i.in_use).count()
    }

    pub fn pooled_objects(&self) -> usize {
        self.pool.values().map(Vec::len).sum()
    }

    /// Every node's local rotation, indexed by handle.
    pub fn rotation_snapshot(&self) -> Vec<Quat> {
        self.nodes.iter().map(|n| n.local_rotation).collect()
    }

    fn node(&self, node: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(node.0 as usize)
    }

    fn node_mut(&mut self, node: NodeHandle) -> Option<&mut SceneNode> {
        self.nodes.get_mut(node.0 as usize)
    }
}

impl SceneHost for DemoScene {
    fn acquire_or_create(&mut self, category: &str) -> NodeHandle {
        if let Some(free) = self
            .pool
            .get_mut(category)
            .and_then(|instances| instances.iter_mut().find(|i| !i.in_use))
        {
            free.in_use = true;
            return free.root;
        }

        let prefab = self
            .prefabs
            .get(category)
            .cloned()
            .unwrap_or_else(|| PrefabNode::leaf(category));
        let root = self.instantiate(&prefab, None);
        log::debug!("pool: created '{category}' instance {root:?}");
        self.pool
            .entry(category.to_string())
            .or_default()
            .push(PooledInstance { root, in_use: true });
        root
    }

    fn release_all(&mut self) {
        for instance in self.pool.values_mut().flatten() {
            instance.in_use = false;
        }
    }

    fn find_child(&self, root: NodeHandle, path: &str) -> Option<NodeHandle> {
        path.split('/').filter(|s| !s.is_empty()).try_fold(root, |current, segment| {
            self.node(current)?
                .children
                .iter()
                .copied()
                .find(|c| self.node_name(*c) == Some(segment))
        })
    }

    fn descendants(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeHandle> = match self.node(root) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(handle) = stack.pop() {
            out.push(handle);
            if let Some(node) = self.node(handle) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn node_name(&self, node: NodeHandle) -> Option<&str> {
        self.node(node).map(|n| n.name.as_str())
    }

    fn rotate(&mut self, node: NodeHandle, axis: Vec3, degrees: f32) {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        if let Some(n) = self.node_mut(node) {
            n.local_rotation = n.local_rotation * Quat::from_axis_angle(axis, degrees.to_radians());
        }
    }

    fn local_rotation(&self, node: NodeHandle) -> Quat {
        self.node(node).map_or(Quat::IDENTITY, |n| n.local_rotation)
    }

    fn set_local_rotation(&mut self, node: NodeHandle, value: Quat) {
        if let Some(n) = self.node_mut(node) {
            n.local_rotation = value;
        }
    }

    fn local_position(&self, node: NodeHandle) -> Vec3 {
        self.node(node).map_or(Vec3::ZERO, |n| n.local_position)
    }

    fn set_local_position(&mut self, node: NodeHandle, value: Vec3) {
        if let Some(n) = self.node_mut(node) {
            n.local_position = value;
        }
    }
}

pub fn instrument_prefab() -> PrefabNode {
    PrefabNode::new(
        INSTRUMENT_PREFAB,
        vec![PrefabNode::new(
            "B_Root",
            vec![PrefabNode::new(
                "B_Stick_01",
                vec![PrefabNode::new(
                    "B_Hinge_01",
                    vec![PrefabNode::new(
                        "B_Hinge_02",
                        vec![PrefabNode::leaf("B_Driver_01"), PrefabNode::leaf("B_Driver_02")],
                    )],
                )],
            )],
        )],
    )
}

pub fn instrument_constraints() -> Vec<JointConstraintSpec> {
    let speed = Distribution::truncated_normal(25.0, 5.0, 10.0, 40.0);
    let variation = Distribution::truncated_normal(1.0, 0.5, 0.1, 1.5);
    let pause = Distribution::uniform(0.0, 2.0);
    vec![
        JointConstraintSpec::new("B_Hinge_01", Vec3::X, 0.0, 360.0)
            .with_speed(speed, variation)
            .with_cooldown(0.005, 0.5, pause),
        JointConstraintSpec::new("B_Hinge_02", Vec3::Z, -90.0, 90.0)
            .with_speed(speed, variation)
            .with_cooldown(0.005, 0.5, pause),
        JointConstraintSpec::new("B_Driver_01", Vec3::Z, -35.0, 35.0)
            .with_speed(speed, variation)
            .with_cooldown(0.01, 0.5, pause)
            .tip1(),
        JointConstraintSpec::new("B_Driver_02", Vec3::Z, -35.0, 35.0)
            .with_speed(speed, variation)
            .with_cooldown(0.01, 0.5, pause)
            .tip2(),
    ]
}

pub fn instrument_catalog() -> Result<ConstraintCatalog> {
    ConstraintCatalog::new(instrument_constraints())
}

/// Two needle drivers, leftmost and rightmost, in a 10x10 area.
pub fn demo_config() -> ScenarioConfig {
    ScenarioConfig {
        seed: 42,
        categories: vec!["needle_driver_left".to_string(), "needle_driver_right".to_string()],
        placement: PlacementConfig {
            mode: PlacementMode::ExtremalPair,
            width: 10.0,
            height: 10.0,
            separation_distance: 2.0,
            object_range: ObjectRange { min: 2, max: 2 },
            depth: 5.0,
            depth_jitter: Distribution::uniform(0.0, 1.0),
            ..PlacementConfig::default()
        },
        constraints: instrument_constraints(),
    }
}

pub fn demo_scene_for(config: &ScenarioConfig) -> DemoScene {
    let categories: Vec<&str> = config.categories.iter().map(String::as_str).collect();
    DemoScene::with_instrument_categories(&categories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_reuses_released_instances() {
        let mut scene = DemoScene::with_instrument_categories(&["a"]);
        let first = scene.acquire_or_create("a");
        let second = scene.acquire_or_create("a");
        assert_ne!(first, second);
        assert_eq!(scene.active_objects(), 2);

        scene.release_all();
        assert_eq!(scene.active_objects(), 0);
        assert_eq!(scene.acquire_or_create("a"), first);
        assert_eq!(scene.pooled_objects(), 2);
    }

    #[test]
    fn finds_nested_joints_by_path() {
        let mut scene = DemoScene::with_instrument_categories(&["a"]);
        let root = scene.acquire_or_create("a");
        let hinge = scene.find_child(root, HINGE_01_PATH).unwrap();
        assert_eq!(scene.node_name(hinge), Some("B_Hinge_01"));
        let driver = scene.find_child(hinge, "B_Hinge_02/B_Driver_02").unwrap();
        assert_eq!(scene.node_name(driver), Some("B_Driver_02"));
        assert!(scene.find_child(root, "B_Root/Nope").is_none());
    }

    #[test]
    fn descendants_are_parent_first() {
        let mut scene = DemoScene::with_instrument_categories(&["a"]);
        let root = scene.acquire_or_create("a");
        let names: Vec<_> = scene
            .descendants(root)
            .into_iter()
            .filter_map(|n| scene.node_name(n).map(str::to_string))
            .collect();
        assert_eq!(
            names,
            ["B_Root", "B_Stick_01", "B_Hinge_01", "B_Hinge_02", "B_Driver_01", "B_Driver_02"]
        );
    }

    #[test]
    fn unknown_category_becomes_bare_node() {
        let mut scene = DemoScene::new();
        let root = scene.acquire_or_create("mystery");
        assert_eq!(scene.node_name(root), Some("mystery"));
        assert!(scene.descendants(root).is_empty());
    }
}
