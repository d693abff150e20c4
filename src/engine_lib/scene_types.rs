// src/engine_lib/scene_types.rs
use glam::{Quat, Vec3};

/// Opaque reference to a node owned by the host scene graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u32);

/// Capabilities the core needs from whatever owns the scene.
///
/// Objects are pooled: `acquire_or_create` hands out an inactive instance of
/// the category (or builds a new one), `release_all` returns every instance
/// to the pool without destroying it, so transforms survive across iterations.
pub trait SceneHost {
    fn acquire_or_create(&mut self, category: &str) -> NodeHandle;
    fn release_all(&mut self);

    fn find_child(&self, root: NodeHandle, path: &str) -> Option<NodeHandle>;
    /// Every node below `root` (not including it), parents before children.
    fn descendants(&self, root: NodeHandle) -> Vec<NodeHandle>;
    fn node_name(&self, node: NodeHandle) -> Option<&str>;

    /// Rotates in local space by `degrees` about `axis`.
    fn rotate(&mut self, node: NodeHandle, axis: Vec3, degrees: f32);
    fn local_rotation(&self, node: NodeHandle) -> Quat;
    fn set_local_rotation(&mut self, node: NodeHandle, value: Quat);
    fn local_position(&self, node: NodeHandle) -> Vec3;
    fn set_local_position(&mut self, node: NodeHandle, value: Vec3);
}

/// Absolute snapshot of a node's transform taken before the first mutation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevertRecord {
    pub target: NodeHandle,
    pub rotation: Quat,
    /// Only object roots are moved, so only they carry a position.
    pub position: Option<Vec3>,
}

impl RevertRecord {
    pub fn capture_rotation<H: SceneHost + ?Sized>(host: &H, target: NodeHandle) -> Self {
        Self { target, rotation: host.local_rotation(target), position: None }
    }

    pub fn capture_root<H: SceneHost + ?Sized>(host: &H, target: NodeHandle) -> Self {
        Self {
            target,
            rotation: host.local_rotation(target),
            position: Some(host.local_position(target)),
        }
    }

    pub fn restore<H: SceneHost + ?Sized>(&self, host: &mut H) {
        host.set_local_rotation(self.target, self.rotation);
        if let Some(position) = self.position {
            host.set_local_position(self.target, position);
        }
    }
}

/// Per-frame measurement of one animated joint.
#[derive(Clone, Debug, PartialEq)]
pub struct JointReading {
    pub object: NodeHandle,
    pub slot: usize,
    pub joint: String,
    pub angle: f32,
    pub local_rotation: Quat,
}
