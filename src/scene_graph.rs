//! scene_graph.rs
//!
//! Small arena of transform nodes with parent links.
//! World transforms are composed on demand (parent world * local) instead of
//! waiting for the engine's transform propagation, so frame logic always sees
//! this frame's values.

use bevy::math::Affine3A;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct SceneNode {
    parent: Option<NodeId>,
    local: Transform,
}

#[derive(Debug, Default, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, local: Transform) -> NodeId {
        self.push(None, local)
    }

    pub fn add_child(&mut self, parent: NodeId, local: Transform) -> NodeId {
        self.push(Some(parent), local)
    }

    fn push(&mut self, parent: Option<NodeId>, local: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode { parent, local });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn local(&self, id: NodeId) -> &Transform {
        &self.nodes[id.0].local
    }

    pub fn local_mut(&mut self, id: NodeId) -> &mut Transform {
        &mut self.nodes[id.0].local
    }

    // walks up the parent chain, composing as it goes
    pub fn world_affine(&self, id: NodeId) -> Affine3A {
        let local = self.local(id).compute_affine();
        match self.parent(id) {
            Some(parent) => self.world_affine(parent) * local,
            None => local,
        }
    }

    pub fn world_transform(&self, id: NodeId) -> Transform {
        Transform::from_matrix(self.world_affine(id).into())
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_affine(id).translation.into()
    }

    pub fn world_rotation(&self, id: NodeId) -> Quat {
        let (_, rotation, _) = self.world_affine(id).to_scale_rotation_translation();
        rotation
    }
}
